pub mod analyzer;
pub mod api;
pub mod charts;
pub mod config;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod models;
pub mod page;
pub mod sample;
pub mod states;
