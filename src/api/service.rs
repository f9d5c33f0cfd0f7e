//! Shared business logic for the dashboard
//!
//! This service layer is used by both the HTML page and the JSON handlers.
//! It owns the immutable dataset; every call recomputes its views from the
//! selected range, nothing is cached between requests.

use tracing::{debug, warn};

use crate::analyzer::{DashboardViews, DataAnalyzer};
use crate::filter::{filter_orders, DateRange, RangeError};
use crate::geo::{BaseMap, BrazilMapPlotter, DensityGrid};
use crate::loader::{BaseMapImage, Dataset};
use crate::page::{render_page, PageContext};

/// Route the rendered map uses to fetch the base image
pub const BASEMAP_ROUTE: &str = "/assets/basemap";

pub struct DashboardService {
    dataset: Dataset,
    span: Option<DateRange>,
    base_map: BaseMap,
    base_map_image: Option<BaseMapImage>,
    plotter: BrazilMapPlotter,
    logo_url: Option<String>,
}

impl DashboardService {
    /// `base_map` carries the startup fetch outcome; an error only disables
    /// the map panel
    pub fn new(dataset: Dataset, base_map: Result<BaseMapImage, String>) -> Self {
        let span = dataset.approval_span();
        let (base_map, base_map_image) = match base_map {
            Ok(image) => (
                BaseMap::Available {
                    href: BASEMAP_ROUTE.to_string(),
                },
                Some(image),
            ),
            Err(reason) => {
                warn!("Base map unavailable, map panel disabled: {}", reason);
                (BaseMap::Unavailable { reason }, None)
            }
        };

        Self {
            dataset,
            span,
            base_map,
            base_map_image,
            plotter: BrazilMapPlotter::default(),
            logo_url: None,
        }
    }

    pub fn with_logo(mut self, logo_url: Option<String>) -> Self {
        self.logo_url = logo_url;
        self
    }

    pub fn with_plotter(mut self, plotter: BrazilMapPlotter) -> Self {
        self.plotter = plotter;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// First and last approval day, `None` when no order was approved
    pub fn span(&self) -> Option<DateRange> {
        self.span
    }

    pub fn base_map_image(&self) -> Option<&BaseMapImage> {
        self.base_map_image.as_ref()
    }

    pub fn resolve_range(&self, start: Option<&str>, end: Option<&str>) -> Result<DateRange, RangeError> {
        DateRange::from_selection(start, end, self.span)
    }

    /// Analyzer over the orders in `range`; `None` means an empty selection
    pub fn analyzer(&self, range: Option<DateRange>) -> DataAnalyzer<'_> {
        let filtered = match range {
            Some(range) => filter_orders(&self.dataset.orders, &range),
            None => Vec::new(),
        };
        debug!("Selected {} orders for {:?}", filtered.len(), range);
        DataAnalyzer::from_filtered(filtered)
    }

    /// All panel data for `range`
    pub fn views(&self, range: Option<DateRange>) -> DashboardViews {
        self.analyzer(range).views(range)
    }

    /// Resolve a user selection and filter once. A dataset without approved
    /// orders yields an empty selection rather than an error.
    pub fn select(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<(Option<DateRange>, DataAnalyzer<'_>), RangeError> {
        let range = match self.resolve_range(start, end) {
            Ok(range) => Some(range),
            Err(RangeError::EmptyDataset) => None,
            Err(e) => return Err(e),
        };
        Ok((range, self.analyzer(range)))
    }

    /// Views for a user selection
    pub fn views_for(&self, start: Option<&str>, end: Option<&str>) -> Result<DashboardViews, RangeError> {
        let (range, analyzer) = self.select(start, end)?;
        Ok(analyzer.views(range))
    }

    pub fn render_map(&self) -> String {
        self.plotter.render(&self.dataset.locations, &self.base_map)
    }

    pub fn density_grid(&self) -> DensityGrid {
        DensityGrid::from_points(
            &self.dataset.locations,
            &self.plotter.projection,
            self.plotter.cell_px,
        )
    }

    /// Full HTML page. A rejected selection falls back to the whole span and
    /// is reported in a notice.
    pub fn render_dashboard(&self, start: Option<&str>, end: Option<&str>) -> String {
        let (views, notice) = match self.views_for(start, end) {
            Ok(views) => (views, None),
            Err(e) => {
                debug!("Rejected range selection: {}", e);
                (
                    self.views(self.span),
                    Some(format!("{}. Showing the full date range instead.", e)),
                )
            }
        };

        let map_panel = self.render_map();
        let ctx = PageContext {
            span: self.span,
            map_panel: &map_panel,
            notice: notice.as_deref(),
            logo_url: self.logo_url.as_deref(),
        };
        render_page(&views, &ctx)
    }
}
