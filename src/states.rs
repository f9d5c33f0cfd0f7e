//! Brazilian state name mapping for chart labels
//! Maps two-letter state codes to the state name and its macro-region

use std::collections::HashMap;
use std::sync::LazyLock;

/// State info: (name, region)
pub static STATE_NAMES: LazyLock<HashMap<&'static str, (&'static str, &'static str)>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // North
        m.insert("AC", ("Acre", "North"));
        m.insert("AP", ("Amapá", "North"));
        m.insert("AM", ("Amazonas", "North"));
        m.insert("PA", ("Pará", "North"));
        m.insert("RO", ("Rondônia", "North"));
        m.insert("RR", ("Roraima", "North"));
        m.insert("TO", ("Tocantins", "North"));

        // Northeast
        m.insert("AL", ("Alagoas", "Northeast"));
        m.insert("BA", ("Bahia", "Northeast"));
        m.insert("CE", ("Ceará", "Northeast"));
        m.insert("MA", ("Maranhão", "Northeast"));
        m.insert("PB", ("Paraíba", "Northeast"));
        m.insert("PE", ("Pernambuco", "Northeast"));
        m.insert("PI", ("Piauí", "Northeast"));
        m.insert("RN", ("Rio Grande do Norte", "Northeast"));
        m.insert("SE", ("Sergipe", "Northeast"));

        // Central-West
        m.insert("DF", ("Distrito Federal", "Central-West"));
        m.insert("GO", ("Goiás", "Central-West"));
        m.insert("MT", ("Mato Grosso", "Central-West"));
        m.insert("MS", ("Mato Grosso do Sul", "Central-West"));

        // Southeast
        m.insert("ES", ("Espírito Santo", "Southeast"));
        m.insert("MG", ("Minas Gerais", "Southeast"));
        m.insert("RJ", ("Rio de Janeiro", "Southeast"));
        m.insert("SP", ("São Paulo", "Southeast"));

        // South
        m.insert("PR", ("Paraná", "South"));
        m.insert("RS", ("Rio Grande do Sul", "South"));
        m.insert("SC", ("Santa Catarina", "South"));

        m
    });

/// Get state name (e.g., "SP" -> "São Paulo"); unknown codes pass through
pub fn get_state_name(code: &str) -> String {
    lookup(code)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

pub fn get_state_region(code: &str) -> Option<&'static str> {
    lookup(code).map(|(_, region)| *region)
}

/// Label like "SP (São Paulo)"
pub fn format_state_label(code: &str) -> String {
    let normalized = code.trim().to_ascii_uppercase();
    match STATE_NAMES.get(normalized.as_str()) {
        Some((name, _)) => format!("{} ({})", normalized, name),
        None => code.to_string(),
    }
}

fn lookup(code: &str) -> Option<&'static (&'static str, &'static str)> {
    STATE_NAMES.get(code.trim().to_ascii_uppercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_name() {
        assert_eq!(get_state_name("SP"), "São Paulo");
        assert_eq!(get_state_name("rj"), "Rio de Janeiro");
        assert_eq!(STATE_NAMES.len(), 27);
    }

    #[test]
    fn test_region() {
        assert_eq!(get_state_region("RS"), Some("South"));
        assert_eq!(get_state_region("DF"), Some("Central-West"));
        assert_eq!(get_state_region("XX"), None);
    }

    #[test]
    fn test_unknown_state() {
        assert_eq!(get_state_name("XX"), "XX");
        assert_eq!(format_state_label("XX"), "XX");
        assert_eq!(format_state_label("MG"), "MG (Minas Gerais)");
    }

    #[test]
    fn test_label_normalizes_code() {
        assert_eq!(format_state_label("sp"), "SP (São Paulo)");
        assert_eq!(format_state_label(" rj "), "RJ (Rio de Janeiro)");
    }
}
