//! Oracle response parsing
//!
//! The oracle is asked for pure JSON but routinely wraps it in prose
//! ("Sure! Here you go: {...}"). The scanner below extracts the first
//! complete balanced object, tracking string literals and escapes so
//! braces inside text fields don't confuse the depth count.

use thiserror::Error;

use crate::models::SpeciesDescription;

/// Parser errors — distinct from oracle unavailability. The raw text is
/// attached by the caller so prompt/schema drift can be diagnosed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No JSON object found in oracle response")]
    NoJsonObject,

    #[error("Oracle JSON did not match the species schema: {0}")]
    Schema(String),
}

/// Extract the first complete balanced `{...}` span from free-form text.
/// Returns `None` if no object closes before the text ends.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start?..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the oracle's raw reply into a species description
pub fn parse_species_response(text: &str) -> Result<SpeciesDescription, ParseError> {
    let span = extract_json_object(text).ok_or(ParseError::NoJsonObject)?;
    serde_json::from_str(span).map_err(|e| ParseError::Schema(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConservationStatus, SpeciesType};

    const JAGUAR_JSON: &str = r#"{
        "name": "Jaguar",
        "scientificName": "Panthera onca",
        "type": "animal",
        "description": "A powerful spotted cat of the Americas.",
        "habitat": "Tropical rainforest",
        "region": "Central and South America",
        "stats": {"size": "1.1-1.9 m", "weight": "56-96 kg"},
        "abilities": [{"name": "Crushing bite", "description": "Pierces turtle shells."}],
        "funFacts": ["Strong swimmer"],
        "conservationStatus": "near_threatened",
        "commonality": "rare",
        "confidence": "High"
    }"#;

    #[test]
    fn parses_object_surrounded_by_prose() {
        let text = format!("Sure! Here you go: {JAGUAR_JSON} Hope that helps.");
        let species = parse_species_response(&text).unwrap();
        assert_eq!(species.name, "Jaguar");
        assert_eq!(species.scientific_name, "Panthera onca");
        assert_eq!(species.species_type, SpeciesType::Animal);
        assert_eq!(
            species.conservation_status,
            Some(ConservationStatus::NearThreatened)
        );
        assert_eq!(species.confidence.as_deref(), Some("High"));
    }

    #[test]
    fn no_braces_is_no_json_object() {
        let err = parse_species_response("I cannot identify this image.").unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject));
    }

    #[test]
    fn unclosed_object_is_no_json_object() {
        let err = parse_species_response(r#"{"name": "Jaguar", "#).unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject));
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_scan() {
        let text = r#"{"a": "curly {braces} and \"quotes\" inside", "b": 1} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a": "curly {braces} and \"quotes\" inside", "b": 1}"#)
        );
    }

    #[test]
    fn first_complete_object_wins_over_later_ones() {
        let text = r#"First: {"x": 1} and second: {"y": 2}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"x": 1}"#));
    }

    #[test]
    fn nested_objects_stay_attached_to_the_outer_span() {
        let text = r#"note {"outer": {"inner": 1}} end"#;
        assert_eq!(extract_json_object(text), Some(r#"{"outer": {"inner": 1}}"#));
    }

    #[test]
    fn sparse_reply_defaults_optional_fields() {
        let text = r#"{"name": "Oak", "scientificName": "Quercus robur",
                       "type": "plant", "description": "A broadleaf tree."}"#;
        let species = parse_species_response(text).unwrap();
        assert!(species.abilities.is_empty());
        assert!(species.fun_facts.is_empty());
        assert!(species.conservation_status.is_none());
        assert!(species.commonality.is_none());
        assert!(species.stats.size.is_none());
    }

    #[test]
    fn unrecognized_status_becomes_unknown() {
        let text = r#"{"name": "X", "scientificName": "X y", "type": "animal",
                       "description": "d", "conservationStatus": "data_deficient"}"#;
        let species = parse_species_response(text).unwrap();
        assert_eq!(species.conservation_status, Some(ConservationStatus::Unknown));
    }

    #[test]
    fn schema_mismatch_is_a_schema_error() {
        let err = parse_species_response(r#"{"totally": "unrelated"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
    }
}
