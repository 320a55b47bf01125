//! Parsing of structured model output.
//!
//! Models are asked for bare JSON but routinely wrap it in markdown fences
//! or preamble text. Extraction strips fences first, then falls back to the
//! outermost brace pair.

use casefile_core::{CaseMap, CasefileError, CasefileResult, ClueSet, GenerationError};
use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fence regex")
});

fn invalid_response(provider: &str, reason: impl Into<String>) -> CasefileError {
    CasefileError::Generation(GenerationError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}

/// Extract the JSON object embedded in raw model output.
///
/// Prefers a fenced ```json block; otherwise takes the slice from the first
/// `{` to the last `}`.
pub fn extract_json_block(raw: &str) -> Option<&str> {
    if let Some(captures) = FENCED_JSON.captures(raw) {
        return captures.get(1).map(|m| m.as_str());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse the clue-extraction step's output into a [`ClueSet`].
pub fn parse_clue_set(raw: &str, provider: &str) -> CasefileResult<ClueSet> {
    let block = extract_json_block(raw)
        .ok_or_else(|| invalid_response(provider, "no JSON object in clue output"))?;
    let clue_set: ClueSet = serde_json::from_str(block)
        .map_err(|e| invalid_response(provider, format!("malformed clue JSON: {}", e)))?;

    if clue_set.clues.is_empty() {
        return Err(invalid_response(provider, "clue set is empty"));
    }
    for (i, clue) in clue_set.clues.iter().enumerate() {
        if clue.id.trim().is_empty() {
            return Err(invalid_response(provider, format!("clue {} has empty id", i)));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for clue in &clue_set.clues {
        if !seen.insert(clue.id.as_str()) {
            return Err(invalid_response(
                provider,
                format!("duplicate clue id: {}", clue.id),
            ));
        }
    }

    Ok(clue_set)
}

/// Parse the map step's output into a [`CaseMap`].
///
/// Locations arrive without images; image generation is a later, isolated
/// step. Duplicate location ids are rejected here so the daily gate has an
/// unambiguous key space.
pub fn parse_case_map(raw: &str, provider: &str) -> CasefileResult<CaseMap> {
    let block = extract_json_block(raw)
        .ok_or_else(|| invalid_response(provider, "no JSON object in map output"))?;
    let map: CaseMap = serde_json::from_str(block)
        .map_err(|e| invalid_response(provider, format!("malformed map JSON: {}", e)))?;

    if map.locations.is_empty() {
        return Err(invalid_response(provider, "map has no locations"));
    }
    if map.suspects.is_empty() {
        return Err(invalid_response(provider, "map has no suspects"));
    }

    let mut seen = std::collections::HashSet::new();
    for location in &map.locations {
        if location.id.trim().is_empty() {
            return Err(invalid_response(provider, "location with empty id"));
        }
        if !seen.insert(location.id.as_str()) {
            return Err(invalid_response(
                provider,
                format!("duplicate location id: {}", location.id),
            ));
        }
    }

    Ok(map)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CLUES_JSON: &str = r#"{"clues": [
        {"id": "clue-1", "title": "Torn glove", "text": "A glove caught on the fence."},
        {"id": "clue-2", "title": "Mud trail", "text": "Boot prints lead east.",
         "related_location": "harbor-warehouse", "related_suspect": null}
    ]}"#;

    const MAP_JSON: &str = r#"{
        "locations": [
            {"id": "harbor-warehouse", "display_name": "Harbor Warehouse",
             "description": "Rows of crates, one pried open."},
            {"id": "observatory", "display_name": "Old Observatory",
             "description": "Dust everywhere except the telescope."}
        ],
        "suspects": [
            {"name": "Vera Kline", "description": "The night watchman's cousin.",
             "alibi": "Claims she was at the docks."}
        ]
    }"#;

    #[test]
    fn test_extract_bare_json() {
        let raw = r#"{"clues": []}"#;
        assert_eq!(extract_json_block(raw), Some(raw));
    }

    #[test]
    fn test_extract_fenced_json() {
        let raw = "Here you go:\n```json\n{\"clues\": []}\n```\nAnything else?";
        assert_eq!(extract_json_block(raw), Some("{\"clues\": []}"));
    }

    #[test]
    fn test_extract_json_with_preamble() {
        let raw = "Sure! {\"locations\": [1]} hope that helps";
        assert_eq!(extract_json_block(raw), Some("{\"locations\": [1]}"));
    }

    #[test]
    fn test_extract_none_when_no_object() {
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn test_parse_clue_set_ok() {
        let clue_set = parse_clue_set(CLUES_JSON, "mock").unwrap();
        assert_eq!(clue_set.len(), 2);
        assert_eq!(clue_set.clues[0].id, "clue-1");
        assert!(clue_set.clues[0].related_location.is_none());
        assert_eq!(
            clue_set.clues[1].related_location.as_deref(),
            Some("harbor-warehouse")
        );
    }

    #[test]
    fn test_parse_clue_set_rejects_empty() {
        let err = parse_clue_set(r#"{"clues": []}"#, "mock").unwrap_err();
        assert!(matches!(
            err,
            CasefileError::Generation(GenerationError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_parse_clue_set_rejects_duplicate_ids() {
        let raw = r#"{"clues": [
            {"id": "clue-1", "title": "a", "text": "a"},
            {"id": "clue-1", "title": "b", "text": "b"}
        ]}"#;
        let err = parse_clue_set(raw, "mock").unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("duplicate clue id"));
    }

    #[test]
    fn test_parse_case_map_ok() {
        let map = parse_case_map(MAP_JSON, "mock").unwrap();
        assert_eq!(map.locations.len(), 2);
        assert_eq!(map.suspects.len(), 1);
        // Images are absent until the image step runs.
        assert!(map.locations.iter().all(|l| l.image.is_none()));
    }

    #[test]
    fn test_parse_case_map_fenced() {
        let raw = format!("```json\n{}\n```", MAP_JSON);
        assert!(parse_case_map(&raw, "mock").is_ok());
    }

    #[test]
    fn test_parse_case_map_rejects_duplicate_location_ids() {
        let raw = r#"{
            "locations": [
                {"id": "x", "display_name": "X", "description": "."},
                {"id": "x", "display_name": "X2", "description": "."}
            ],
            "suspects": [{"name": "A", "description": ".", "alibi": "."}]
        }"#;
        let err = parse_case_map(raw, "mock").unwrap_err();
        assert!(format!("{}", err).contains("duplicate location id"));
    }

    #[test]
    fn test_parse_case_map_rejects_missing_suspects() {
        let raw = r#"{
            "locations": [{"id": "x", "display_name": "X", "description": "."}],
            "suspects": []
        }"#;
        assert!(parse_case_map(raw, "mock").is_err());
    }
}
