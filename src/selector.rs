//! Picks the model a request will actually run on.
//!
//! The remote catalog changes over time, so selection is a total function: whatever is
//! requested, some model from `available` (or [`DEFAULT_MODEL`] when the catalog is empty)
//! comes back.

pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Model families, most capable first.
pub const MODEL_PREFERENCE_ORDER: [&str; 4] = ["gpt-4o", "gpt-4-turbo", "gpt-4", "gpt-3.5-turbo"];

/// Assumed catalog when the remote model list cannot be fetched.
pub const DEFAULT_AVAILABLE_MODELS: [&str; 5] = [
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
];

pub fn default_available_models() -> Vec<String> {
    DEFAULT_AVAILABLE_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Latest versioned entry of `family`, i.e. the greatest `family-*` id.
fn versioned_match<'a>(family: &str, available: &'a [String]) -> Option<&'a String> {
    let prefix = format!("{}-", family);
    available
        .iter()
        .filter(|m| m.starts_with(&prefix))
        .max()
}

fn family_match<'a>(family: &str, available: &'a [String]) -> Option<&'a String> {
    available
        .iter()
        .find(|m| m.as_str() == family)
        .or_else(|| versioned_match(family, available))
}

/// Position of `requested`'s family in [`MODEL_PREFERENCE_ORDER`]. An exact family name wins,
/// otherwise the longest family that `requested` extends with a `-` suffix.
fn family_position(requested: &str) -> Option<usize> {
    if let Some(pos) = MODEL_PREFERENCE_ORDER.iter().position(|f| *f == requested) {
        return Some(pos);
    }
    MODEL_PREFERENCE_ORDER.iter()
        .enumerate()
        .filter(|(_, family)| requested.starts_with(&format!("{}-", family)))
        .max_by_key(|(_, family)| family.len())
        .map(|(pos, _)| pos)
}

pub fn select_model(requested: &str, available: &[String]) -> String {
    select_model_or(requested, available, DEFAULT_MODEL)
}

/// Same as [`select_model`], but an empty catalog resolves to `default_model`.
pub fn select_model_or(requested: &str, available: &[String], default_model: &str) -> String {
    if available.iter().any(|m| m == requested) {
        return requested.to_string();
    }

    if let Some(found) = versioned_match(requested, available) {
        return found.clone();
    }

    // Unknown families rank from the top of the order.
    let start = family_position(requested).unwrap_or(0);

    let downward = MODEL_PREFERENCE_ORDER[start..].iter();
    let upward = MODEL_PREFERENCE_ORDER[..start].iter().rev();
    for family in downward.chain(upward) {
        if let Some(found) = family_match(family, available) {
            return found.clone();
        }
    }

    available
        .first()
        .cloned()
        .unwrap_or_else(|| default_model.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_wins() {
        let available = models(&["gpt-4", "gpt-4-0613", "gpt-4o"]);
        assert_eq!(select_model("gpt-4", &available), "gpt-4");
        assert_eq!(select_model("gpt-4o", &available), "gpt-4o");
    }

    #[test]
    fn versioned_match_takes_lexicographic_maximum() {
        let available = models(&["gpt-4o-2024-05-13", "gpt-4o-2024-08-06", "gpt-3.5-turbo"]);
        assert_eq!(select_model("gpt-4o", &available), "gpt-4o-2024-08-06");
    }

    #[test]
    fn ranked_fallback_moves_to_less_capable_families() {
        let available = models(&["gpt-3.5-turbo", "gpt-4"]);
        assert_eq!(select_model("gpt-4-turbo", &available), "gpt-4");

        let available = models(&["gpt-3.5-turbo-0125", "gpt-3.5-turbo-1106"]);
        assert_eq!(select_model("gpt-4", &available), "gpt-3.5-turbo-1106");
    }

    #[test]
    fn falls_back_upward_when_nothing_below() {
        let available = models(&["gpt-4o", "gpt-4-turbo"]);
        assert_eq!(select_model("gpt-3.5-turbo", &available), "gpt-4-turbo");
    }

    #[test]
    fn versioned_request_resolves_through_its_family() {
        // "gpt-4o-mini" belongs to the gpt-4o family; with gpt-4o missing the search moves down.
        let available = models(&["gpt-4-turbo-preview", "dall-e-3"]);
        assert_eq!(select_model("gpt-4o-mini", &available), "gpt-4-turbo-preview");
        assert_eq!(family_position("gpt-4-turbo-2024-04-09"), Some(1));
        assert_eq!(family_position("gpt-4-0613"), Some(2));
    }

    #[test]
    fn unknown_family_ranks_from_most_capable() {
        let available = models(&["gpt-3.5-turbo", "gpt-4o-mini"]);
        assert_eq!(select_model("claude-3-opus", &available), "gpt-4o-mini");
    }

    #[test]
    fn last_resort_is_first_available_or_default() {
        let available = models(&["davinci-002", "babbage-002"]);
        assert_eq!(select_model("gpt-4o", &available), "davinci-002");
        assert_eq!(select_model("gpt-4o", &[]), DEFAULT_MODEL);
        assert_eq!(select_model("anything", &[]), DEFAULT_MODEL);
    }

    #[test]
    fn empty_catalog_uses_the_given_default() {
        assert_eq!(select_model_or("gpt-4o", &[], "gpt-4-turbo"), "gpt-4-turbo");
        let available = models(&["gpt-4"]);
        assert_eq!(select_model_or("gpt-4o", &available, "gpt-4-turbo"), "gpt-4");
    }

    #[test]
    fn result_always_comes_from_available() {
        let available = default_available_models();
        for requested in ["gpt-4o", "gpt-4o-mini", "gpt-5", "", "gpt-3.5-turbo-16k", "o1"] {
            let chosen = select_model(requested, &available);
            assert!(available.contains(&chosen), "{} -> {}", requested, chosen);
        }
    }
}
