//! Extension pattern handling.
//!
//! The user supplies a single `;`-delimited string of glob patterns
//! (e.g. `*.dll;*.exe`). Splitting preserves empty segments; an empty
//! segment matches no files downstream rather than being filtered here.

use slipway_config::EXTENSION_PATTERN_DELIMITER;

pub fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(EXTENSION_PATTERN_DELIMITER)
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolon_in_order() {
        assert_eq!(split_patterns("*.dll;*.exe"), vec!["*.dll", "*.exe"]);
    }

    #[test]
    fn empty_segments_are_preserved() {
        let segments = split_patterns("*.dll;;*.exe");
        assert_eq!(segments, vec!["*.dll", "", "*.exe"]);
    }

    #[test]
    fn single_pattern_yields_one_segment() {
        assert_eq!(split_patterns("*.dll"), vec!["*.dll"]);
    }

    #[test]
    fn empty_input_yields_one_empty_segment() {
        assert_eq!(split_patterns(""), vec![""]);
    }
}
