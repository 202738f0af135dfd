// tests/property/protocol.rs

use proptest::prelude::*;

use packwatch::bundler::{split_line, SplitLine, RESULT_SENTINEL};

proptest! {
    /// Splitting a tagged line loses no bytes: prefix and payload
    /// reassemble to the original line around the first sentinel.
    #[test]
    fn split_preserves_all_content(
        prefix in "[^\u{10}]*",
        payload in "[^\u{10}]*",
    ) {
        let line = format!("{prefix}{RESULT_SENTINEL}{payload}");
        match split_line(&line) {
            SplitLine::Tagged { prefix: p, payload: pl } => {
                prop_assert_eq!(p, prefix.as_str());
                prop_assert_eq!(pl, payload.as_str());
            }
            SplitLine::Log(_) => prop_assert!(false, "sentinel was present"),
        }
    }

    /// Lines without the sentinel pass through verbatim as log text.
    #[test]
    fn sentinel_free_lines_are_log_text(line in "[^\u{10}]*") {
        prop_assert_eq!(split_line(&line), SplitLine::Log(line.as_str()));
    }
}
