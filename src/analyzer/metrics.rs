// src/analyzer/metrics.rs
// =============================================================================
// Simple size and shape metrics for a piece of code.
//
// These are text statistics, not a parse. In particular `function_count` is
// an APPROXIMATION: it counts idioms that usually introduce a function
// (`function name`, `const x =`, `let x =`, `=>`), so `const f = () => 1`
// counts twice and `const n = 5` counts once.
// =============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub line_count: usize,
    pub character_count: usize,
    pub word_count: usize,
    /// Approximate, see module docs
    pub function_count: usize,
    pub comment_count: usize,
}

pub fn measure(code: &str) -> Metrics {
    Metrics {
        // a trailing line without a newline still counts
        line_count: code.split('\n').count(),
        character_count: code.chars().count(),
        word_count: code.split_whitespace().count(),
        function_count: count_functions(code),
        comment_count: count_comments(code),
    }
}

fn count_functions(code: &str) -> usize {
    static_regex!(r"\bfunction\s+\w+|\b(const|let)\s+\w+\s*=[^=]|=>")
        .find_iter(code)
        .count()
}

// `//` preceded by ':' is a URL scheme separator, not a comment.
// Block comments are matched across lines and count once each.
fn count_comments(code: &str) -> usize {
    let line_comments = static_regex!(r"(?m)(^|[^:])//").find_iter(code).count();
    let block_comments = static_regex!(r"(?s)/\*.*?\*/").find_iter(code).count();
    line_comments + block_comments
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_measure_small_program() {
        let code = indoc! {"
            // add two numbers
            function add(a, b) {
              return a + b;
            }
            /* multi
               line */
            const double = (x) => x * 2;"
        };
        assert_eq!(
            measure(code),
            Metrics {
                line_count: 7,
                character_count: code.chars().count(),
                word_count: 25,
                function_count: 3,
                comment_count: 2,
            }
        );
    }

    #[test]
    fn test_line_count_edges() {
        assert_eq!(measure("").line_count, 1);
        assert_eq!(measure("a").line_count, 1);
        assert_eq!(measure("a\n").line_count, 2);
        assert_eq!(measure("a\nb").line_count, 2);
    }

    #[test]
    fn test_urls_are_not_comments() {
        let metrics = measure("const url = \"https://example.com\"; // home");
        assert_eq!(metrics.comment_count, 1);
    }

    #[test]
    fn test_character_count_is_chars() {
        assert_eq!(measure("héllo").character_count, 5);
    }

    #[test]
    fn test_comparison_is_not_a_binding() {
        assert_eq!(measure("if (let_x == 1) {}").function_count, 0);
    }

    proptest! {
        #[test]
        fn measure_is_stable_on_arbitrary_text(code in "(\\PC|\n){0,200}") {
            let metrics = measure(&code);
            prop_assert_eq!(&metrics, &measure(&code));
            prop_assert_eq!(metrics.line_count, code.split('\n').count());
            prop_assert_eq!(metrics.character_count, code.chars().count());
        }
    }
}
