//! Cosmetic cleanup of raw model output.
//!
//! Chat models wrap SQL in markdown fences and backticks no matter how firmly
//! the prompt forbids it. This pass strips those wrappers and nothing else;
//! it is not a security boundary. The safety gate classifies whatever comes
//! out of here.

/// Normalizes raw model output into a candidate SQL string: trims whitespace,
/// strips fenced-code delimiters (with an optional `sql` language tag) and a
/// symmetric pair of wrapping backticks.
///
/// Runs to a fixpoint, so applying it to its own output changes nothing.
pub fn sanitize(raw: &str) -> String {
    let mut text = raw.trim();
    loop {
        let before = text;

        for fence in ["```sql", "```SQL", "```"] {
            if let Some(rest) = text.strip_prefix(fence) {
                text = rest;
                break;
            }
        }
        if let Some(rest) = text.strip_suffix("```") {
            text = rest;
        }
        if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
            text = &text[1..text.len() - 1];
        }
        text = text.trim();

        if text == before {
            return text.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_block_with_language_tag() {
        let raw = "```sql\nSELECT * FROM products\n```";
        assert_eq!(sanitize(raw), "SELECT * FROM products");
    }

    #[test]
    fn strips_uppercase_language_tag() {
        assert_eq!(sanitize("```SQL\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn strips_bare_fences() {
        assert_eq!(sanitize("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn strips_wrapping_backticks() {
        assert_eq!(sanitize("`SELECT name FROM darkstores`"), "SELECT name FROM darkstores");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize("  \nSELECT 1\n  "), "SELECT 1");
    }

    #[test]
    fn leaves_plain_sql_untouched() {
        let query = "SELECT name, brand FROM products WHERE is_perishable";
        assert_eq!(sanitize(query), query);
    }

    #[test]
    fn interior_backticks_survive() {
        let query = "SELECT `name` FROM products";
        assert_eq!(sanitize(query), query);
    }

    #[test]
    fn idempotent_on_nested_fences() {
        let messy = "``` ```sql\nSELECT 1\n``` ```";
        let once = sanitize(messy);
        assert_eq!(sanitize(&once), once);
        assert_eq!(once, "SELECT 1");
    }

    #[test]
    fn idempotent_on_every_clean_form() {
        for raw in ["SELECT 1", "", "   ", "```sql\nSELECT 1\n```"] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once);
        }
    }
}
