//! Statement summaries for logs and spans.
//!
//! Queries are logged with their literals masked and their length capped,
//! so a failure message identifies the statement without leaking values.
//! Named placeholders such as `:id` are kept as written.

/// Span name used for one executor call.
pub const QUERY_SPAN: &str = "pooldb.query";

/// How statements are rendered into log records.
#[derive(Debug, Clone)]
pub struct StatementLog {
    /// Mask string and numeric literals.
    pub redact_literals: bool,
    /// Maximum rendered length, in characters.
    pub max_length: usize,
    /// Replacement for masked literals.
    pub mask: &'static str,
}

impl Default for StatementLog {
    fn default() -> Self {
        Self {
            redact_literals: true,
            max_length: 512,
            mask: "?",
        }
    }
}

impl StatementLog {
    /// Log statements verbatim, without masking or truncation.
    #[must_use]
    pub fn verbatim() -> Self {
        Self {
            redact_literals: false,
            max_length: usize::MAX,
            mask: "",
        }
    }

    /// Render `sql` for a log record.
    #[must_use]
    pub fn render(&self, sql: &str) -> String {
        let collapsed = collapse_whitespace(sql);
        let rendered = if self.redact_literals {
            mask_literals(&collapsed, self.mask)
        } else {
            collapsed
        };
        truncate(&rendered, self.max_length)
    }
}

fn collapse_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace quoted strings and bare numbers with `mask`.
fn mask_literals(sql: &str, mask: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                // '' inside a literal is an escaped quote
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            chars.next();
                        }
                        Some('\'') | None => break,
                        Some(_) => {}
                    }
                }
                out.push_str(mask);
            }
            c if c.is_ascii_digit() && !out.ends_with(is_word_char) => {
                while chars
                    .peek()
                    .is_some_and(|next| next.is_ascii_digit() || *next == '.')
                {
                    chars.next();
                }
                out.push_str(mask);
            }
            c => out.push(c),
        }
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

/// Cap `s` at `max_chars` characters, marking the cut with `...`.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// The leading keyword of a statement, for span fields.
#[must_use]
pub fn operation(sql: &str) -> &'static str {
    let Some(first) = sql.split_whitespace().next() else {
        return "OTHER";
    };
    let keyword = first.trim_start_matches('(').to_ascii_uppercase();

    match keyword.as_str() {
        "SELECT" | "WITH" => "SELECT",
        "INSERT" => "INSERT",
        "UPDATE" => "UPDATE",
        "DELETE" => "DELETE",
        "MERGE" => "MERGE",
        "CALL" | "EXEC" | "EXECUTE" => "CALL",
        "BEGIN" | "DECLARE" => "BLOCK",
        _ => "OTHER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation() {
        assert_eq!(operation("SELECT * FROM invoices"), "SELECT");
        assert_eq!(operation("  select id from t"), "SELECT");
        assert_eq!(operation("WITH x AS (SELECT 1) SELECT * FROM x"), "SELECT");
        assert_eq!(operation("(SELECT 1)"), "SELECT");
        assert_eq!(operation("UPDATE t SET a = 1"), "UPDATE");
        assert_eq!(operation("CALL refresh()"), "CALL");
        assert_eq!(operation("BEGIN NULL; END;"), "BLOCK");
        assert_eq!(operation(""), "OTHER");
        assert_eq!(operation("VACUUM"), "OTHER");
    }

    #[test]
    fn test_masks_literals_and_keeps_placeholders() {
        let log = StatementLog::default();
        assert_eq!(
            log.render("SELECT * FROM t WHERE name = 'O''Brien' AND id = :id1 AND n > 42"),
            "SELECT * FROM t WHERE name = ? AND id = :id1 AND n > ?"
        );
    }

    #[test]
    fn test_identifiers_with_digits_are_kept() {
        let log = StatementLog::default();
        assert_eq!(log.render("SELECT col2 FROM t1"), "SELECT col2 FROM t1");
    }

    #[test]
    fn test_unterminated_literal_is_masked() {
        let log = StatementLog::default();
        assert_eq!(log.render("SELECT 'oops"), "SELECT ?");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let log = StatementLog::verbatim();
        assert_eq!(
            log.render("SELECT *\n  FROM t\n WHERE a = 'x'"),
            "SELECT * FROM t WHERE a = 'x'"
        );
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
