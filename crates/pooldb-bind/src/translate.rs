//! Named-placeholder scanner and translator.

use std::collections::HashMap;

use pooldb_types::Binds;

use crate::error::BindError;
use crate::statement::{BoundStatement, PlaceholderStyle};

/// A piece of the templated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// SQL text copied through unchanged.
    Text(&'a str),
    /// A `:name` placeholder; holds the name without the colon.
    Placeholder(&'a str),
}

/// Translate a templated query into a positional statement.
///
/// Every `:name` placeholder must have a value in `binds`; extra binds are
/// ignored. With a numbered style a name used twice maps to the same
/// position, with [`PlaceholderStyle::Question`] the value is repeated.
pub fn translate(
    query: &str,
    binds: &Binds,
    style: PlaceholderStyle,
) -> Result<BoundStatement, BindError> {
    if query.trim().is_empty() {
        return Err(BindError::EmptyQuery);
    }

    let mut sql = String::with_capacity(query.len());
    let mut params = Vec::new();
    let mut names = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for segment in segments(query)? {
        match segment {
            Segment::Text(text) => sql.push_str(text),
            Segment::Placeholder(name) => {
                let value = binds
                    .get(name)
                    .ok_or_else(|| BindError::MissingParameter {
                        name: name.to_string(),
                    })?;

                let index = match positions.get(name) {
                    Some(&index) if style.is_numbered() => index,
                    _ => {
                        params.push(value.clone());
                        names.push(name.to_string());
                        positions.insert(name, params.len());
                        params.len()
                    }
                };
                style.write(&mut sql, index);
            }
        }
    }

    tracing::trace!(
        params = params.len(),
        style = ?style,
        "translated templated query"
    );

    Ok(BoundStatement::new(sql, params, names, style))
}

/// List the distinct placeholder names of a templated query, in order of
/// first appearance.
pub fn placeholder_names(query: &str) -> Result<Vec<&str>, BindError> {
    let mut names: Vec<&str> = Vec::new();
    for segment in segments(query)? {
        if let Segment::Placeholder(name) = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn segments(query: &str) -> Result<Vec<Segment<'_>>, BindError> {
    // All delimiters are ASCII, so byte offsets found here are always
    // char boundaries.
    let bytes = query.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_quoted(bytes, i, b'\'', "string literal")?,
            b'"' => i = skip_quoted(bytes, i, b'"', "quoted identifier")?,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |p| i + p + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = find(bytes, i + 2, b"*/")
                    .map(|p| p + 2)
                    .ok_or(BindError::Unterminated {
                        kind: "block comment",
                        position: i,
                    })?;
            }
            // `::` cast
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|&b| is_ident_start(b)) => {
                let name_start = i + 1;
                let mut end = name_start + 1;
                while end < bytes.len() && is_ident_char(bytes[end]) {
                    end += 1;
                }
                if text_start < i {
                    segments.push(Segment::Text(&query[text_start..i]));
                }
                segments.push(Segment::Placeholder(&query[name_start..end]));
                text_start = end;
                i = end;
            }
            _ => i += 1,
        }
    }

    if text_start < bytes.len() {
        segments.push(Segment::Text(&query[text_start..]));
    }

    Ok(segments)
}

/// Return the offset just past the closing quote.
fn skip_quoted(
    bytes: &[u8],
    open: usize,
    quote: u8,
    kind: &'static str,
) -> Result<usize, BindError> {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            // doubled quote is an escape
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(BindError::Unterminated {
        kind,
        position: open,
    })
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pooldb_types::SqlValue;
    use proptest::prelude::*;

    use super::*;

    fn dollar(query: &str, binds: &Binds) -> Result<BoundStatement, BindError> {
        translate(query, binds, PlaceholderStyle::Dollar)
    }

    #[test]
    fn test_single_placeholder() {
        let binds = Binds::new().bind("id", 7);
        let stmt = dollar("SELECT * FROM T WHERE ID = :id", &binds).unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM T WHERE ID = $1");
        assert_eq!(stmt.params(), &[SqlValue::Int(7)]);
        assert_eq!(stmt.param_names(), &["id".to_string()]);
    }

    #[test]
    fn test_repeated_name_reuses_position() {
        let binds = Binds::new().bind("a", 1).bind("b", 2);
        let stmt = dollar("SELECT :a, :b, :a", &binds).unwrap();
        assert_eq!(stmt.sql(), "SELECT $1, $2, $1");
        assert_eq!(stmt.params().len(), 2);
    }

    #[test]
    fn test_question_style_repeats_value() {
        let binds = Binds::new().bind("a", 1).bind("b", 2);
        let stmt = translate("SELECT :a, :b, :a", &binds, PlaceholderStyle::Question).unwrap();
        assert_eq!(stmt.sql(), "SELECT ?, ?, ?");
        assert_eq!(
            stmt.params(),
            &[SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(1)]
        );
    }

    #[test]
    fn test_other_styles() {
        let binds = Binds::new().bind("id", 1);
        let colon = translate("WHERE x = :id", &binds, PlaceholderStyle::Colon).unwrap();
        assert_eq!(colon.sql(), "WHERE x = :1");
        let atp = translate("WHERE x = :id", &binds, PlaceholderStyle::AtP).unwrap();
        assert_eq!(atp.sql(), "WHERE x = @p1");
    }

    #[test]
    fn test_literals_and_comments_are_skipped() {
        let binds = Binds::new().bind("id", 1);
        let stmt = dollar(
            "SELECT ':nope', \"col:x\" -- :also_not\nFROM t /* :neither */ WHERE id = :id",
            &binds,
        )
        .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT ':nope', \"col:x\" -- :also_not\nFROM t /* :neither */ WHERE id = $1"
        );
        assert_eq!(stmt.params().len(), 1);
    }

    #[test]
    fn test_escaped_quote_inside_literal() {
        let binds = Binds::new().bind("n", "x");
        let stmt = dollar("SELECT 'it''s :n' || :n", &binds).unwrap();
        assert_eq!(stmt.sql(), "SELECT 'it''s :n' || $1");
    }

    #[test]
    fn test_casts_and_assignment_pass_through() {
        let binds = Binds::new().bind("v", "5");
        let stmt = dollar("SELECT :v::int, x := 1", &binds).unwrap();
        assert_eq!(stmt.sql(), "SELECT $1::int, x := 1");
    }

    #[test]
    fn test_missing_parameter() {
        let err = dollar("SELECT :missing", &Binds::new()).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingParameter {
                name: "missing".into()
            }
        );
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(dollar("   ", &Binds::new()), Err(BindError::EmptyQuery));
    }

    #[test]
    fn test_unterminated_literal() {
        assert!(matches!(
            dollar("SELECT 'open", &Binds::new()),
            Err(BindError::Unterminated {
                kind: "string literal",
                position: 7
            })
        ));
        assert!(matches!(
            dollar("SELECT 1 /* open", &Binds::new()),
            Err(BindError::Unterminated {
                kind: "block comment",
                ..
            })
        ));
    }

    #[test]
    fn test_extra_binds_are_ignored() {
        let binds = Binds::new().bind("id", 1).bind("unused", 2);
        let stmt = dollar("SELECT :id", &binds).unwrap();
        assert_eq!(stmt.params(), &[SqlValue::Int(1)]);
    }

    #[test]
    fn test_placeholder_names_order() {
        let names = placeholder_names("SELECT :b, :a, :b").unwrap();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_non_ascii_text_is_preserved() {
        let binds = Binds::new().bind("nome", "José");
        let stmt = dollar("SELECT 'ação' AS v WHERE nome = :nome", &binds).unwrap();
        assert_eq!(stmt.sql(), "SELECT 'ação' AS v WHERE nome = $1");
    }

    proptest! {
        #[test]
        fn prop_text_without_colons_is_unchanged(s in "[a-zA-Z0-9 ,=*()]{1,64}") {
            prop_assume!(!s.trim().is_empty());
            let stmt = dollar(&s, &Binds::new()).unwrap();
            prop_assert_eq!(stmt.sql(), s.as_str());
            prop_assert!(stmt.params().is_empty());
        }

        #[test]
        fn prop_every_placeholder_is_bound(names in proptest::collection::vec("[a-z][a-z0-9_]{0,8}", 1..6)) {
            let query = format!(
                "SELECT {}",
                names.iter().map(|n| format!(":{n}")).collect::<Vec<_>>().join(", ")
            );
            let binds: Binds = names.iter().map(|n| (n.clone(), 1)).collect();
            let stmt = dollar(&query, &binds).unwrap();

            let mut distinct = names.clone();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(stmt.params().len(), distinct.len());
            prop_assert!(!stmt.sql().contains(':'));
        }
    }
}
