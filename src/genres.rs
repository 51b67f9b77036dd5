//! Genre parsing and counting.
//!
//! The `genres` column stores a Python-style literal such as
//! `[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}]`.
//! It is read with a small literal parser into a `serde_json::Value`; any
//! malformed cell yields an empty genre list.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::record::{Genre, MovieRecord};

// Deeper nesting than this is rejected instead of recursing further.
const MAX_NESTING: usize = 32;

///Parse a genre literal into its `{id, name}` entries.
///Returns an empty list when the cell is not a well-formed list literal.
///Entries without a string `name` are dropped on their own.
/// # Example
/// ```
/// use movie_stats::parse_genres;
/// let genres = parse_genres("[{'id': 18, 'name': 'Drama'}]");
/// assert_eq!(genres[0].name, "Drama");
/// assert!(parse_genres("not-a-list").is_empty());
/// ```
pub fn parse_genres(raw: &str) -> Vec<Genre> {
    match parse_literal(raw) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Genre>(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

///Count movies per genre name across all records.
///Sorted by count descending, then by name.
pub fn count_genres(records: &[MovieRecord]) -> Vec<(String, usize)> {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for genre in records.iter().flat_map(|r| r.genres.iter()) {
        *frequency.entry(genre.name.as_str()).or_insert(0) += 1;
    }
    let mut counted: Vec<(String, usize)> = frequency
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counted
}

/// Parse a complete Python literal (lists, tuples, dicts, strings, numbers,
/// `None`, `True`, `False`). Trailing input after the value is rejected.
pub fn parse_literal(raw: &str) -> Option<Value> {
    let mut parser = LiteralParser {
        src: raw.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    (parser.pos == parser.src.len()).then_some(value)
}

// ---- Internal helpers ----

struct LiteralParser<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
}

impl LiteralParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_ws();
        match self.peek()? {
            b'[' => self.nested(|p| p.sequence(b']').map(Value::Array)),
            b'(' => self.nested(|p| p.sequence(b')').map(Value::Array)),
            b'{' => self.nested(|p| p.dict().map(Value::Object)),
            b'\'' | b'"' => self.string().map(Value::String),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.number(),
            _ => self.keyword(),
        }
    }

    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Option<Value>) -> Option<Value> {
        if self.depth >= MAX_NESTING {
            return None;
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn sequence(&mut self, close: u8) -> Option<Vec<Value>> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Some(items);
            }
            items.push(self.value()?);
            if !self.eat(b',') {
                return self.eat(close).then_some(items);
            }
        }
    }

    fn dict(&mut self) -> Option<Map<String, Value>> {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            if self.eat(b'}') {
                return Some(map);
            }
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            if !self.eat(b':') {
                return None;
            }
            let value = self.value()?;
            map.insert(key, value);
            if !self.eat(b',') {
                return self.eat(b'}').then_some(map);
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.peek()?;
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            let b = self.peek()?;
            self.pos += 1;
            match b {
                _ if b == quote => break,
                b'\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    match escaped {
                        b'n' => out.push(b'\n'),
                        b't' => out.push(b'\t'),
                        b'r' => out.push(b'\r'),
                        b'0' => out.push(0),
                        b'\\' | b'\'' | b'"' => out.push(escaped),
                        other => {
                            out.push(b'\\');
                            out.push(other);
                        }
                    }
                }
                _ => out.push(b),
            }
        }
        String::from_utf8(out).ok()
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|b| {
            b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E' | b'_')
        }) {
            self.pos += 1;
        }
        let text: String = std::str::from_utf8(&self.src[start..self.pos])
            .ok()?
            .replace('_', "");
        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::from(i));
        }
        let f = text.parse::<f64>().ok()?;
        Number::from_f64(f).map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        match &self.src[start..self.pos] {
            b"None" => Some(Value::Null),
            b"True" => Some(Value::Bool(true)),
            b"False" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(genres: &str) -> MovieRecord {
        MovieRecord {
            genres: parse_genres(genres),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_tmdb_literal() {
        let genres =
            parse_genres("[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': \"Children's\"}]");
        assert_eq!(
            genres,
            vec![
                Genre {
                    id: Some(16),
                    name: "Animation".to_string()
                },
                Genre {
                    id: Some(35),
                    name: "Children's".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_malformed_is_empty() {
        assert!(parse_genres("not-a-list").is_empty());
        assert!(parse_genres("").is_empty());
        assert!(parse_genres("[{'id': 1, 'name': 'Drama'}").is_empty());
        assert!(parse_genres("[{'id': 1, 'name': 'Drama'}] trailing").is_empty());
        assert!(parse_genres("{'id': 1, 'name': 'Drama'}").is_empty());
        assert!(parse_genres("[]").is_empty());
    }

    #[test]
    fn test_incomplete_entries_dropped() {
        let genres = parse_genres("[{'id': 1}, {'id': 2, 'name': 'Drama'}, 5, None]");
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].id, Some(2));
    }

    #[test]
    fn test_entry_without_id_is_kept() {
        let genres = parse_genres("[{'name': 'Drama'}, {'id': None, 'name': 'Comedy'}]");
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Drama", "Comedy"]);
        assert!(genres.iter().all(|g| g.id.is_none()));
    }

    #[test]
    fn test_deep_nesting_is_empty() {
        assert!(parse_genres(&"[".repeat(100_000)).is_empty());
        let closed = format!("{}{}", "[".repeat(1_000), "]".repeat(1_000));
        assert!(parse_genres(&closed).is_empty());
        assert!(parse_literal(&closed).is_none());
    }

    #[test]
    fn test_moderate_nesting_still_parses() {
        let v = parse_literal("[[[{'a': ({'b': [1]},)}]]]").unwrap();
        assert_eq!(v, serde_json::json!([[[{"a": [{"b": [1]}]}]]]));
    }

    #[test]
    fn test_literal_values() {
        let v = parse_literal("(1, -2.5, 'a\\'b', None, True, [ ], {'k': False},)").unwrap();
        assert_eq!(
            v,
            serde_json::json!([1, -2.5, "a'b", null, true, [], {"k": false}])
        );
    }

    #[test]
    fn test_count_genres() {
        let movies = vec![
            movie("[{'id':1,'name':'Drama'}]"),
            movie("not-a-list"),
            movie("[{'id':1,'name':'Drama'}, {'id':2,'name':'Comedy'}]"),
        ];
        assert_eq!(
            count_genres(&movies),
            vec![("Drama".to_string(), 2), ("Comedy".to_string(), 1)]
        );
    }

    #[test]
    fn test_count_genres_single_drama() {
        let movies = vec![movie("[{'id':1,'name':'Drama'}]"), movie("not-a-list")];
        assert_eq!(count_genres(&movies), vec![("Drama".to_string(), 1)]);
    }
}
