//! Tabular fixtures and tagged key/value inputs.
//!
//! BDD runners hand step definitions row-oriented data tables. The session
//! only works with flat key→value maps, so callers resolve the shape up
//! front with [`KeyValues`]: either a flat map or a [`Table`] whose first
//! column holds keys. Request bodies go through [`RequestBody`], which keeps
//! raw text verbatim and form-encodes tabular input.

use indexmap::IndexMap;

/// A row/column data table as supplied by a BDD runner.
///
/// The first row is the header row and is skipped during conversion. In each
/// data row the first cell is the key and the last cell is the value; rows
/// without a value cell are ignored.
///
/// # Example
///
/// ```
/// use gardenia_api::Table;
///
/// let table = Table::new(vec![
///     vec!["key".into(), "value".into()],
///     vec!["a".into(), "1".into()],
///     vec!["b".into(), "2".into()],
/// ]);
///
/// let map = table.to_map();
/// assert_eq!(map.get("a").map(String::as_str), Some("1"));
/// assert_eq!(map.get("b").map(String::as_str), Some("2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table from raw rows, header row first.
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Returns the raw rows, header included.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Converts the data rows into a flat key→value map.
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        for row in self.rows.iter().skip(1) {
            let (Some(key), Some(value)) = (row.first(), row.last()) else {
                continue;
            };
            if row.len() < 2 {
                continue;
            }
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for Table {
    /// Builds a two-column table (with a synthetic header row) from pairs.
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        let mut rows = vec![vec!["key".to_string(), "value".to_string()]];
        rows.extend(
            iter.into_iter()
                .map(|(k, v)| vec![k.into(), v.into()]),
        );
        Self { rows }
    }
}

/// Key/value input accepted by the session's request builders.
///
/// Resolves the "flat map or data table" question at the type level instead
/// of probing the value's shape at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValues {
    /// A flat key→value mapping.
    Flat(IndexMap<String, String>),
    /// A row-oriented data table, converted on use.
    Tabular(Table),
}

impl KeyValues {
    /// Resolves the input into a flat map.
    #[must_use]
    pub fn into_map(self) -> IndexMap<String, String> {
        match self {
            Self::Flat(map) => map,
            Self::Tabular(table) => table.to_map(),
        }
    }
}

impl From<IndexMap<String, String>> for KeyValues {
    fn from(map: IndexMap<String, String>) -> Self {
        Self::Flat(map)
    }
}

impl From<Table> for KeyValues {
    fn from(table: Table) -> Self {
        Self::Tabular(table)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for KeyValues {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::Flat(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<&[(&str, &str)]> for KeyValues {
    fn from(pairs: &[(&str, &str)]) -> Self {
        Self::Flat(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }
}

/// Body input accepted by [`ApiSession::set_body`](crate::ApiSession::set_body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Raw text stored verbatim.
    Raw(String),
    /// Key/value input serialized as `key=value&...` with URL-encoded values.
    Form(KeyValues),
}

impl RequestBody {
    /// Serializes the body into the string sent over the wire.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Raw(text) => text,
            Self::Form(input) => form_encode(&input.into_map()),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Raw(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Raw(text.to_string())
    }
}

impl From<Table> for RequestBody {
    fn from(table: Table) -> Self {
        Self::Form(KeyValues::Tabular(table))
    }
}

impl From<KeyValues> for RequestBody {
    fn from(input: KeyValues) -> Self {
        Self::Form(input)
    }
}

/// Serializes a map as `key=value&...`, URL-encoding the values.
fn form_encode(map: &IndexMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Table {
        Table::new(vec![
            vec!["key".into(), "value".into()],
            vec!["a".into(), "1".into()],
            vec!["b".into(), "2".into()],
        ])
    }

    #[test]
    fn test_header_row_skipped() {
        let map = fixture().to_map();
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("key"));
    }

    #[test]
    fn test_last_column_wins() {
        let table = Table::new(vec![
            vec!["name".into(), "first".into(), "last".into()],
            vec!["a".into(), "old".into(), "new".into()],
        ]);
        assert_eq!(table.to_map().get("a").map(String::as_str), Some("new"));
    }

    #[test]
    fn test_single_cell_row_ignored() {
        let table = Table::new(vec![
            vec!["key".into(), "value".into()],
            vec!["orphan".into()],
            vec!["a".into(), "1".into()],
        ]);
        let map = table.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_from_pairs() {
        let table: Table = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(table.to_map(), fixture().to_map());
    }

    #[test]
    fn test_key_values_flat() {
        let input = KeyValues::from([("q", "x")]);
        assert_eq!(input.into_map().get("q").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_body_raw_verbatim() {
        let body = RequestBody::from("{\"a\": 1}");
        assert_eq!(body.into_string(), "{\"a\": 1}");
    }

    #[test]
    fn test_body_form_encoding() {
        let body = RequestBody::from(fixture());
        assert_eq!(body.into_string(), "a=1&b=2");
    }

    #[test]
    fn test_body_form_values_url_encoded() {
        let table: Table = [("q", "a b&c")].into_iter().collect();
        let body = RequestBody::from(table);
        assert_eq!(body.into_string(), "q=a%20b%26c");
    }
}
