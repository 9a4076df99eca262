//! Dotted-path JSON queries.
//!
//! A small evaluator used by the path-based assertions. Paths are
//! `.`-separated segments with an optional leading `$`: object keys, numeric
//! array indices, and `*` wildcards over object values or array elements.
//! Evaluation returns every match; a final array value flattens into its
//! elements so length checks count elements rather than "one array".
//!
//! ```
//! use gardenia_api::json_path;
//! use serde_json::json;
//!
//! let doc = json!({"items": [{"id": 1}, {"id": 2}]});
//! assert_eq!(json_path::apply("items", &doc).len(), 2);
//! assert_eq!(json_path::apply("items.0.id", &doc), vec![json!(1)]);
//! assert_eq!(json_path::apply("items.*.id", &doc), vec![json!(1), json!(2)]);
//! ```

use serde_json::Value;

/// One parsed path segment.
enum Segment<'a> {
    /// An object field name.
    Key(&'a str),
    /// A numeric array index.
    Index(usize),
    /// All object values or array elements.
    Wildcard,
}

fn parse_segment(raw: &str) -> Segment<'_> {
    if raw == "*" {
        Segment::Wildcard
    } else if let Ok(index) = raw.parse::<usize>() {
        Segment::Index(index)
    } else {
        Segment::Key(raw)
    }
}

/// Applies `path` to `root` and returns all matched values.
///
/// Missing keys and out-of-range indices simply produce no matches; the
/// result is empty rather than an error.
#[must_use]
pub fn apply(path: &str, root: &Value) -> Vec<Value> {
    let trimmed = path.trim_start_matches('$');
    let mut nodes: Vec<&Value> = vec![root];

    for raw in trimmed.split('.').filter(|s| !s.is_empty()) {
        let segment = parse_segment(raw);
        let mut next = Vec::new();
        for node in nodes {
            step(&segment, node, &mut next);
        }
        nodes = next;
    }

    // A trailing array match stands for its elements.
    let mut matches = Vec::new();
    for node in nodes {
        match node {
            Value::Array(items) => matches.extend(items.iter().cloned()),
            other => matches.push(other.clone()),
        }
    }
    matches
}

fn step<'a>(segment: &Segment<'_>, node: &'a Value, out: &mut Vec<&'a Value>) {
    match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => {
            if let Some(value) = map.get(*key) {
                out.push(value);
            }
        }
        // A key segment over an array selects the field from each element.
        (Segment::Key(key), Value::Array(items)) => {
            for item in items {
                if let Some(value) = item.get(*key) {
                    out.push(value);
                }
            }
        }
        (Segment::Index(index), Value::Array(items)) => {
            if let Some(value) = items.get(*index) {
                out.push(value);
            }
        }
        (Segment::Wildcard, Value::Object(map)) => out.extend(map.values()),
        (Segment::Wildcard, Value::Array(items)) => out.extend(items.iter()),
        _ => {}
    }
}
