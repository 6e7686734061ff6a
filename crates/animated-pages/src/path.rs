//! Dotted property paths (`user.address.city`) on JSON values

use serde_json::{Map, Value};

/// Returns the first segment of a dotted path.
#[inline]
pub(crate) fn root(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Returns `true` if the path addresses a nested value.
#[inline]
pub(crate) fn is_deep(path: &str) -> bool {
    path.contains('.')
}

/// Joins a root property name and an optional sub path.
pub(crate) fn join(root: &str, subpath: Option<&str>) -> String {
    match subpath {
        Some(sub) if !sub.is_empty() => format!("{root}.{sub}"),
        _ => root.to_string(),
    }
}

/// Reads the value at `path`.
pub(crate) fn get<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(obj) => obj.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `path`, creating intermediate objects as needed.
///
/// Returns `false` if an intermediate segment exists but is not an object.
pub(crate) fn set(map: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return false;
    };

    let mut current = map;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(obj) => obj,
            _ => return false,
        };
    }
    current.insert(last.to_string(), value);
    true
}
