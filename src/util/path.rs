// src/util/path.rs

//! String-level helpers for slash-separated paths such as sysfs entries.
//!
//! Empty components (leading, trailing or doubled slashes) are ignored.

/// `n`-th component counted from the start, 0-based.
///
/// `component("/sys/devices/x/y/z", 1)` is `Some("devices")`.
pub fn component(path: &str, n: usize) -> Option<&str> {
    path.split('/').filter(|c| !c.is_empty()).nth(n)
}

/// `n`-th component counted from the end; 0 is the last one.
///
/// `component_from_end("/sys/devices/x/y/z", 1)` is `Some("y")`.
pub fn component_from_end(path: &str, n: usize) -> Option<&str> {
    path.rsplit('/').filter(|c| !c.is_empty()).nth(n)
}

/// Strip trailing slashes, keeping a lone `/`.
pub fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Remove the last component.
///
/// Returns the remaining path (without trailing slash) and whether a
/// component was actually dropped.
pub fn drop_last_component(path: &str) -> (String, bool) {
    let trimmed = trim_trailing_slash(path);
    if trimmed.is_empty() || trimmed == "/" {
        return (trimmed.to_string(), false);
    }

    match trimmed.rfind('/') {
        Some(idx) => {
            let parent = trim_trailing_slash(&trimmed[..idx]);
            if parent.is_empty() {
                ("/".to_string(), true)
            } else {
                (parent.to_string(), true)
            }
        }
        None => (String::new(), true),
    }
}
