// src/util/text.rs

use tracing::debug;

/// Return the `position`-th (1-based) double-quoted string in `line`.
///
/// ```text
/// "first" junk "second" more "third"
/// ```
///
/// `quoted_field(line, 2)` is `Some("second")`. Returns `None` when
/// `position` is 0, when there are fewer quoted strings, or when the
/// requested string is not terminated.
pub fn quoted_field(line: &str, position: usize) -> Option<&str> {
    if line.is_empty() {
        return None;
    }
    if position == 0 {
        debug!(position, "invalid quoted field position");
        return None;
    }

    let mut cursor = 0;
    let mut field = None;

    for n in 1..=position {
        let Some(open) = line[cursor..].find('"').map(|i| cursor + i) else {
            debug!(position = n, "quoted field not found");
            return None;
        };
        let Some(close) = line[open + 1..].find('"').map(|i| open + 1 + i) else {
            debug!(position = n, "quoted field not terminated");
            return None;
        };
        field = Some(&line[open + 1..close]);
        cursor = close + 1;
    }

    field
}

pub fn count_char(s: &str, c: char) -> usize {
    s.chars().filter(|&ch| ch == c).count()
}
