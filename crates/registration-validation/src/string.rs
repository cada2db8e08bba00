//! String predicates used by field rules

/// True when the value is non-empty. Whitespace counts; trim first if it shouldn't.
pub fn is_present(s: &str) -> bool {
    !s.is_empty()
}

/// Length in characters, not bytes
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

pub fn has_min_chars(s: &str, min: usize) -> bool {
    char_count(s) >= min
}

pub fn has_max_chars(s: &str, max: usize) -> bool {
    char_count(s) <= max
}

/// Enum/value restriction
pub fn is_one_of(value: &str, allowed: &[&str]) -> bool {
    allowed.contains(&value)
}
