//! Field resolution for partial updates.
//!
//! A partial update rewrites every column, taking the incoming value when
//! one is supplied and the stored value otherwise. Absent and blank text
//! are treated the same way: both keep the stored value.

/// Return the text if it contains anything other than whitespace.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pick the incoming text unless it is absent or blank.
pub fn resolve_text(incoming: Option<&str>, current: &str) -> String {
    non_blank(incoming).unwrap_or(current).to_string()
}

/// Pick the incoming value when present.
pub fn resolve_value<T: Copy>(incoming: Option<T>, current: T) -> T {
    incoming.unwrap_or(current)
}
