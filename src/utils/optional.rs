//! Helpers for marking record fields as present.
//!
//! A field set through one of these is sent even when it holds its zero
//! value (`""`, `0`, `false`), unlike a field left as `None`.

#[must_use]
pub fn string(value: impl Into<String>) -> Option<String> {
    Some(value.into())
}

#[must_use]
pub fn int(value: i64) -> Option<i64> {
    Some(value)
}

#[must_use]
pub fn boolean(value: bool) -> Option<bool> {
    Some(value)
}

#[must_use]
pub fn float(value: f64) -> Option<f64> {
    Some(value)
}
