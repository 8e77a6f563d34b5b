//! Common utility functions.
//!
//! Branch prediction hints for the dispatch hot path.

/// Marker function for cold code paths.
///
/// Used with branch prediction hints to inform the compiler about infrequently executed paths.
#[inline(always)]
#[cold]
pub fn cold() {}

/// Branch prediction hint for conditions expected to be false.
///
/// Helps the compiler optimize for the more common case where the condition is false.
///
/// # Example
/// ```ignore
/// if unlikely(error_condition) {
///     handle_error();
/// }
/// ```
#[inline(always)]
pub fn unlikely(b: bool) -> bool {
    if b {
        cold()
    }
    b
}
