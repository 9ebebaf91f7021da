const TRUTHY_VALUES: [&str; 4] = ["1", "true", "yes", "on"];

/// Whether a metadata value switches a flag on.
///
/// Matching is case-insensitive and exact; surrounding whitespace makes the
/// value falsy.
pub fn is_truthy(raw: &str) -> bool {
    TRUTHY_VALUES
        .iter()
        .any(|candidate| raw.eq_ignore_ascii_case(candidate))
}
