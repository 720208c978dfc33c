//! Token comparison helpers.
//!
//! SQL identifiers are case-insensitive, so literal tokens are compared
//! with ASCII case folding. Non-ASCII characters are compared exactly.

use alloc::string::String;

/// Compares two tokens ignoring ASCII case.
///
/// ```
/// use strata_core::chars::equals_ignore_case;
/// assert!(equals_ignore_case("Price", "pRICE"));
/// assert!(!equals_ignore_case("price", "prices"));
/// ```
pub fn equals_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Returns a lower-cased copy of `token` suitable as a case-folded map key.
pub fn lower_case_key(token: &str) -> String {
    token.to_ascii_lowercase()
}
