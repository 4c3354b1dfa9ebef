#![deny(missing_docs)]
#![doc = "Core error types shared by the sweepgen crates."]

pub mod errors;

pub use errors::{ErrorInfo, SweepError};

/// Sentinel character that opens and closes every placeholder token.
pub const TOKEN_SENTINEL: char = '@';

/// Returns `true` when `token` starts and ends with [`TOKEN_SENTINEL`].
///
/// Mirrors the anchored pattern `^@.*@$`: the whole key must be delimited and
/// the interior may not span lines. A lone `@` does not qualify since the
/// opening and closing sentinels must be distinct characters.
pub fn is_placeholder_token(token: &str) -> bool {
    token.len() >= 2 * TOKEN_SENTINEL.len_utf8()
        && token.starts_with(TOKEN_SENTINEL)
        && token.ends_with(TOKEN_SENTINEL)
        && !token.contains('\n')
}
