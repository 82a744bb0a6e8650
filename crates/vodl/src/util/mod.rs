use url::Url;

use crate::error::{VodlError, VodlResult};

pub mod http;
pub mod path;

/// Resolve a playlist reference against the URL of the playlist it came from.
///
/// Absolute references are returned unchanged, scheme-relative and
/// path-relative ones are merged with `base` as described in RFC 3986.
pub fn resolve_reference(base: &Url, reference: &str) -> VodlResult<Url> {
    base.join(reference.trim())
        .map_err(|_| VodlError::InvalidUri {
            base: base.to_string(),
            reference: reference.to_string(),
        })
}
