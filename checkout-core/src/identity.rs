//! Resource identity parsing.
//!
//! Remote resources identify themselves through a self-reference URI whose
//! trailing path segment is the id, e.g. `http://user/customers/57a98d98`.
//! Only this module knows that encoding.

use std::sync::LazyLock;

use regex::Regex;

use crate::{CoreError, CoreResult};

/// Trailing run of ASCII word characters or dashes.
static RESOURCE_ID: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?-u:[\w-])+$"));

/// Extract the id matched by `[\w-]+$` (ASCII word characters) from `href`.
///
/// Fails with [`CoreError::IdentityError`] when `href` ends in any other
/// character (a trailing slash, a query string, an empty string).
pub fn parse_resource_id(href: &str) -> CoreResult<&str> {
    let pattern = RESOURCE_ID
        .as_ref()
        .map_err(|e| CoreError::IdentityError(format!("{} ({})", href, e)))?;

    pattern
        .find(href)
        .map(|m| m.as_str())
        .ok_or_else(|| CoreError::IdentityError(href.to_string()))
}
