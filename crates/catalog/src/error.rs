//! Catalog-level error type.

use thiserror::Error;

/// Errors returned by a [`CatalogSource`](crate::CatalogSource).
///
/// None of these reach the user as a hard failure: [`load_catalog`](crate::load_catalog)
/// degrades to the built-in palette whenever the source errors.
#[derive(Debug, Error, Clone)]
pub enum CatalogError {
    /// The remote catalog could not be reached or answered with an error.
    #[error("catalog source unavailable: {0}")]
    Unavailable(String),

    /// The source answered, but the body was not a usable listing.
    #[error("malformed catalog listing: {0}")]
    Malformed(String),
}
