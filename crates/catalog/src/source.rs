//! The `CatalogSource` trait, where the palette comes from.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::{Catalog, CatalogError};

/// Anything that can produce a raw primitive listing.
///
/// The HTTP client implements this against the engine; tests use
/// [`MockCatalogSource`](crate::mock::MockCatalogSource).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the raw listing (array of identifiers or map keyed by identifier).
    async fn fetch(&self) -> Result<Value, CatalogError>;
}

/// Fetch and resolve the catalog.
///
/// Never fails: on any source error the built-in palette is returned, so the
/// editor always has at least one trigger to place.
pub async fn load_catalog(source: &dyn CatalogSource) -> Catalog {
    match source.fetch().await {
        Ok(listing) => {
            let catalog = Catalog::from_listing(&listing);
            info!("primitive catalog loaded ({} entries)", catalog.len());
            catalog
        }
        Err(e) => {
            warn!("primitive catalog unavailable, using built-in set: {e}");
            Catalog::builtin()
        }
    }
}

/// A source that always returns the same listing.
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    listing: Value,
}

impl StaticCatalogSource {
    pub fn new(listing: Value) -> Self {
        Self { listing }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self) -> Result<Value, CatalogError> {
        Ok(self.listing.clone())
    }
}
