//! `MockCatalogSource` — a test double for `CatalogSource`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::{CatalogError, CatalogSource};

/// Behaviour injected into `MockCatalogSource` at construction time.
pub enum MockBehaviour {
    /// Return a specific listing.
    ReturnListing(Value),
    /// Fail with `CatalogError::Unavailable`.
    Fail(String),
}

/// A mock source that counts fetches and returns a programmer-specified
/// result.
pub struct MockCatalogSource {
    pub behaviour: MockBehaviour,
    calls: Arc<Mutex<usize>>,
}

impl MockCatalogSource {
    /// Create a mock that always answers with `listing`.
    pub fn returning(listing: Value) -> Self {
        Self {
            behaviour: MockBehaviour::ReturnListing(listing),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a mock that always fails.
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            behaviour: MockBehaviour::Fail(msg.into()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of times `fetch` has been called.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch(&self) -> Result<Value, CatalogError> {
        *self.calls.lock().unwrap() += 1;

        match &self.behaviour {
            MockBehaviour::ReturnListing(listing) => Ok(listing.clone()),
            MockBehaviour::Fail(msg) => Err(CatalogError::Unavailable(msg.clone())),
        }
    }
}
