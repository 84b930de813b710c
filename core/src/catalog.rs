//! Garment catalog interface.
//!
//! The catalog is static reference data owned elsewhere; the lifecycle only
//! consumes it to validate submissions and to decide which garment keys are
//! tracked in employee profiles. Physical stock levels are a separate
//! subsystem and play no part in request validity.

use crate::types::{GarmentKey, Size};
use serde::{Deserialize, Serialize};

/// One garment type the organization issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentType {
    /// Stable key, shared with request items and employee profiles.
    pub key: GarmentKey,
    /// Human-readable name.
    pub display_name: String,
    /// Sizes this garment type can be ordered in.
    pub allowed_sizes: Vec<Size>,
}

/// Catalog of garment types, keys and allowed sizes.
///
/// A key known to the catalog is a *tracked* key: confirming a request
/// containing it updates the employee's garment profile.
pub trait GarmentCatalog: Send + Sync {
    /// All garment types.
    fn garment_types(&self) -> &[GarmentType];

    /// Allowed sizes for a garment key, or `None` if the key is unknown.
    fn allowed_sizes(&self, key: &GarmentKey) -> Option<&[Size]> {
        self.garment_types()
            .iter()
            .find(|garment| &garment.key == key)
            .map(|garment| garment.allowed_sizes.as_slice())
    }

    /// Whether the key belongs to the tracked-garment namespace.
    fn is_tracked(&self, key: &GarmentKey) -> bool {
        self.allowed_sizes(key).is_some()
    }
}

/// Catalog backed by a fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: Vec<GarmentType>,
}

impl StaticCatalog {
    /// Create a catalog from a list of garment types.
    #[must_use]
    pub fn new(types: Vec<GarmentType>) -> Self {
        Self { types }
    }
}

impl GarmentCatalog for StaticCatalog {
    fn garment_types(&self) -> &[GarmentType] {
        &self.types
    }
}
