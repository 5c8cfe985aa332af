//! Dimension records and their write-once resolver

use std::sync::Arc;

use assetstore::DurableStore;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::svg::SvgRoot;

/// Store key holding the dimension record of an asset
pub fn dimensions_key(asset_key: &str) -> String {
    format!("{}_dimensions", asset_key)
}

/// Canonical width and height of an asset, taken from its viewBox
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionRecord {
    /// viewBox width
    #[serde(serialize_with = "whole_as_integer")]
    pub width: f64,
    /// viewBox height
    #[serde(serialize_with = "whole_as_integer")]
    pub height: f64,
}

// Largest integer an f64 represents exactly
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

/// Serialize `24.0` as `24` so records read the same as their viewBox.
fn whole_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl DimensionRecord {
    /// Create a record
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Read width and height off the root's viewBox, `0 x 0` when absent
    pub fn from_root(root: &SvgRoot) -> Self {
        root.view_box()
            .map(|vb| Self::new(vb.width, vb.height))
            .unwrap_or_default()
    }
}

/// Resolves dimensions once per asset key and serves the stored record after
#[derive(Clone)]
pub struct DimensionResolver {
    store: Arc<dyn DurableStore>,
}

impl DimensionResolver {
    /// Create a resolver over the given store
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Return the stored record for `asset_key`, or derive it from `root`
    /// and store it.
    ///
    /// A stored record always wins, even if `root` now says otherwise. A
    /// corrupt record is re-derived and overwritten.
    pub fn resolve_dimensions(&self, asset_key: &str, root: &SvgRoot) -> DimensionRecord {
        let store_key = dimensions_key(asset_key);

        match self.store.get(&store_key) {
            Ok(Some(text)) => match serde_json::from_str::<DimensionRecord>(&text) {
                Ok(record) => return record,
                Err(e) => warn!("Discarding corrupt dimension record {}: {}", store_key, e),
            },
            Ok(None) => {}
            Err(e) => warn!("Dimension lookup for {} failed: {}", store_key, e),
        }

        let record = DimensionRecord::from_root(root);
        debug!(key = %store_key, width = record.width, height = record.height, "derived dimensions");

        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = self.store.set(&store_key, &json) {
                    warn!("Could not persist {}: {}", store_key, e);
                }
            }
            Err(e) => warn!("Could not encode {}: {}", store_key, e),
        }

        record
    }
}
