//! # assetcache
//!
//! Fetch, cache and size SVG icon assets.
//!
//! ## Architecture
//! - **Durable store**: `<key>_svg` markup and `<key>_dimensions` JSON,
//!   written once per key and never evicted
//! - **In-flight registry**: one shared future per key, so concurrent loads
//!   cause a single request per session
//! - **Fetcher**: GET `<origin><key>.svg`, falling back to an empty icon
//! - **Binder**: dimensions and scale into viewbox, size and style variables
//!
//! ```no_run
//! use std::sync::Arc;
//! use assetcache::{AssetBinding, AssetLoader, LoaderConfig};
//! use assetstore::AssetStore;
//!
//! # async fn run() -> assetcache::Result<()> {
//! let store = Arc::new(AssetStore::open("./data")?);
//! let loader = AssetLoader::new(LoaderConfig::new("https://example.com/icons/"), store)?;
//!
//! let mut icon: AssetBinding = AssetBinding::default().with_source("home").with_scale(2.0);
//! icon.load(&loader).await?;
//! println!("{:?}", icon.render_state());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod binder;
mod binding;
mod config;
mod dimensions;
mod error;
mod fetch;
mod loader;
mod registry;
mod stats;
mod svg;

pub use binder::{
    apply_color, format_number, RenderState, StyleMap, StyleSink, ASPECT_RATIO_VAR, COLOR_VAR,
    HEIGHT_VAR, WIDTH_VAR,
};
pub use binding::{AssetBinding, LoadPhase, LoadTicket, DEFAULT_COLOR, DEFAULT_SCALE, DEFAULT_SOURCE};
pub use config::{LoaderConfig, DEFAULT_TIMEOUT};
pub use dimensions::{dimensions_key, DimensionRecord, DimensionResolver};
pub use error::{Error, Result, TaskFailure};
pub use fetch::{Fetcher, HttpTransport, Response, Transport, TransportError};
pub use loader::{artifact_key, ArtifactOrigin, AssetLoader, LoadedAsset};
pub use registry::{ArtifactFuture, InFlightRegistry};
pub use stats::LoadStats;
pub use svg::{extract_svg, SvgRoot, ViewBox, FALLBACK_SVG};
