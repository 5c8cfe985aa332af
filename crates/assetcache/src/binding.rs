//! Per-instance load cycle for one rendered icon
//!
//! ```text
//! Idle → Requesting → {CachedHit | Fetching} → Parsed → Bound
//! ```
//!
//! Changing the source restarts the cycle. Every request carries a
//! [`LoadTicket`]; results whose ticket is no longer current are dropped,
//! since in-flight fetches cannot be cancelled.

use tracing::debug;

use crate::binder::{apply_color, RenderState, StyleMap, StyleSink};
use crate::dimensions::DimensionRecord;
use crate::error::Result;
use crate::loader::{ArtifactOrigin, AssetLoader, LoadedAsset};

/// Asset key used when none is given
pub const DEFAULT_SOURCE: &str = "logo";
/// Scale used when none is given
pub const DEFAULT_SCALE: f64 = 1.0;
/// Colour used when none is given
pub const DEFAULT_COLOR: &str = "current";

/// Where a binding is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing requested yet
    Idle,
    /// A load was issued
    Requesting,
    /// The store is answering
    CachedHit,
    /// Waiting on the network
    Fetching,
    /// Artifact parsed and dimensions resolved
    Parsed,
    /// Render state applied
    Bound,
}

/// Tag identifying one load request of a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    key: String,
    generation: u64,
}

impl LoadTicket {
    /// Asset key the request was issued for
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// State of one icon instance: its props, its bound artifact and render state
#[derive(Debug)]
pub struct AssetBinding<S: StyleSink = StyleMap> {
    source: String,
    scale: f64,
    color: String,
    phase: LoadPhase,
    generation: u64,
    origin: Option<ArtifactOrigin>,
    artifact: Option<String>,
    dimensions: Option<DimensionRecord>,
    render: Option<RenderState>,
    sink: S,
}

impl<S: StyleSink + Default> Default for AssetBinding<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: StyleSink> AssetBinding<S> {
    /// Create a binding with default props, writing style variables to `sink`
    pub fn new(sink: S) -> Self {
        let mut binding = Self {
            source: DEFAULT_SOURCE.to_string(),
            scale: DEFAULT_SCALE,
            color: DEFAULT_COLOR.to_string(),
            phase: LoadPhase::Idle,
            generation: 0,
            origin: None,
            artifact: None,
            dimensions: None,
            render: None,
            sink,
        };
        apply_color(&binding.color, &mut binding.sink);
        binding
    }

    /// Builder-style source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Builder-style scale
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Builder-style colour
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.set_color(color);
        self
    }

    /// Current asset key
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current scale
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current colour
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Current load phase
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Where the bound artifact came from, once one is bound
    pub fn origin(&self) -> Option<ArtifactOrigin> {
        self.origin
    }

    /// The bound artifact markup
    pub fn cached_artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    /// The bound dimension record
    pub fn dimensions(&self) -> Option<DimensionRecord> {
        self.dimensions
    }

    /// The current render state
    pub fn render_state(&self) -> Option<&RenderState> {
        self.render.as_ref()
    }

    /// The style sink
    pub fn style(&self) -> &S {
        &self.sink
    }

    /// Change the asset key and start a new request for it
    pub fn set_source(&mut self, source: impl Into<String>) -> LoadTicket {
        self.source = source.into();
        self.begin()
    }

    /// Change the scale, rebinding the current record if there is one
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        if let Some(dimensions) = self.dimensions {
            self.bind(dimensions);
        }
    }

    /// Change the theme colour
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        apply_color(&self.color, &mut self.sink);
    }

    /// Issue a request for the current source, superseding earlier ones
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = LoadPhase::Requesting;
        LoadTicket {
            key: self.source.clone(),
            generation: self.generation,
        }
    }

    /// Apply a loaded asset if `ticket` is still current.
    ///
    /// Returns `false` and leaves the binding untouched for stale results.
    pub fn complete(&mut self, ticket: &LoadTicket, asset: LoadedAsset) -> bool {
        if !self.is_current(ticket) || asset.key != ticket.key {
            debug!(
                key = %ticket.key,
                current = %self.source,
                "discarding stale load result"
            );
            return false;
        }

        self.phase = LoadPhase::Parsed;
        self.origin = Some(asset.origin);
        self.artifact = Some(asset.artifact);
        self.dimensions = Some(asset.dimensions);
        self.bind(asset.dimensions);
        true
    }

    /// Run one full load cycle for the current source
    pub async fn load(&mut self, loader: &AssetLoader) -> Result<bool> {
        let ticket = self.begin();

        match loader.load_asset(&ticket.key).await {
            Ok(asset) => {
                if self.is_current(&ticket) {
                    self.phase = match asset.origin {
                        ArtifactOrigin::Store => LoadPhase::CachedHit,
                        ArtifactOrigin::Network => LoadPhase::Fetching,
                    };
                }
                if asset.origin == ArtifactOrigin::Network {
                    debug!(key = %ticket.key, "bound freshly fetched asset");
                }
                Ok(self.complete(&ticket, asset))
            }
            Err(e) => {
                if self.is_current(&ticket) {
                    self.phase = LoadPhase::Idle;
                }
                Err(e)
            }
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && ticket.key == self.source
    }

    fn bind(&mut self, dimensions: DimensionRecord) {
        let state = RenderState::compute(&dimensions, self.scale);
        state.apply(&mut self.sink);
        self.render = Some(state);
        self.phase = LoadPhase::Bound;
    }
}
