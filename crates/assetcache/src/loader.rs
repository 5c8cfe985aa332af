//! Loader: store lookup, then registry dedup, then fetch
//!
//! ```text
//! load(key)
//!   ├─ store has <key>_svg ─────────────► artifact      (no network)
//!   └─ registry.get_or_create(<key>_svg)
//!        └─ spawned task: fetch(uri) → store.set → artifact
//! ```
//!
//! The fetch runs on its own task, so it finishes and fills the store even
//! if every caller has gone away. Starting one therefore needs a Tokio
//! runtime; a store miss outside one fails with [`Error::NoRuntime`].

use std::future::Future;
use std::sync::Arc;

use assetstore::DurableStore;
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::dimensions::{DimensionRecord, DimensionResolver};
use crate::error::{Error, Result, TaskFailure};
use crate::fetch::{Fetcher, HttpTransport, Transport};
use crate::registry::InFlightRegistry;
use crate::stats::LoadStats;
use crate::svg::SvgRoot;

/// Store key holding the raw markup of an asset
pub fn artifact_key(asset_key: &str) -> String {
    format!("{}_svg", asset_key)
}

/// Where a loaded artifact came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    /// Read straight from the durable store
    Store,
    /// Produced by a fetch, possibly one started by another caller
    Network,
}

/// A loaded artifact together with its resolved dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAsset {
    /// Asset key the artifact was loaded for
    pub key: String,
    /// Raw SVG markup
    pub artifact: String,
    /// Stored or freshly derived dimensions
    pub dimensions: DimensionRecord,
    /// How the artifact was obtained
    pub origin: ArtifactOrigin,
}

/// Orchestrates the store, the in-flight registry and the fetcher
#[derive(Clone)]
pub struct AssetLoader {
    config: Arc<LoaderConfig>,
    store: Arc<dyn DurableStore>,
    registry: Arc<InFlightRegistry>,
    fetcher: Fetcher,
    dimensions: DimensionResolver,
    stats: Arc<LoadStats>,
}

impl AssetLoader {
    /// Create a loader fetching over HTTP
    pub fn new(config: LoaderConfig, store: Arc<dyn DurableStore>) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, store, Arc::new(transport)))
    }

    /// Create a loader over a custom transport, with a fresh registry
    pub fn with_transport(
        config: LoaderConfig,
        store: Arc<dyn DurableStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let stats = Arc::new(LoadStats::new());

        Self {
            config: Arc::new(config),
            fetcher: Fetcher::new(transport, stats.clone()),
            dimensions: DimensionResolver::new(store.clone()),
            registry: Arc::new(InFlightRegistry::new()),
            store,
            stats,
        }
    }

    /// Share an existing registry instead of this loader's own
    pub fn with_registry(mut self, registry: Arc<InFlightRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Load the raw artifact for `asset_key`
    ///
    /// A store miss spawns the fetch onto the current Tokio runtime. Without
    /// one the load fails with [`Error::NoRuntime`] instead of panicking.
    pub async fn load(&self, asset_key: &str) -> Result<String> {
        self.load_with_origin(asset_key).await.map(|(artifact, _)| artifact)
    }

    /// Load the artifact, parse it and resolve its dimensions
    pub async fn load_asset(&self, asset_key: &str) -> Result<LoadedAsset> {
        let (artifact, origin) = self.load_with_origin(asset_key).await?;

        let root = SvgRoot::parse(&artifact).unwrap_or_else(|e| {
            warn!("Artifact for {} is not valid SVG: {}", asset_key, e);
            SvgRoot::empty()
        });
        let dimensions = self.dimensions.resolve_dimensions(asset_key, &root);

        Ok(LoadedAsset {
            key: asset_key.to_string(),
            artifact,
            dimensions,
            origin,
        })
    }

    async fn load_with_origin(&self, asset_key: &str) -> Result<(String, ArtifactOrigin)> {
        let store_key = artifact_key(asset_key);

        if let Some(artifact) = self.lookup(&store_key) {
            self.stats.record_store_hit();
            debug!(key = %store_key, "store hit");
            return Ok((artifact, ArtifactOrigin::Store));
        }
        self.stats.record_store_miss();

        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No Tokio runtime to fetch {} on", store_key);
            return Err(Error::NoRuntime { key: store_key });
        }

        let (future, created) = self
            .registry
            .get_or_create(&store_key, || self.spawn_fetch(asset_key, &store_key));
        if !created {
            self.stats.record_registry_join();
            debug!(key = %store_key, "joined in-flight request");
        }

        let artifact = future.await.map_err(|reason| Error::Task {
            key: store_key,
            reason,
        })?;
        Ok((artifact, ArtifactOrigin::Network))
    }

    fn spawn_fetch(
        &self,
        asset_key: &str,
        store_key: &str,
    ) -> impl Future<Output = std::result::Result<String, TaskFailure>> + Send + 'static {
        let uri = self.config.uri(asset_key);
        let store_key = store_key.to_string();
        let fetcher = self.fetcher.clone();
        let store = self.store.clone();
        let stats = self.stats.clone();

        let handle = tokio::spawn(async move {
            let artifact = fetcher.fetch(&uri).await;

            // Write-once: never replace an artifact another session stored
            match store.contains_key(&store_key) {
                Ok(true) => debug!(key = %store_key, "already stored, keeping first write"),
                Ok(false) => {
                    if let Err(e) = store.set(&store_key, &artifact) {
                        stats.record_store_error();
                        warn!("Could not persist {}: {}", store_key, e);
                    }
                }
                Err(e) => {
                    stats.record_store_error();
                    warn!("Could not persist {}: {}", store_key, e);
                }
            }

            artifact
        });

        async move { handle.await.map_err(|e| TaskFailure(e.to_string())) }
    }

    fn lookup(&self, store_key: &str) -> Option<String> {
        match self.store.get(store_key) {
            Ok(value) => value,
            Err(e) => {
                self.stats.record_store_error();
                warn!("Store lookup for {} failed, treating as miss: {}", store_key, e);
                None
            }
        }
    }

    /// The stored artifact for `asset_key`, without touching the network
    pub fn cached(&self, asset_key: &str) -> Option<String> {
        self.lookup(&artifact_key(asset_key))
    }

    /// Whether `asset_key` would be answered from the store
    pub fn has_cached(&self, asset_key: &str) -> bool {
        self.cached(asset_key).is_some()
    }

    /// Request URI for `asset_key`
    pub fn uri(&self, asset_key: &str) -> String {
        self.config.uri(asset_key)
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The in-flight registry this loader deduplicates through
    pub fn registry(&self) -> &Arc<InFlightRegistry> {
        &self.registry
    }

    /// Load statistics
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::tests::StubTransport;
    use crate::fetch::{Response, TransportError};
    use crate::svg::FALLBACK_SVG;
    use assetstore::MemoryStore;
    use async_trait::async_trait;
    use futures::FutureExt;

    const ORIGIN: &str = "http://icons.test/";
    const HOME: &str = r#"<svg viewBox="0 0 24 24"><path d="M3 12l9-9 9 9"/></svg>"#;

    fn loader(transport: StubTransport) -> (AssetLoader, Arc<StubTransport>, Arc<MemoryStore>) {
        let transport = Arc::new(transport);
        let store = Arc::new(MemoryStore::new());
        let loader =
            AssetLoader::with_transport(LoaderConfig::new(ORIGIN), store.clone(), transport.clone());
        (loader, transport, store)
    }

    #[tokio::test]
    async fn test_home_scenario() {
        let (loader, _, store) =
            loader(StubTransport::default().serve("http://icons.test/home.svg", 200, HOME));

        let asset = loader.load_asset("home").await.unwrap();

        assert_eq!(asset.artifact, HOME);
        assert_eq!(asset.origin, ArtifactOrigin::Network);
        assert_eq!(asset.dimensions, DimensionRecord::new(24.0, 24.0));
        assert_eq!(store.get("home_svg").unwrap().as_deref(), Some(HOME));
        assert_eq!(
            store.get("home_dimensions").unwrap().as_deref(),
            Some(r#"{"width":24,"height":24}"#)
        );
    }

    #[tokio::test]
    async fn test_concurrent_loads_fetch_once() {
        let (loader, transport, _) =
            loader(StubTransport::default().serve("http://icons.test/home.svg", 200, HOME));

        let loads = (0..8).map(|_| loader.load("home"));
        let results = futures::future::join_all(loads).await;

        for result in results {
            assert_eq!(result.unwrap(), HOME);
        }
        assert_eq!(transport.request_count("http://icons.test/home.svg"), 1);
        assert_eq!(loader.stats().fetches(), 1);
        assert_eq!(loader.stats().registry_joins(), 7);
    }

    #[tokio::test]
    async fn test_store_hit_skips_network() {
        let (loader, transport, store) = loader(StubTransport::default());
        store.set("home_svg", HOME).unwrap();

        let asset = loader.load_asset("home").await.unwrap();

        assert_eq!(asset.artifact, HOME);
        assert_eq!(asset.origin, ArtifactOrigin::Store);
        assert!(transport.requests.lock().is_empty());
        assert!(loader.registry().is_empty());
        assert_eq!(loader.stats().store_hits(), 1);
    }

    #[tokio::test]
    async fn test_fallback_is_persisted() {
        let (loader, transport, store) = loader(
            StubTransport::default()
                .fail("http://icons.test/missing.svg", TransportError::Network("refused".into())),
        );

        let asset = loader.load_asset("missing").await.unwrap();
        assert_eq!(asset.artifact, FALLBACK_SVG);
        assert_eq!(asset.dimensions, DimensionRecord::new(0.0, 0.0));
        assert_eq!(store.get("missing_svg").unwrap().as_deref(), Some(FALLBACK_SVG));

        // A new session over the same store short-circuits to the empty icon
        let next = AssetLoader::with_transport(
            LoaderConfig::new(ORIGIN),
            store.clone(),
            transport.clone(),
        );
        assert_eq!(next.load("missing").await.unwrap(), FALLBACK_SVG);
        assert_eq!(transport.request_count("http://icons.test/missing.svg"), 1);
    }

    #[tokio::test]
    async fn test_stored_dimensions_win() {
        let (loader, _, store) =
            loader(StubTransport::default().serve("http://icons.test/logo.svg", 200, HOME));
        store.set("logo_dimensions", r#"{"width":100,"height":50}"#).unwrap();

        let asset = loader.load_asset("logo").await.unwrap();
        assert_eq!(asset.dimensions, DimensionRecord::new(100.0, 50.0));
    }

    #[tokio::test]
    async fn test_abandoned_load_still_fills_store() {
        let (loader, transport, store) =
            loader(StubTransport::default().serve("http://icons.test/home.svg", 200, HOME));

        // Poll once so the fetch is registered, then drop the caller
        assert!(loader.load("home").now_or_never().is_none());
        assert!(loader.registry().contains("home_svg"));

        // A later caller joins the same request
        assert_eq!(loader.load("home").await.unwrap(), HOME);
        assert_eq!(store.get("home_svg").unwrap().as_deref(), Some(HOME));
        assert_eq!(transport.request_count("http://icons.test/home.svg"), 1);
        assert_eq!(loader.stats().registry_joins(), 1);
    }

    #[tokio::test]
    async fn test_shared_registry_dedups_across_loaders() {
        let (first, transport, store) =
            loader(StubTransport::default().serve("http://icons.test/home.svg", 200, HOME));
        let second = AssetLoader::with_transport(LoaderConfig::new(ORIGIN), store, transport.clone())
            .with_registry(first.registry().clone());

        let (a, b) = futures::join!(first.load("home"), second.load("home"));
        assert_eq!(a.unwrap(), HOME);
        assert_eq!(b.unwrap(), HOME);
        assert_eq!(transport.request_count("http://icons.test/home.svg"), 1);
    }

    pub(crate) struct BrokenStore;

    impl DurableStore for BrokenStore {
        fn get(&self, _key: &str) -> assetstore::Result<Option<String>> {
            Err(assetstore::Error::Closed)
        }

        fn set(&self, _key: &str, _value: &str) -> assetstore::Result<()> {
            Err(assetstore::Error::Closed)
        }
    }

    #[tokio::test]
    async fn test_store_failures_do_not_abort_loading() {
        let transport =
            Arc::new(StubTransport::default().serve("http://icons.test/home.svg", 200, HOME));
        let loader =
            AssetLoader::with_transport(LoaderConfig::new(ORIGIN), Arc::new(BrokenStore), transport);

        let asset = loader.load_asset("home").await.unwrap();
        assert_eq!(asset.artifact, HOME);
        assert_eq!(asset.dimensions, DimensionRecord::new(24.0, 24.0));
        assert!(loader.stats().store_errors() >= 2);
        assert_eq!(loader.cached("home"), None);
    }

    #[test]
    fn test_miss_outside_runtime_is_an_error() {
        let (loader, transport, store) =
            loader(StubTransport::default().serve("http://icons.test/home.svg", 200, HOME));
        store.set("logo_svg", HOME).unwrap();

        let result = futures::executor::block_on(loader.load("home"));
        assert!(matches!(result, Err(Error::NoRuntime { ref key }) if key == "home_svg"));
        assert!(!loader.registry().contains("home_svg"));
        assert_eq!(transport.request_count("http://icons.test/home.svg"), 0);

        // Store hits never need the runtime
        let cached = futures::executor::block_on(loader.load("logo")).unwrap();
        assert_eq!(cached, HOME);
    }

    struct PanickingTransport;

    #[async_trait]
    impl Transport for PanickingTransport {
        async fn get(&self, _uri: &str) -> std::result::Result<Response, TransportError> {
            panic!("transport blew up");
        }
    }

    #[tokio::test]
    async fn test_task_failure_is_surfaced() {
        let loader = AssetLoader::with_transport(
            LoaderConfig::new(ORIGIN),
            Arc::new(MemoryStore::new()),
            Arc::new(PanickingTransport),
        );

        let result = loader.load("home").await;
        assert!(matches!(result, Err(Error::Task { ref key, .. }) if key == "home_svg"));
    }

    #[tokio::test]
    async fn test_unparseable_cached_artifact_sizes_to_zero() {
        let (loader, _, store) = loader(StubTransport::default());
        store.set("odd_svg", "<svg viewBox=\"0 0 5 5\">").unwrap();

        let asset = loader.load_asset("odd").await.unwrap();
        assert_eq!(asset.dimensions, DimensionRecord::new(0.0, 0.0));
    }
}
