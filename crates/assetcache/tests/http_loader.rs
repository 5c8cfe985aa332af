//! End-to-end loads against a local HTTP server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assetcache::{AssetBinding, AssetLoader, DimensionRecord, LoaderConfig, FALLBACK_SVG};
use assetstore::{AssetStore, DurableStore};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const HOME: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M3 12l9-9 9 9"/></svg>"#;

struct IconServer {
    origin: String,
    hits: Arc<AtomicUsize>,
}

async fn serve() -> IconServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                let _ = handle(stream, counter).await;
            });
        }
    });

    IconServer {
        origin: format!("http://{}/icons/", addr),
        hits,
    }
}

async fn handle(mut stream: TcpStream, hits: Arc<AtomicUsize>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let request = String::from_utf8_lossy(&buf).into_owned();
    let path = request.split_whitespace().nth(1).unwrap_or("/");

    // Hold the response so concurrent loads overlap
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, body) = match path {
        "/icons/home.svg" => ("200 OK", format!("<?xml version=\"1.0\"?>\n{}\n", HOME)),
        _ => ("404 Not Found", "Not Found".to_string()),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: image/svg+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn open_loader(origin: &str, dir: &TempDir) -> (AssetLoader, Arc<AssetStore>) {
    let store = Arc::new(AssetStore::open(dir.path()).unwrap());
    let loader = AssetLoader::new(LoaderConfig::new(origin), store.clone()).unwrap();
    (loader, store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_loads_hit_server_once() {
    let server = serve().await;
    let dir = TempDir::new().unwrap();
    let (loader, store) = open_loader(&server.origin, &dir);

    let loads = (0..10).map(|_| loader.load("home"));
    let results = futures::future::join_all(loads).await;

    for result in results {
        assert_eq!(result.unwrap(), HOME);
    }
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
    assert_eq!(store.get("home_svg").unwrap().as_deref(), Some(HOME));
}

#[tokio::test]
async fn not_found_persists_fallback_across_reopen() {
    let server = serve().await;
    let dir = TempDir::new().unwrap();

    {
        let (loader, _) = open_loader(&server.origin, &dir);
        let asset = loader.load_asset("missing").await.unwrap();
        assert_eq!(asset.artifact, FALLBACK_SVG);
        assert_eq!(asset.dimensions, DimensionRecord::new(0.0, 0.0));
    }

    let store = AssetStore::open(dir.path()).unwrap();
    assert_eq!(store.get("missing_svg").unwrap().as_deref(), Some(FALLBACK_SVG));
    assert_eq!(
        store.get("missing_dimensions").unwrap().as_deref(),
        Some(r#"{"width":0,"height":0}"#)
    );
}

#[tokio::test]
async fn next_session_renders_from_store_offline() {
    let server = serve().await;
    let dir = TempDir::new().unwrap();

    {
        let (loader, _) = open_loader(&server.origin, &dir);
        loader.load_asset("home").await.unwrap();
    }
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);

    // Nothing listens on port 9; any request would fall back
    let (loader, _) = open_loader("http://127.0.0.1:9/icons/", &dir);
    let mut icon: AssetBinding = AssetBinding::default().with_source("home").with_scale(2.0);
    assert!(icon.load(&loader).await.unwrap());

    assert_eq!(icon.cached_artifact(), Some(HOME));
    let state = icon.render_state().unwrap();
    assert_eq!(state.scaled_width, 48.0);
    assert_eq!(state.scaled_height, 48.0);
    assert_eq!(state.aspect_ratio_percent, 100.0);
    assert_eq!(loader.stats().fetches(), 0);
}

#[tokio::test]
async fn unreachable_origin_falls_back() {
    let dir = TempDir::new().unwrap();
    let (loader, store) = open_loader("http://127.0.0.1:9/icons/", &dir);

    assert_eq!(loader.load("home").await.unwrap(), FALLBACK_SVG);
    assert_eq!(loader.stats().fallbacks(), 1);
    assert_eq!(store.get("home_svg").unwrap().as_deref(), Some(FALLBACK_SVG));
}
