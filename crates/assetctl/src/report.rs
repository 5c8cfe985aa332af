//! Plain-text reports for the CLI

use std::fmt::Write;

use anyhow::Result;
use assetcache::{artifact_key, dimensions_key, format_number, AssetBinding};
use assetstore::DurableStore;

/// Describe a bound icon: its render state and style variables
pub fn render(icon: &AssetBinding) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", icon.source());

    match icon.render_state() {
        Some(state) => {
            let _ = writeln!(out, "  viewbox:      {}", state.viewbox);
            let _ = writeln!(
                out,
                "  size:         {} x {} px",
                format_number(state.scaled_width),
                format_number(state.scaled_height)
            );
            let _ = writeln!(
                out,
                "  aspect ratio: {}%",
                format_number(state.aspect_ratio_percent)
            );
        }
        None => {
            let _ = writeln!(out, "  (not bound)");
        }
    }

    for (name, value) in icon.style() {
        let _ = writeln!(out, "  {}: {}", name, value);
    }

    out.trim_end().to_string()
}

/// Describe what the store holds for `name`
pub fn show(name: &str, store: &dyn DurableStore) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "{}", name);

    match store.get(&dimensions_key(name))? {
        Some(dimensions) => {
            let _ = writeln!(out, "  dimensions: {}", dimensions);
        }
        None => {
            let _ = writeln!(out, "  dimensions: (not cached)");
        }
    }

    match store.get(&artifact_key(name))? {
        Some(svg) => {
            let _ = writeln!(out, "  svg: {}", svg);
        }
        None => {
            let _ = writeln!(out, "  svg: (not cached)");
        }
    }

    Ok(out.trim_end().to_string())
}
