//! SVG markup helpers

use roxmltree::{Document, ParsingOptions};

/// Artifact served whenever a fetch fails: an empty, zero-sized icon
pub const FALLBACK_SVG: &str = r#"<svg viewBox="0 0 0 0"><g></g></svg>"#;

fn parse_document(markup: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(markup, options)
}

/// Return the exact source text of the first `<svg>` element in `body`.
///
/// Returns `None` when the body is not well-formed XML or holds no `<svg>`.
pub fn extract_svg(body: &str) -> Option<&str> {
    let doc = parse_document(body).ok()?;
    let node = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "svg")?;
    body.get(node.range())
}

/// The `viewBox` rectangle of an SVG element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Minimum x coordinate
    pub min_x: f64,
    /// Minimum y coordinate
    pub min_y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl ViewBox {
    /// Parse a `viewBox` attribute value.
    ///
    /// Four numbers separated by whitespace and/or commas. Negative sizes
    /// are invalid.
    pub fn parse(value: &str) -> Option<Self> {
        let mut it = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty());
        let min_x = it.next()?.parse::<f64>().ok()?;
        let min_y = it.next()?.parse::<f64>().ok()?;
        let width = it.next()?.parse::<f64>().ok()?;
        let height = it.next()?.parse::<f64>().ok()?;
        if it.next().is_some() {
            return None;
        }
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return None;
        }
        Some(Self { min_x, min_y, width, height })
    }
}

/// The parsed root element of an artifact, reduced to what sizing needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgRoot {
    view_box: Option<ViewBox>,
}

impl SvgRoot {
    /// Parse artifact markup and read its root element
    pub fn parse(markup: &str) -> Result<Self, roxmltree::Error> {
        let doc = parse_document(markup)?;
        let view_box = doc.root_element().attribute("viewBox").and_then(ViewBox::parse);
        Ok(Self { view_box })
    }

    /// A root without a usable viewBox
    pub fn empty() -> Self {
        Self::default()
    }

    /// The root's viewBox, if present and well-formed
    pub fn view_box(&self) -> Option<ViewBox> {
        self.view_box
    }
}
