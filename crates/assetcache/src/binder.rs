//! Presentation binder: dimension records and scale into render state
//! and style variables.

use std::collections::BTreeMap;

use crate::dimensions::DimensionRecord;

/// Style variable carrying the scaled width, in px
pub const WIDTH_VAR: &str = "--icon-width";
/// Style variable carrying the scaled height, in px
pub const HEIGHT_VAR: &str = "--icon-height";
/// Style variable carrying height as a percentage of width
pub const ASPECT_RATIO_VAR: &str = "--icon-aspect-ratio";
/// Style variable carrying the theme colour
pub const COLOR_VAR: &str = "--icon-color";

/// Receives style variables; the binder never interprets them further
pub trait StyleSink {
    /// Set one custom property
    fn set_property(&mut self, name: &str, value: &str);
}

/// Style variables collected into an ordered map
pub type StyleMap = BTreeMap<String, String>;

impl StyleSink for StyleMap {
    fn set_property(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

/// Derived visual attributes of one bound asset
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// `width * scale`
    pub scaled_width: f64,
    /// `height * scale`
    pub scaled_height: f64,
    /// `"0 0 {scaled_width} {scaled_height}"`
    pub viewbox: String,
    /// `scaled_height / scaled_width * 100`, or 0 for a zero-width asset
    pub aspect_ratio_percent: f64,
}

impl RenderState {
    /// Scale a dimension record
    pub fn compute(dimensions: &DimensionRecord, scale: f64) -> Self {
        let scaled_width = dimensions.width * scale;
        let scaled_height = dimensions.height * scale;

        let aspect_ratio_percent = if scaled_width == 0.0 {
            0.0
        } else {
            (scaled_height / scaled_width) * 100.0
        };

        Self {
            scaled_width,
            scaled_height,
            viewbox: format!(
                "0 0 {} {}",
                format_number(scaled_width),
                format_number(scaled_height)
            ),
            aspect_ratio_percent,
        }
    }

    /// Push width, height and aspect ratio variables into `sink`
    pub fn apply(&self, sink: &mut dyn StyleSink) {
        sink.set_property(WIDTH_VAR, &format!("{}px", format_number(self.scaled_width)));
        sink.set_property(HEIGHT_VAR, &format!("{}px", format_number(self.scaled_height)));
        sink.set_property(
            ASPECT_RATIO_VAR,
            &format!("{}%", format_number(self.aspect_ratio_percent)),
        );
    }
}

/// Push the theme colour into `sink`
pub fn apply_color(color: &str, sink: &mut dyn StyleSink) {
    sink.set_property(COLOR_VAR, color);
}

/// Format a number the way it appears in markup: `48`, not `48.0`.
///
/// Magnitudes from `1e21` up and below `1e-6` use exponent notation with a
/// signed exponent (`1e+21`, `1.5e-7`), as style values are read back.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Also folds -0 into 0
        "0".to_string()
    } else if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value.abs() >= 1e21 || value.abs() < 1e-6 {
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
