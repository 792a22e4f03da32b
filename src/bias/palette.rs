//! Marker palette calibration.
//!
//! The hue targets are tuned to one chart layout. They live here, loaded from
//! configuration and injected into the extractor, so a recalibration never
//! touches the extraction logic.

use serde::{Deserialize, Serialize};

/// Order in which a pixel's channels are read before hue conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Channels read as stored.
    Rgb,
    /// Red and blue exchanged. The default hues were measured this way.
    #[default]
    Bgr,
}

/// Hue targets and thresholds for the three chart markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerPalette {
    /// Hue of the left (blue) marker, `0..=179`.
    pub blue_hue: u8,
    /// Hue of the right (red) marker, `0..=179`.
    pub red_hue: u8,
    /// Hue of the "you are here" (yellow) marker, `0..=179`.
    pub yellow_hue: u8,
    /// Half-width of each hue band.
    pub hue_tolerance: u8,
    /// Inclusive minimum saturation, `0..=255`.
    pub saturation_min: u8,
    /// Inclusive minimum value (brightness), `0..=255`.
    pub value_min: u8,
    pub channel_order: ChannelOrder,
}

impl Default for MarkerPalette {
    fn default() -> Self {
        Self {
            blue_hue: 179,
            red_hue: 122,
            yellow_hue: 92,
            hue_tolerance: 10,
            saturation_min: 120,
            value_min: 120,
            channel_order: ChannelOrder::Bgr,
        }
    }
}
