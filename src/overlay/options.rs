//! Per-overlay configuration.
//!
//! Options can be built in code or loaded from JSON; missing fields take
//! their defaults.

use crate::geo::{Projection, TILE_SIZE};
use serde::{Deserialize, Serialize};

/// Rendering options owned by a single overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Edge length of a zoom-0 tile in pixels.
    pub tile_size: f64,
    /// Projection used to place the viewport's north-west corner.
    pub projection: Projection,
    /// Enable `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` blending every frame.
    pub blend: bool,
    /// RGBA color the surface is cleared to before drawing.
    pub clear_color: [f32; 4],
    /// Check and log `glGetError` after every GL call.
    pub check_gl_errors: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            projection: Projection::Geographic,
            blend: true,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            check_gl_errors: false,
        }
    }
}

impl OverlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
