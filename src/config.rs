//! App configuration.
//!
//! Read once at startup from an inline JSON block:
//!
//! ```html
//! <script id="fortune-config" type="application/json">
//!   { "settle_delay_ms": 1000, "opening_indicator": true, "ad_block_id": "1234" }
//! </script>
//! ```
//!
//! Every field is optional; missing fields and unknown fields fall back to
//! the defaults below.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::time::TICKS_PER_SEC;

/// DOM id of the inline config block.
pub const CONFIG_ELEMENT_ID: &str = "fortune-config";

/// Image locations tried in order by the asset resolver.
const DEFAULT_IMAGE_CANDIDATES: &[&str] = &[
    "/Gemini_Generated_Image_p66mc0p66mc0p66m.gif",
    "/photo_2025-12-26_15-05-26.jpg",
    "/fortune-cookie.png",
    "/fortune-cookie.jpg",
    "/fortune-cookie.jpeg",
    "/fortune-cookie.webp",
    "/cookie.png",
    "/cookie.jpg",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub image_candidates: Vec<String>,
    /// Delay between the breaking tap and the reveal.
    pub settle_delay_ms: u32,
    /// Show a spinner with "Открываю судьбу..." while breaking.
    pub opening_indicator: bool,
    /// Ad block id. Ads are skipped when unset.
    pub ad_block_id: Option<String>,
    /// Link attached to shared stories. Defaults to the page URL.
    pub share_url: Option<String>,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub src: String,
    pub tap_volume: f64,
    pub crunch_volume: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_candidates: DEFAULT_IMAGE_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            settle_delay_ms: 500,
            opening_indicator: false,
            ad_block_id: None,
            share_url: None,
            audio: AudioConfig::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            src: "/crunch.mp3".into(),
            tap_volume: 0.2,
            crunch_volume: 0.6,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = serde_json::from_str(json)?;
        config.audio.tap_volume = config.audio.tap_volume.clamp(0.0, 1.0);
        config.audio.crunch_volume = config.audio.crunch_volume.clamp(0.0, 1.0);
        // An empty ad block id would make every show() call fail on the SDK side.
        if config.ad_block_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            config.ad_block_id = None;
        }
        Ok(config)
    }

    /// Parse the inline block if there is one; fall back to defaults on error.
    pub fn load_or_default(json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    /// Settle delay in clock ticks, rounded up.
    pub fn settle_ticks(&self) -> u32 {
        let ms_per_tick = 1000 / TICKS_PER_SEC;
        self.settle_delay_ms.div_ceil(ms_per_tick)
    }
}
