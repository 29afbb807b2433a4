//! Game settings and letter content
//!
//! Read once at startup from a JSON blob the page embeds in
//! `<script type="application/json" id="game-config">`. Nothing is written
//! back; every missing field falls back to its default.

use serde::{Deserialize, Serialize};

use crate::sim::{RevealMode, RevealTiming};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles per effect layer for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 400,
            QualityPreset::High => 1200,
        }
    }

    /// Heart polygon segments used by the renderer
    pub fn heart_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 24,
            QualityPreset::High => 40,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Game ===
    /// Hearts to collect before the letter opens
    pub target: u32,
    /// Pause after a collection before the next heart appears
    pub respawn_delay_ms: f32,
    /// Pause on the "won" state before the letter opens
    pub won_delay_ms: f32,

    // === Letter ===
    pub reveal_mode: RevealMode,
    /// Base delay between typed characters
    pub char_delay_ms: f32,
    /// Random extra delay per character
    pub char_jitter_ms: f32,
    /// Pause after each chunk
    pub chunk_pause_ms: f32,
    /// Continuous mode: pause after the last chunk before the finale
    pub finale_delay_ms: f32,
    /// Letter content, one chunk per entry
    pub chunks: Vec<String>,
    /// Words that orbit during the finale
    pub orbit_message: String,

    // === Visual Effects ===
    /// Continuous confetti trickle
    pub ambient_confetti: bool,
    /// Confetti pieces per tick while the trickle runs
    pub confetti_rate: f32,
    /// Particle effects (bursts, confetti, finale)
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (no ambient confetti, smaller finale)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            target: 10,
            respawn_delay_ms: 350.0,
            won_delay_ms: 900.0,

            reveal_mode: RevealMode::Step,
            char_delay_ms: 45.0,
            char_jitter_ms: 40.0,
            chunk_pause_ms: 700.0,
            finale_delay_ms: 1500.0,
            chunks: vec![
                "Dear Mom,".to_string(),
                "Thank you for every early morning and every late night.".to_string(),
                "You taught me to be brave, to be kind, and to laugh at myself.".to_string(),
                "Con chúc mẹ luôn mạnh khỏe, luôn mỉm cười và hạnh phúc mãi bên con ❤️".to_string(),
            ],
            orbit_message: "Con chúc mẹ luôn mạnh khỏe, luôn mỉm cười và hạnh phúc mãi bên con ❤️"
                .to_string(),

            ambient_confetti: true,
            confetti_rate: 0.12,
            particles: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset thins the trickle for performance
        if preset == QualityPreset::Low {
            self.confetti_rate = self.confetti_rate.min(0.05);
        }
    }

    /// Parse settings JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.target = settings.target.max(1);
        Ok(settings)
    }

    /// Effective confetti trickle (respects reduced_motion)
    pub fn effective_ambient_confetti(&self) -> bool {
        self.ambient_confetti && self.particles && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Finale batch sizes: (small hearts, glowing hearts)
    pub fn finale_counts(&self) -> (usize, usize) {
        if self.reduced_motion { (40, 8) } else { (110, 24) }
    }

    /// Typing cadence in ticks
    pub fn reveal_timing(&self) -> RevealTiming {
        RevealTiming::from_millis(self.char_delay_ms, self.char_jitter_ms, self.chunk_pause_ms)
    }

    /// Element id of the embedded JSON config
    const CONFIG_ELEMENT_ID: &'static str = "game-config";

    /// Apply a `quality=` override from a URL query string (`?a=1&quality=low`)
    pub fn apply_query(&mut self, query: &str) {
        let value = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find_map(|(key, value)| (key == "quality").then_some(value));
        let Some(value) = value else {
            return;
        };

        match QualityPreset::from_str(value) {
            Some(preset) => {
                self.apply_preset(preset);
                log::info!("Quality override: {}", preset.as_str());
            }
            None => log::warn!("Ignoring unknown quality '{}'", value),
        }
    }

    /// Load settings from the page's config element, then the URL's
    /// `?quality=` override (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = web_sys::window();
        let json = window
            .as_ref()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        let mut settings = match json.map(|json| Self::from_json(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded game config ({} letter chunks)", settings.chunks.len());
                settings
            }
            Some(Err(e)) => {
                log::warn!("Invalid game config, using defaults: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        };

        if let Some(query) = window.and_then(|w| w.location().search().ok()) {
            settings.apply_query(&query);
        }
        settings
    }

    /// Native: defaults, with `HEART_CATCH_QUALITY` standing in for the URL override
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No #{} element on native, using defaults", Self::CONFIG_ELEMENT_ID);
        let mut settings = Self::default();
        if let Ok(quality) = std::env::var("HEART_CATCH_QUALITY") {
            settings.apply_query(&format!("quality={quality}"));
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"target": 3, "reveal_mode": "continuous"}"#).unwrap();
        assert_eq!(settings.target, 3);
        assert_eq!(settings.reveal_mode, RevealMode::Continuous);
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert_eq!(settings.chunks.len(), Settings::default().chunks.len());
    }

    #[test]
    fn test_zero_target_is_raised() {
        let settings = Settings::from_json(r#"{"target": 0}"#).unwrap();
        assert_eq!(settings.target, 1);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Settings::from_json("{ target: }").is_err());
        assert!(Settings::from_json(r#"{"quality": "ultra"}"#).is_err());
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("nope"), None);
        let settings = Settings::from_json(r#"{"quality": "high"}"#).unwrap();
        assert_eq!(settings.max_particles(), 1200);
    }

    #[test]
    fn test_effect_toggles() {
        let mut settings = Settings::default();
        assert!(settings.effective_ambient_confetti());
        settings.reduced_motion = true;
        assert!(!settings.effective_ambient_confetti());
        assert!(settings.finale_counts().0 < Settings::default().finale_counts().0);

        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_low_preset_thins_confetti() {
        let mut settings = Settings::default();
        settings.apply_preset(QualityPreset::Low);
        assert!(settings.confetti_rate <= 0.05);
        assert_eq!(settings.quality.as_str(), "Low");
    }

    #[test]
    fn test_query_quality_override() {
        let mut settings = Settings::default();
        settings.apply_query("?seed=4&quality=High");
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.max_particles(), 1200);

        settings.apply_query("?quality=ultra");
        assert_eq!(settings.quality, QualityPreset::High);

        settings.apply_query("quality=low");
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(settings.confetti_rate <= 0.05);
    }

    #[test]
    fn test_query_without_quality_changes_nothing() {
        let mut settings = Settings::default();
        settings.apply_query("?lang=en&qualityx=low");
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert_eq!(settings.confetti_rate, Settings::default().confetti_rate);
    }
}
