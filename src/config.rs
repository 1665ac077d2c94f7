use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "AudioConfig::default_block_frames")]
    pub block_frames: usize,
    #[serde(default = "AudioConfig::default_latency_ms")]
    pub latency_ms: f32,
}

impl AudioConfig {
    fn default_sample_rate() -> u32 {
        44_100
    }
    fn default_block_frames() -> usize {
        512
    }
    fn default_latency_ms() -> f32 {
        50.0
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::default_sample_rate(),
            block_frames: Self::default_block_frames(),
            latency_ms: Self::default_latency_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Arp tempo in notes per second while the discrete state reads rest.
    #[serde(default = "SynthConfig::default_rest_arp_rate")]
    pub rest_arp_rate: f32,
    /// Arp tempo while the discrete state reads active imagery.
    #[serde(default = "SynthConfig::default_active_arp_rate")]
    pub active_arp_rate: f32,
    #[serde(default = "SynthConfig::default_master_gain")]
    pub master_gain: f32,
    /// Per-block exponential smoothing constant for volume/cutoff targets.
    #[serde(default = "SynthConfig::default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "SynthConfig::default_initial_pad_volume")]
    pub initial_pad_volume: f32,
    #[serde(default = "SynthConfig::default_initial_cutoff_hz")]
    pub initial_cutoff_hz: f32,
}

impl SynthConfig {
    fn default_rest_arp_rate() -> f32 {
        2.0
    }
    fn default_active_arp_rate() -> f32 {
        6.0
    }
    fn default_master_gain() -> f32 {
        0.7
    }
    fn default_smoothing() -> f32 {
        0.99
    }
    fn default_initial_pad_volume() -> f32 {
        0.8
    }
    fn default_initial_cutoff_hz() -> f32 {
        8000.0
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            rest_arp_rate: Self::default_rest_arp_rate(),
            active_arp_rate: Self::default_active_arp_rate(),
            master_gain: Self::default_master_gain(),
            smoothing: Self::default_smoothing(),
            initial_pad_volume: Self::default_initial_pad_volume(),
            initial_cutoff_hz: Self::default_initial_cutoff_hz(),
        }
    }
}

/// The canonical probability-to-parameter mapping:
/// pad = pad_level * (1 - p), arp = arp_level * p,
/// cutoff = cutoff_min_hz + p * (cutoff_max_hz - cutoff_min_hz).
/// The discrete state never bends this curve; it only switches arp tempo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlCurve {
    #[serde(default = "ControlCurve::default_pad_level")]
    pub pad_level: f32,
    #[serde(default = "ControlCurve::default_arp_level")]
    pub arp_level: f32,
    #[serde(default = "ControlCurve::default_cutoff_min_hz")]
    pub cutoff_min_hz: f32,
    #[serde(default = "ControlCurve::default_cutoff_max_hz")]
    pub cutoff_max_hz: f32,
}

impl ControlCurve {
    fn default_pad_level() -> f32 {
        0.8
    }
    fn default_arp_level() -> f32 {
        0.6
    }
    fn default_cutoff_min_hz() -> f32 {
        2000.0
    }
    fn default_cutoff_max_hz() -> f32 {
        8000.0
    }
}

impl Default for ControlCurve {
    fn default() -> Self {
        Self {
            pad_level: Self::default_pad_level(),
            arp_level: Self::default_arp_level(),
            cutoff_min_hz: Self::default_cutoff_min_hz(),
            cutoff_max_hz: Self::default_cutoff_max_hz(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmonyConfig {
    /// Key restriction for the chord library, as a note name.
    #[serde(
        default = "HarmonyConfig::default_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<String>,
    /// Preset applied at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default)]
    pub adaptive: bool,
    #[serde(default = "HarmonyConfig::default_top_k")]
    pub top_k: usize,
    #[serde(default = "HarmonyConfig::default_octave")]
    pub octave: u8,
    #[serde(default = "HarmonyConfig::default_learning_rate")]
    pub learning_rate: f32,
    #[serde(default = "HarmonyConfig::default_history_len")]
    pub history_len: usize,
}

impl HarmonyConfig {
    fn default_key() -> Option<String> {
        Some("C".to_string())
    }
    fn default_top_k() -> usize {
        4
    }
    fn default_octave() -> u8 {
        4
    }
    fn default_learning_rate() -> f32 {
        0.05
    }
    fn default_history_len() -> usize {
        32
    }
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            key: Self::default_key(),
            preset: None,
            adaptive: false,
            top_k: Self::default_top_k(),
            octave: Self::default_octave(),
            learning_rate: Self::default_learning_rate(),
            history_len: Self::default_history_len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default = "ControlConfig::default_bpm")]
    pub bpm: f32,
    #[serde(default = "ControlConfig::default_beats_per_chord")]
    pub beats_per_chord: f32,
    /// Arp note spacing in beats.
    #[serde(default = "ControlConfig::default_arp_interval_beats")]
    pub arp_interval_beats: f32,
    #[serde(default = "ControlConfig::default_arp_mode")]
    pub arp_mode: String,
    #[serde(default = "ControlConfig::default_arp_velocity")]
    pub arp_velocity: u8,
    #[serde(default = "ControlConfig::default_arp_gate")]
    pub arp_gate: f32,
}

impl ControlConfig {
    fn default_bpm() -> f32 {
        100.0
    }
    fn default_beats_per_chord() -> f32 {
        2.0
    }
    fn default_arp_interval_beats() -> f32 {
        0.5
    }
    fn default_arp_mode() -> String {
        "off".to_string()
    }
    fn default_arp_velocity() -> u8 {
        90
    }
    fn default_arp_gate() -> f32 {
        0.9
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bpm: Self::default_bpm(),
            beats_per_chord: Self::default_beats_per_chord(),
            arp_interval_beats: Self::default_arp_interval_beats(),
            arp_mode: Self::default_arp_mode(),
            arp_velocity: Self::default_arp_velocity(),
            arp_gate: Self::default_arp_gate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub synth: SynthConfig,
    #[serde(default)]
    pub curve: ControlCurve,
    #[serde(default)]
    pub harmony: HarmonyConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

impl AppConfig {
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        eprintln!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    eprintln!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write commented defaults and return them.
        let default_cfg = Self::default();
        if let Ok(text) = toml::to_string_pretty(&default_cfg) {
            let mut commented = String::new();
            for line in text.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    commented.push('\n');
                } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                    commented.push_str(line);
                    commented.push('\n');
                } else {
                    commented.push_str("# ");
                    commented.push_str(line);
                    commented.push('\n');
                }
            }
            if let Err(err) = fs::write(path_obj, commented) {
                eprintln!("Failed to write default config to {path}: {err}");
            }
        } else {
            eprintln!("Failed to serialize default config; continuing with defaults");
        }
        default_cfg
    }
}
