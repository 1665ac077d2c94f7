use super::chord::Quality;
use super::tension::TensionWeights;

/// A named reharmonization configuration: a weight triple plus library
/// filters, applied as one atomic swap.
#[derive(Debug, Clone)]
pub struct Preset {
    pub weights: TensionWeights,
    /// Restrict qualities; `None` allows all.
    pub qualities: Option<Vec<Quality>>,
    pub allow_altered: bool,
    /// Keep the harmonizer's key restriction, if it has one.
    pub key_filter: bool,
}

pub const PRESET_NAMES: [&str; 3] = ["consonant", "jazzy", "chromatic"];

pub fn lookup(name: &str) -> Result<Preset, String> {
    match name {
        "consonant" => Ok(Preset {
            weights: TensionWeights::new(1.0, 0.5, 0.8),
            qualities: Some(vec![
                Quality::Maj,
                Quality::Min,
                Quality::Sus2,
                Quality::Sus4,
            ]),
            allow_altered: false,
            key_filter: true,
        }),
        "jazzy" => Ok(Preset {
            weights: TensionWeights::new(1.2, 2.0, 0.8),
            qualities: Some(vec![
                Quality::Maj7,
                Quality::Min7,
                Quality::Dom7,
                Quality::Min,
            ]),
            allow_altered: true,
            key_filter: true,
        }),
        "chromatic" => Ok(Preset {
            weights: TensionWeights::new(1.5, 1.0, 2.0),
            qualities: None,
            allow_altered: true,
            key_filter: false,
        }),
        other => Err(format!("unknown preset '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_listed_presets_resolve() {
        for name in PRESET_NAMES {
            assert!(lookup(name).is_ok(), "preset {name} should exist");
        }
    }

    #[test]
    fn unknown_preset_reports_name() {
        let err = lookup("ambient").unwrap_err();
        assert!(err.contains("ambient"));
    }
}
