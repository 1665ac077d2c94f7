use rand::rngs::SmallRng;
use rand::Rng;

use super::chord::{voice_leading_cost, Chord};
use super::library::{ChordLibrary, LibraryFilter};
use super::presets;
use super::tension::{TensionEngine, TensionWeights, TENSION_MAX};

pub const DEFAULT_TOP_K: usize = 4;

/// Selects the next chord from a candidate library by matching a target
/// tension, tie-breaking on voice-leading cost, then drawing among the best
/// few candidates with a low-delta bias so the choice stays varied.
pub struct Harmonizer {
    library: ChordLibrary,
    engine: TensionEngine,
    key_root: Option<u8>,
    top_k: usize,
    octave: u8,
    rng: SmallRng,
}

impl Harmonizer {
    pub fn new(key_root: Option<u8>, weights: TensionWeights, octave: u8, rng: SmallRng) -> Self {
        let library = ChordLibrary::build(&LibraryFilter {
            key_root,
            qualities: None,
            allow_altered: true,
        });
        Self {
            library,
            engine: TensionEngine::new(weights),
            key_root,
            top_k: DEFAULT_TOP_K,
            octave,
            rng,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn library(&self) -> &ChordLibrary {
        &self.library
    }

    pub fn engine_mut(&mut self) -> &mut TensionEngine {
        &mut self.engine
    }

    pub fn weights(&self) -> TensionWeights {
        self.engine.weights()
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// Tension of `chord` after `prev_root` under the current weights.
    pub fn tension(&mut self, prev_root: u8, chord: &Chord) -> f32 {
        self.engine.tension(prev_root, chord)
    }

    /// Pick the next chord for the given imagery probability.
    ///
    /// Target tension is `probability * 10`. Candidates are ranked by
    /// |tension - target| with voice-leading cost as the tie-break, and one
    /// of the best `top_k` is drawn with weight 1/(1+delta).
    pub fn next(&mut self, prev: &Chord, probability: f32) -> Chord {
        let prob = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let target = prob * TENSION_MAX;

        let mut scored: Vec<(f32, f32, usize)> = Vec::with_capacity(self.library.len());
        for (index, candidate) in self.library.iter().enumerate() {
            let tension = self.engine.tension(prev.root(), candidate);
            let delta = (tension - target).abs();
            let movement = voice_leading_cost(prev, candidate, self.octave);
            scored.push((delta, movement, index));
        }
        if scored.is_empty() {
            return prev.clone();
        }
        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });
        scored.truncate(self.top_k);

        let total: f32 = scored.iter().map(|(delta, _, _)| 1.0 / (1.0 + delta)).sum();
        let mut roll = self.rng.random_range(0.0..total.max(f32::MIN_POSITIVE));
        let mut chosen = scored[scored.len() - 1].2;
        for &(delta, _, index) in &scored {
            let weight = 1.0 / (1.0 + delta);
            if roll < weight {
                chosen = index;
                break;
            }
            roll -= weight;
        }
        self.library
            .get(chosen)
            .cloned()
            .unwrap_or_else(|| prev.clone())
    }

    /// Atomically swap the weight triple and the candidate library.
    ///
    /// On an unknown name the previous configuration stays intact and
    /// running; nothing is half-applied.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), String> {
        let preset = presets::lookup(name)?;
        let key_root = if preset.key_filter { self.key_root } else { None };
        self.library = ChordLibrary::build(&LibraryFilter {
            key_root,
            qualities: preset.qualities,
            allow_altered: preset.allow_altered,
        });
        // set_weights also discards every cached tension.
        self.engine.set_weights(preset.weights);
        Ok(())
    }
}
