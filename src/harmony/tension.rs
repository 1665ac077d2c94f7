use std::collections::HashMap;

use super::chord::{Chord, Extension, Quality};

/// Tension values are clamped into [0, TENSION_MAX].
pub const TENSION_MAX: f32 = 10.0;

/// No component weight may fall below this floor.
pub const MIN_WEIGHT: f32 = 0.1;

/// Memo entries beyond this are discarded wholesale before inserting more.
const CACHE_CAPACITY: usize = 8192;

/// Position of each pitch class on the cycle of fifths, C at 0. The mapping
/// pc -> position is an involution, so the same table inverts itself.
const FIFTHS_POS: [u8; 12] = [0, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10, 5];

/// Minimal step count between two pitch classes around the cycle of fifths,
/// in either direction. Symmetric, zero for equal inputs, at most 6.
pub fn fifths_distance(a: u8, b: u8) -> u8 {
    let ia = FIFTHS_POS[(a % 12) as usize] as i32;
    let ib = FIFTHS_POS[(b % 12) as usize] as i32;
    let cw = (ib - ia).rem_euclid(12) as u8;
    cw.min(12 - cw)
}

/// Base dissonance per quality.
pub fn quality_weight(quality: Quality) -> f32 {
    match quality {
        Quality::Maj | Quality::Sus2 | Quality::Sus4 => 0.0,
        Quality::Min => 1.0,
        Quality::Dom7 => 2.0,
        Quality::Maj7 | Quality::Min7 => 2.5,
        Quality::Aug => 3.0,
        Quality::Dim => 4.0,
    }
}

/// Diatonic extensions add 0.5 each, altered extensions 1.0 each.
pub fn extension_complexity(extensions: &[Extension]) -> f32 {
    extensions
        .iter()
        .map(|e| if e.is_altered() { 1.0 } else { 0.5 })
        .sum()
}

/// Component weights for the tension sum, floor-clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensionWeights {
    quality: f32,
    extension: f32,
    distance: f32,
}

impl TensionWeights {
    pub fn new(quality: f32, extension: f32, distance: f32) -> Self {
        Self {
            quality: floor_weight(quality),
            extension: floor_weight(extension),
            distance: floor_weight(distance),
        }
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn extension(&self) -> f32 {
        self.extension
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }
}

impl Default for TensionWeights {
    fn default() -> Self {
        Self::new(1.5, 1.0, 1.2)
    }
}

fn floor_weight(w: f32) -> f32 {
    if w.is_finite() {
        w.max(MIN_WEIGHT)
    } else {
        MIN_WEIGHT
    }
}

/// Weighted dissonance score with an explicit memo table.
///
/// The cache is keyed by (previous root, chord) under the current weight set
/// and is discarded in full whenever the weights change, so a stale value is
/// never served.
#[derive(Debug)]
pub struct TensionEngine {
    weights: TensionWeights,
    cache: HashMap<(u8, Chord), f32>,
}

impl TensionEngine {
    pub fn new(weights: TensionWeights) -> Self {
        Self {
            weights,
            cache: HashMap::new(),
        }
    }

    pub fn weights(&self) -> TensionWeights {
        self.weights
    }

    pub fn set_weights(&mut self, weights: TensionWeights) {
        self.weights = weights;
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Tension of `chord` heard after a chord rooted at `prev_root`.
    pub fn tension(&mut self, prev_root: u8, chord: &Chord) -> f32 {
        let key = (prev_root % 12, chord.clone());
        if let Some(&t) = self.cache.get(&key) {
            return t;
        }
        let q = quality_weight(chord.quality);
        let e = extension_complexity(chord.extensions());
        let r = fifths_distance(prev_root, chord.root()) as f32;
        let t = (self.weights.quality * q + self.weights.extension * e + self.weights.distance * r)
            .clamp(0.0, TENSION_MAX);
        if self.cache.len() >= CACHE_CAPACITY {
            self.cache.clear();
        }
        self.cache.insert(key, t);
        t
    }

    #[cfg(test)]
    pub(crate) fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifths_distance_is_symmetric_and_bounded() {
        for a in 0..12u8 {
            assert_eq!(fifths_distance(a, a), 0);
            for b in 0..12u8 {
                assert_eq!(fifths_distance(a, b), fifths_distance(b, a));
                assert!(fifths_distance(a, b) <= 6);
            }
        }
    }

    #[test]
    fn fifths_distance_known_pairs() {
        // C-G is one fifth, C-D two, C-F# the tritone at the far side.
        assert_eq!(fifths_distance(0, 7), 1);
        assert_eq!(fifths_distance(0, 2), 2);
        assert_eq!(fifths_distance(0, 6), 6);
        assert_eq!(fifths_distance(0, 5), 1);
    }

    #[test]
    fn weights_floor_at_minimum() {
        let w = TensionWeights::new(-1.0, 0.0, f32::NAN);
        assert_eq!(w.quality(), MIN_WEIGHT);
        assert_eq!(w.extension(), MIN_WEIGHT);
        assert_eq!(w.distance(), MIN_WEIGHT);
    }

    #[test]
    fn tension_is_cached_until_weights_change() {
        let mut engine = TensionEngine::new(TensionWeights::default());
        let chord = Chord::new(7, Quality::Dom7);
        let t1 = engine.tension(0, &chord);
        assert_eq!(engine.cached_entries(), 1);
        assert_eq!(engine.tension(0, &chord), t1);
        assert_eq!(engine.cached_entries(), 1);

        engine.set_weights(TensionWeights::new(3.0, 1.0, 1.2));
        assert_eq!(engine.cached_entries(), 0);
        let t2 = engine.tension(0, &chord);
        assert!(t2 > t1);
    }

    #[test]
    fn tension_stays_in_range() {
        let mut engine = TensionEngine::new(TensionWeights::new(10.0, 10.0, 10.0));
        for root in 0..12u8 {
            for quality in Quality::ALL {
                let chord = Chord::new(root, quality)
                    .with_extensions(&[super::Extension::FlatNine, super::Extension::Thirteen]);
                let t = engine.tension(0, &chord);
                assert!((0.0..=TENSION_MAX).contains(&t), "{t} out of range");
            }
        }
    }
}
