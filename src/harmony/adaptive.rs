use super::tension::{TensionEngine, TensionWeights};

pub const DEFAULT_LEARNING_RATE: f32 = 0.05;
pub const DEFAULT_HISTORY_LEN: usize = 32;

/// Slow proportional controller that steers the tension weights toward
/// better tracking of the requested tension curve.
///
/// Errors are collected into a bounded history; only when the history is
/// full is one averaged update applied and the history cleared, so the
/// weights move on the long-run average rather than reacting per selection.
/// Composes with any selector that can report target and achieved tension.
#[derive(Debug)]
pub struct AdaptiveControl {
    learning_rate: f32,
    history: Vec<f32>,
    capacity: usize,
}

impl AdaptiveControl {
    pub fn new(learning_rate: f32, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            learning_rate,
            history: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn pending_errors(&self) -> usize {
        self.history.len()
    }

    /// Record one target/achieved pair; applies a weight update (and thereby
    /// a cache invalidation) once the history window fills.
    pub fn observe(&mut self, target: f32, achieved: f32, engine: &mut TensionEngine) {
        let error = target - achieved;
        if !error.is_finite() {
            return;
        }
        self.history.push(error);
        if self.history.len() < self.capacity {
            return;
        }

        let mean = self.history.iter().sum::<f32>() / self.history.len() as f32;
        let delta = self.learning_rate * mean;
        let w = engine.weights();
        engine.set_weights(TensionWeights::new(
            w.quality() + 0.2 * delta,
            w.extension() + 0.5 * delta,
            w.distance() + 0.3 * delta,
        ));
        self.history.clear();
    }
}

impl Default for AdaptiveControl {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE, DEFAULT_HISTORY_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmony::chord::{Chord, Quality};

    #[test]
    fn no_update_until_window_is_full() {
        let mut engine = TensionEngine::new(TensionWeights::default());
        let mut control = AdaptiveControl::new(0.05, 4);
        let before = engine.weights();
        for _ in 0..3 {
            control.observe(10.0, 2.0, &mut engine);
        }
        assert_eq!(engine.weights(), before);
        control.observe(10.0, 2.0, &mut engine);
        assert_ne!(engine.weights(), before);
        assert_eq!(control.pending_errors(), 0);
    }

    #[test]
    fn undershoot_raises_achieved_tension() {
        let mut engine = TensionEngine::new(TensionWeights::default());
        let mut control = AdaptiveControl::new(0.5, 8);
        let chord = Chord::new(7, Quality::Dom7);
        let before = engine.tension(0, &chord);
        for _ in 0..8 {
            control.observe(10.0, before, &mut engine);
        }
        let after = engine.tension(0, &chord);
        assert!(
            after > before,
            "achieved tension should rise after undershoot ({before} -> {after})"
        );
    }

    #[test]
    fn weights_never_drop_below_floor() {
        let mut engine = TensionEngine::new(TensionWeights::new(0.2, 0.2, 0.2));
        let mut control = AdaptiveControl::new(1.0, 2);
        for _ in 0..20 {
            control.observe(0.0, 10.0, &mut engine);
        }
        let w = engine.weights();
        assert!(w.quality() >= 0.1);
        assert!(w.extension() >= 0.1);
        assert!(w.distance() >= 0.1);
    }
}
