pub mod arp;
pub mod engine;
pub mod filter;
pub mod limiter;
pub mod pad;

pub use engine::SynthesisEngine;
pub use limiter::{Limiter, LimiterMeter, LimiterMode, SoftClipParams};

/// Layers below this volume are skipped entirely.
pub const AUDIBILITY_FLOOR: f32 = 1e-3;

/// Equal temperament, A4 = 440 Hz.
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::midi_to_freq;

    #[test]
    fn concert_pitch_reference() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_freq(81) - 880.0).abs() < 1e-2);
        assert!((midi_to_freq(60) - 261.63).abs() < 0.1);
    }
}
