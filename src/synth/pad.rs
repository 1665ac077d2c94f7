use std::f32::consts::TAU;

use super::{midi_to_freq, AUDIBILITY_FLOOR};

/// At most this many chord tones sound in the pad at once.
pub const PAD_VOICES: usize = 3;

/// Fixed stereo positions per voice: center, left, right.
const PAN_POSITIONS: [f32; PAD_VOICES] = [0.5, 0.2, 0.8];

const FUNDAMENTAL_GAIN: f32 = 0.2;
const OCTAVE_GAIN: f32 = 0.05;

/// Sustained ambient layer: one sine plus a quiet octave partial per chord
/// tone, each voice at a fixed pan. Phase accumulators persist across blocks
/// so an unchanged frequency is continuous at every block boundary.
#[derive(Debug)]
pub struct PadLayer {
    phases: [f32; PAD_VOICES],
}

impl PadLayer {
    pub fn new() -> Self {
        Self {
            phases: [0.0; PAD_VOICES],
        }
    }

    /// Mix the pad into an interleaved stereo buffer.
    pub fn render(&mut self, out: &mut [f32], pitches: &[u8], volume: f32, sample_rate: f32) {
        if volume < AUDIBILITY_FLOOR || !(sample_rate > 0.0) {
            return;
        }
        let frames = out.len() / 2;
        for (voice, &note) in pitches.iter().take(PAD_VOICES).enumerate() {
            let freq = midi_to_freq(note);
            let inc = TAU * freq / sample_rate;
            let pan = PAN_POSITIONS[voice];
            let left_gain = (1.0 - pan).sqrt() * volume;
            let right_gain = pan.sqrt() * volume;

            let mut phase = self.phases[voice];
            for frame in 0..frames {
                let sample =
                    phase.sin() * FUNDAMENTAL_GAIN + (phase * 2.0).sin() * OCTAVE_GAIN;
                out[2 * frame] += sample * left_gain;
                out[2 * frame + 1] += sample * right_gain;
                phase += inc;
            }
            self.phases[voice] = (self.phases[voice] + frames as f32 * inc) % TAU;
        }
    }

    pub fn reset(&mut self) {
        self.phases = [0.0; PAD_VOICES];
    }
}

impl Default for PadLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    #[test]
    fn below_floor_renders_nothing() {
        let mut pad = PadLayer::new();
        let mut buf = vec![0.0f32; 128];
        pad.render(&mut buf, &[60, 64, 67], 0.0, SR);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn split_render_matches_whole_render() {
        let pitches = [60u8, 64, 67];
        let mut whole = PadLayer::new();
        let mut buf_whole = vec![0.0f32; 256];
        whole.render(&mut buf_whole, &pitches, 0.5, SR);

        let mut split = PadLayer::new();
        let mut buf_split = vec![0.0f32; 256];
        let (first, second) = buf_split.split_at_mut(128);
        split.render(first, &pitches, 0.5, SR);
        split.render(second, &pitches, 0.5, SR);

        for (a, b) in buf_whole.iter().zip(buf_split.iter()) {
            assert!((a - b).abs() < 1e-4, "discontinuity: {a} vs {b}");
        }
    }

    #[test]
    fn only_three_voices_sound() {
        let mut pad = PadLayer::new();
        let mut three = vec![0.0f32; 128];
        pad.render(&mut three, &[60, 64, 67], 0.5, SR);
        let mut pad4 = PadLayer::new();
        let mut four = vec![0.0f32; 128];
        pad4.render(&mut four, &[60, 64, 67, 71], 0.5, SR);
        for (a, b) in three.iter().zip(four.iter()) {
            assert_eq!(a, b);
        }
    }
}
