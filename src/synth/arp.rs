use std::f32::consts::TAU;

use super::{midi_to_freq, AUDIBILITY_FLOOR};

/// First fraction of a note slot spent in the linear attack.
const ATTACK_FRACTION: f32 = 0.1;
/// Last fraction of a note slot spent in the linear release.
const RELEASE_START: f32 = 0.8;

const FUNDAMENTAL_GAIN: f32 = 0.3;
const OCTAVE_GAIN: f32 = 0.1;
const LEFT_SPREAD: f32 = 0.8;
const RIGHT_SPREAD: f32 = 0.6;

/// Rhythmic melodic layer: cycles the chord's pitches an octave up at a
/// configurable notes-per-second rate. A note boundary can fall inside a
/// block, so rendering walks sub-segments between boundaries; each note gets
/// a short linear attack and release so consecutive notes never blend into
/// one continuous tone.
#[derive(Debug)]
pub struct ArpLayer {
    phase: f32,
    /// Samples elapsed within the current note slot.
    timer: usize,
    index: usize,
}

impl ArpLayer {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            timer: 0,
            index: 0,
        }
    }

    /// Mix the arpeggio into an interleaved stereo buffer.
    pub fn render(
        &mut self,
        out: &mut [f32],
        pitches: &[u8],
        volume: f32,
        rate_notes_per_sec: f32,
        sample_rate: f32,
    ) {
        if volume < AUDIBILITY_FLOOR || pitches.is_empty() || !(sample_rate > 0.0) {
            return;
        }
        let rate = if rate_notes_per_sec.is_finite() && rate_notes_per_sec > 0.0 {
            rate_notes_per_sec
        } else {
            return;
        };
        let samples_per_note = ((sample_rate / rate) as usize).max(1);
        let frames = out.len() / 2;

        let mut frame = 0;
        while frame < frames {
            if self.timer >= samples_per_note {
                self.index = (self.index + 1) % pitches.len();
                self.timer = 0;
            }
            let note = pitches[self.index % pitches.len()];
            let freq = midi_to_freq(note) * 2.0;
            let inc = TAU * freq / sample_rate;

            let remaining = samples_per_note - self.timer;
            let run = remaining.min(frames - frame);
            for k in 0..run {
                let progress = (self.timer + k) as f32 / samples_per_note as f32;
                let envelope = if progress < ATTACK_FRACTION {
                    progress / ATTACK_FRACTION
                } else if progress > RELEASE_START {
                    (1.0 - progress) / (1.0 - RELEASE_START)
                } else {
                    1.0
                };
                let sample = self.phase.sin() * FUNDAMENTAL_GAIN
                    + (self.phase * 2.0).sin() * OCTAVE_GAIN;
                let value = sample * envelope * volume;
                out[2 * (frame + k)] += value * LEFT_SPREAD;
                out[2 * (frame + k) + 1] += value * RIGHT_SPREAD;
                self.phase += inc;
            }
            self.phase %= TAU;
            self.timer += run;
            frame += run;
        }
    }

    /// Keep the cursor valid when the pitch list is replaced.
    pub fn on_chord_change(&mut self, pitch_count: usize) {
        if pitch_count > 0 {
            self.index %= pitch_count;
        } else {
            self.index = 0;
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.timer = 0;
        self.index = 0;
    }
}

impl Default for ArpLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    #[test]
    fn silent_below_floor_and_with_no_pitches() {
        let mut arp = ArpLayer::new();
        let mut buf = vec![0.0f32; 128];
        arp.render(&mut buf, &[60], 0.0, 4.0, SR);
        assert!(buf.iter().all(|&s| s == 0.0));
        arp.render(&mut buf, &[], 0.5, 4.0, SR);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn note_boundaries_fall_to_silence() {
        // One note is 100 samples at 480 notes/sec; render two notes worth
        // and check the envelope reaches zero at each boundary.
        let mut arp = ArpLayer::new();
        let mut buf = vec![0.0f32; 400];
        arp.render(&mut buf, &[60, 64], 1.0, 480.0, SR);
        // Last frame of each note slot has progress 0.99 -> envelope 0.05.
        let boundary = buf[2 * 99].abs().max(buf[2 * 99 + 1].abs());
        assert!(boundary < 0.05, "note should decay into the boundary: {boundary}");
    }

    #[test]
    fn cursor_wraps_when_chord_shrinks() {
        let mut arp = ArpLayer::new();
        let mut buf = vec![0.0f32; 4096];
        arp.render(&mut buf, &[60, 64, 67], 0.5, 100.0, SR);
        arp.on_chord_change(1);
        assert_eq!(arp.index, 0);
        // Rendering with the shorter list must not panic.
        arp.render(&mut buf, &[72], 0.5, 100.0, SR);
    }

    #[test]
    fn split_render_matches_whole_render() {
        let pitches = [60u8, 64, 67];
        let mut whole = ArpLayer::new();
        let mut buf_whole = vec![0.0f32; 512];
        whole.render(&mut buf_whole, &pitches, 0.5, 6.0, SR);

        let mut split = ArpLayer::new();
        let mut buf_split = vec![0.0f32; 512];
        let (a, b) = buf_split.split_at_mut(256);
        split.render(a, &pitches, 0.5, 6.0, SR);
        split.render(b, &pitches, 0.5, 6.0, SR);

        for (x, y) in buf_whole.iter().zip(buf_split.iter()) {
            assert!((x - y).abs() < 1e-4);
        }
    }
}
