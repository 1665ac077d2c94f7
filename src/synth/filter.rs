use std::f32::consts::PI;

/// The filter is transparent at or above this fraction of the sample rate.
pub const BYPASS_FRACTION: f32 = 0.4;

/// One-pole low-pass over interleaved stereo frames. Per-channel memory
/// persists across blocks; the coefficient is recomputed per block from the
/// smoothed cutoff.
#[derive(Debug)]
pub struct OnePoleLowPass {
    state: [f32; 2],
}

impl OnePoleLowPass {
    pub fn new() -> Self {
        Self { state: [0.0; 2] }
    }

    pub fn process(&mut self, frames: &mut [f32], cutoff_hz: f32, sample_rate: f32) {
        if !(sample_rate > 0.0) || !cutoff_hz.is_finite() {
            return;
        }
        if cutoff_hz >= sample_rate * BYPASS_FRACTION {
            return;
        }
        let norm = (cutoff_hz / (sample_rate * 0.5)).clamp(0.01, 0.99);
        let alpha = (-2.0 * PI * norm * 0.5).exp();

        for frame in frames.chunks_exact_mut(2) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let x = if sample.is_finite() { *sample } else { 0.0 };
                self.state[ch] = alpha * self.state[ch] + (1.0 - alpha) * x;
                *sample = self.state[ch];
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = [0.0; 2];
    }
}

impl Default for OnePoleLowPass {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    #[test]
    fn bypass_above_threshold_is_identity() {
        let mut filter = OnePoleLowPass::new();
        let mut buf: Vec<f32> = (0..64).map(|i| ((i as f32) * 0.3).sin()).collect();
        let original = buf.clone();
        filter.process(&mut buf, SR * BYPASS_FRACTION, SR);
        assert_eq!(buf, original);
    }

    #[test]
    fn low_cutoff_attenuates() {
        let mut filter = OnePoleLowPass::new();
        // Alternating +-1 is the highest representable frequency.
        let mut buf: Vec<f32> = (0..256).map(|i| if i % 4 < 2 { 1.0 } else { -1.0 }).collect();
        filter.process(&mut buf, 200.0, SR);
        let peak = buf[200..].iter().fold(0.0f32, |m, &s| m.max(s.abs()));
        assert!(peak < 0.2, "high frequency should be attenuated, peak {peak}");
    }

    #[test]
    fn dc_passes_through() {
        let mut filter = OnePoleLowPass::new();
        let mut buf = vec![0.5f32; 4096];
        filter.process(&mut buf, 500.0, SR);
        let tail = buf[buf.len() - 2];
        assert!((tail - 0.5).abs() < 0.01, "dc should converge, got {tail}");
    }

    #[test]
    fn state_persists_across_blocks() {
        let mut whole = OnePoleLowPass::new();
        let mut buf_whole: Vec<f32> = (0..128).map(|i| ((i / 2) as f32 * 0.1).sin()).collect();
        whole.process(&mut buf_whole, 800.0, SR);

        let mut split = OnePoleLowPass::new();
        let mut buf_split: Vec<f32> = (0..128).map(|i| ((i / 2) as f32 * 0.1).sin()).collect();
        let (a, b) = buf_split.split_at_mut(64);
        split.process(a, 800.0, SR);
        split.process(b, 800.0, SR);

        for (x, y) in buf_whole.iter().zip(buf_split.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn non_finite_input_is_zeroed_into_state() {
        let mut filter = OnePoleLowPass::new();
        let mut buf = vec![f32::NAN, f32::NAN, 0.0, 0.0];
        filter.process(&mut buf, 500.0, SR);
        assert!(buf.iter().all(|s| s.is_finite()));
    }
}
