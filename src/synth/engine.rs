use std::sync::Arc;

use crate::config::SynthConfig;
use crate::control::shared::ChordFrame;

use super::arp::ArpLayer;
use super::filter::OnePoleLowPass;
use super::limiter::{Limiter, LimiterMeter, LimiterMode};
use super::pad::PadLayer;

/// Default chord before the first publish arrives: C major.
const DEFAULT_PITCHES: [u8; 3] = [60, 64, 67];

/// Real-time renderer for the two-layer instrument.
///
/// Rendered once per fixed-size block of interleaved stereo f32. Every
/// externally set value is a target approached once per block by one-sided
/// exponential smoothing, so no parameter ever steps audibly; all phase,
/// filter and timer state persists across blocks. When no fresh control
/// data arrives the engine keeps rendering from the last known state.
pub struct SynthesisEngine {
    sample_rate: f32,
    block_frames: usize,
    smoothing: f32,
    master_gain: f32,
    rest_arp_rate: f32,
    active_arp_rate: f32,

    pitches: Arc<[u8]>,
    pad: PadLayer,
    arp: ArpLayer,
    filter: OnePoleLowPass,
    limiter: Limiter,

    pad_volume: f32,
    pad_target: f32,
    arp_volume: f32,
    arp_target: f32,
    cutoff: f32,
    cutoff_target: f32,
    arp_rate: f32,
}

impl SynthesisEngine {
    pub fn new(
        sample_rate: f32,
        block_frames: usize,
        tuning: &SynthConfig,
        limiter_mode: LimiterMode,
        meter: Option<Arc<LimiterMeter>>,
    ) -> Self {
        let mut limiter = Limiter::new(limiter_mode);
        if let Some(meter) = meter {
            limiter = limiter.with_meter(meter);
        }
        Self {
            sample_rate: sample_rate.max(1.0),
            block_frames: block_frames.max(1),
            smoothing: tuning.smoothing.clamp(0.0, 0.9999),
            master_gain: tuning.master_gain,
            rest_arp_rate: tuning.rest_arp_rate,
            active_arp_rate: tuning.active_arp_rate,
            pitches: Arc::from(DEFAULT_PITCHES.as_slice()),
            pad: PadLayer::new(),
            arp: ArpLayer::new(),
            filter: OnePoleLowPass::new(),
            limiter,
            pad_volume: tuning.initial_pad_volume,
            pad_target: tuning.initial_pad_volume,
            arp_volume: 0.0,
            arp_target: 0.0,
            cutoff: tuning.initial_cutoff_hz,
            cutoff_target: tuning.initial_cutoff_hz,
            arp_rate: tuning.rest_arp_rate,
        }
    }

    pub fn block_frames(&self) -> usize {
        self.block_frames
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Replace chord and pitch state in one publish.
    pub fn set_chord(&mut self, frame: &ChordFrame) {
        self.pitches = frame.pitches.clone();
        self.arp.on_chord_change(self.pitches.len());
    }

    pub fn set_targets(&mut self, pad: f32, arp: f32, cutoff: f32) {
        if pad.is_finite() {
            self.pad_target = pad.max(0.0);
        }
        if arp.is_finite() {
            self.arp_target = arp.max(0.0);
        }
        if cutoff.is_finite() {
            self.cutoff_target = cutoff.max(0.0);
        }
    }

    /// 0 selects the rest-state arp tempo, anything else the active tempo.
    pub fn set_state(&mut self, state: u32) {
        self.arp_rate = if state == 0 {
            self.rest_arp_rate
        } else {
            self.active_arp_rate
        };
    }

    /// Render one interleaved stereo block in place.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        self.pad_volume = smooth(self.pad_volume, self.pad_target, self.smoothing);
        self.arp_volume = smooth(self.arp_volume, self.arp_target, self.smoothing);
        self.cutoff = smooth(self.cutoff, self.cutoff_target, self.smoothing);

        self.pad
            .render(out, &self.pitches, self.pad_volume, self.sample_rate);
        self.arp.render(
            out,
            &self.pitches,
            self.arp_volume,
            self.arp_rate,
            self.sample_rate,
        );
        self.filter.process(out, self.cutoff, self.sample_rate);
        for sample in out.iter_mut() {
            *sample *= self.master_gain;
        }
        self.limiter.process_interleaved(out);
    }

    /// Clear every phase, filter and timer so a restart begins with no
    /// stale clicks or pitch jumps. Targets are kept.
    pub fn reset(&mut self) {
        self.pad.reset();
        self.arp.reset();
        self.filter.reset();
    }

    #[cfg(test)]
    pub(crate) fn snap_volumes(&mut self, pad: f32, arp: f32, cutoff: f32) {
        self.pad_volume = pad;
        self.pad_target = pad;
        self.arp_volume = arp;
        self.arp_target = arp;
        self.cutoff = cutoff;
        self.cutoff_target = cutoff;
    }
}

fn smooth(current: f32, target: f32, smoothing: f32) -> f32 {
    if !current.is_finite() {
        return target;
    }
    current * smoothing + target * (1.0 - smoothing)
}
