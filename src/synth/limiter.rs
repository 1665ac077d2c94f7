use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug)]
pub struct SoftClipParams {
    pub ceiling: f32,
    pub drive: f32,
}

impl Default for SoftClipParams {
    fn default() -> Self {
        Self {
            ceiling: 1.25,
            drive: 0.8,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum LimiterMode {
    None,
    SoftClip(SoftClipParams),
}

impl Default for LimiterMode {
    fn default() -> Self {
        Self::SoftClip(SoftClipParams::default())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LimiterStats {
    pub max_abs_in: f32,
    pub max_abs_out: f32,
    pub num_over: u64,
}

/// Out-of-band diagnostics for the render path: limiter engagement plus
/// render faults, published through atomics so the audio thread never
/// blocks on a reader.
#[derive(Debug, Default)]
pub struct LimiterMeter {
    engaged_count: AtomicU64,
    over_count: AtomicU64,
    fault_count: AtomicU64,
    max_abs_in_bits: AtomicU32,
    max_abs_out_bits: AtomicU32,
}

impl LimiterMeter {
    pub fn record(&self, stats: &LimiterStats) {
        if stats.num_over == 0 {
            return;
        }
        self.engaged_count.fetch_add(1, Ordering::Relaxed);
        self.over_count.fetch_add(stats.num_over, Ordering::Relaxed);
        self.max_abs_in_bits
            .store(stats.max_abs_in.to_bits(), Ordering::Relaxed);
        self.max_abs_out_bits
            .store(stats.max_abs_out.to_bits(), Ordering::Relaxed);
    }

    /// Count a render fault that was replaced by silence.
    pub fn record_fault(&self) {
        self.fault_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fault_count(&self) -> u64 {
        self.fault_count.load(Ordering::Relaxed)
    }

    /// Drain the accumulated stats, or `None` when nothing engaged.
    pub fn take_snapshot(&self) -> Option<LimiterStats> {
        let engaged = self.engaged_count.swap(0, Ordering::Relaxed);
        if engaged == 0 {
            return None;
        }
        let over = self.over_count.swap(0, Ordering::Relaxed);
        let max_abs_in = f32::from_bits(self.max_abs_in_bits.swap(0, Ordering::Relaxed));
        let max_abs_out = f32::from_bits(self.max_abs_out_bits.swap(0, Ordering::Relaxed));
        Some(LimiterStats {
            max_abs_in,
            max_abs_out,
            num_over: over,
        })
    }
}

/// Final stage of the mix: a saturating soft clip that controls peaks
/// without hard clipping. Non-finite samples are zeroed on the way through.
#[derive(Debug)]
pub struct Limiter {
    mode: LimiterMode,
    stats: LimiterStats,
    meter: Option<Arc<LimiterMeter>>,
}

impl Limiter {
    pub fn new(mode: LimiterMode) -> Self {
        Self {
            mode,
            stats: LimiterStats::default(),
            meter: None,
        }
    }

    pub fn with_meter(mut self, meter: Arc<LimiterMeter>) -> Self {
        self.meter = Some(meter);
        self
    }

    pub fn process_interleaved(&mut self, frames: &mut [f32]) {
        if frames.is_empty() {
            return;
        }
        self.stats = LimiterStats::default();
        match self.mode {
            LimiterMode::None => {
                for sample in frames.iter_mut() {
                    if !sample.is_finite() {
                        *sample = 0.0;
                    }
                }
            }
            LimiterMode::SoftClip(params) => {
                let ceiling = params.ceiling.abs().max(1e-6);
                let drive = params.drive.max(0.0);
                for sample in frames.iter_mut() {
                    let x = if sample.is_finite() { *sample } else { 0.0 };
                    let abs_in = x.abs();
                    if abs_in > self.stats.max_abs_in {
                        self.stats.max_abs_in = abs_in;
                    }
                    if abs_in > ceiling {
                        self.stats.num_over += 1;
                    }
                    let y = (x * drive).tanh() * ceiling;
                    let abs_out = y.abs();
                    if abs_out > self.stats.max_abs_out {
                        self.stats.max_abs_out = abs_out;
                    }
                    *sample = y;
                }
            }
        }
        if let Some(meter) = self.meter.as_ref() {
            meter.record(&self.stats);
        }
    }

    pub fn stats(&self) -> LimiterStats {
        self.stats
    }
}
