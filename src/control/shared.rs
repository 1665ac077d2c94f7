use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use tracing::trace;

use crate::config::ControlCurve;
use crate::harmony::chord::Quality;
use crate::harmony::presets;

/// Manual filter override bounds, Hz.
pub const CUTOFF_MIN_HZ: f32 = 100.0;
pub const CUTOFF_MAX_HZ: f32 = 8000.0;

/// Single f32 cell with atomic bit-cast storage. A one-block-stale read is
/// inaudible, so relaxed ordering is all these need.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Scalar state shared between the inbound apply path, the control loop and
/// the render worker. Each field is a single atomic value; the composite
/// pitch list travels separately as a [`ChordFrame`] so it can never tear.
#[derive(Debug)]
pub struct SharedParams {
    pub probability: AtomicF32,
    /// 0 = rest, 1 = active imagery.
    pub state: AtomicU32,
    pub pad_target: AtomicF32,
    pub arp_target: AtomicF32,
    pub cutoff_target: AtomicF32,
}

impl SharedParams {
    pub fn new(curve: &ControlCurve) -> Self {
        Self {
            probability: AtomicF32::new(0.0),
            state: AtomicU32::new(0),
            pad_target: AtomicF32::new(curve.pad_level),
            arp_target: AtomicF32::new(0.0),
            cutoff_target: AtomicF32::new(curve.cutoff_max_hz),
        }
    }
}

/// One atomic publish of chord and pitch state. The pitch list is shared by
/// reference and replaced wholesale, never edited in place.
#[derive(Debug, Clone)]
pub struct ChordFrame {
    pub root: u8,
    pub quality: Quality,
    pub probability: f32,
    pub pitches: Arc<[u8]>,
}

/// Inbound control messages. Transport is someone else's problem; an OSC or
/// IPC layer translates into these and calls [`ControlHandle::apply`].
#[derive(Debug, Clone)]
pub enum ControlMsg {
    Chord(ChordFrame),
    Probability(f32),
    State(u8),
    PadVolume(f32),
    ArpVolume(f32),
    FilterCutoff(f32),
    Preset(String),
}

/// Outbound notifications for logging/transport subscribers. Delivery is
/// best-effort; the core never blocks on a slow consumer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    ChordChosen {
        root: u8,
        quality: Quality,
        pitches: Arc<[u8]>,
    },
    NoteEmitted {
        pitch: u8,
        velocity: u8,
    },
}

/// Entry point for external control. Scalars land in [`SharedParams`];
/// chords and presets are forwarded to their consumers over bounded
/// channels.
#[derive(Clone)]
pub struct ControlHandle {
    params: Arc<SharedParams>,
    curve: ControlCurve,
    chord_tx: Sender<ChordFrame>,
    preset_tx: Sender<String>,
}

impl ControlHandle {
    pub fn new(
        params: Arc<SharedParams>,
        curve: ControlCurve,
        chord_tx: Sender<ChordFrame>,
        preset_tx: Sender<String>,
    ) -> Self {
        Self {
            params,
            curve,
            chord_tx,
            preset_tx,
        }
    }

    pub fn apply(&self, msg: ControlMsg) -> Result<(), String> {
        match msg {
            ControlMsg::Probability(p) => {
                let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
                self.params.probability.store(p);
                self.params.pad_target.store(self.curve.pad_level * (1.0 - p));
                self.params.arp_target.store(self.curve.arp_level * p);
                self.params.cutoff_target.store(
                    self.curve.cutoff_min_hz
                        + p * (self.curve.cutoff_max_hz - self.curve.cutoff_min_hz),
                );
                Ok(())
            }
            ControlMsg::State(s) => {
                self.params.state.store(u32::from(s.min(1)), Ordering::Relaxed);
                Ok(())
            }
            ControlMsg::PadVolume(v) => {
                self.params.pad_target.store(clamp_volume(v));
                Ok(())
            }
            ControlMsg::ArpVolume(v) => {
                self.params.arp_target.store(clamp_volume(v));
                Ok(())
            }
            ControlMsg::FilterCutoff(hz) => {
                let hz = if hz.is_finite() {
                    hz.clamp(CUTOFF_MIN_HZ, CUTOFF_MAX_HZ)
                } else {
                    CUTOFF_MAX_HZ
                };
                self.params.cutoff_target.store(hz);
                Ok(())
            }
            ControlMsg::Chord(frame) => {
                if let Err(TrySendError::Full(_)) = self.chord_tx.try_send(frame) {
                    trace!("chord channel full, frame dropped");
                }
                Ok(())
            }
            ControlMsg::Preset(name) => {
                // Validate here so the caller hears about a bad name; the
                // control loop then only ever applies known presets.
                presets::lookup(&name)?;
                if let Err(TrySendError::Full(_)) = self.preset_tx.try_send(name) {
                    trace!("preset channel full, request dropped");
                }
                Ok(())
            }
        }
    }
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn handle() -> (ControlHandle, Arc<SharedParams>) {
        let curve = ControlCurve::default();
        let params = Arc::new(SharedParams::new(&curve));
        let (chord_tx, _chord_rx) = bounded(8);
        let (preset_tx, _preset_rx) = bounded(4);
        (
            ControlHandle::new(params.clone(), curve, chord_tx, preset_tx),
            params,
        )
    }

    #[test]
    fn atomic_f32_round_trips() {
        let cell = AtomicF32::new(0.25);
        assert_eq!(cell.load(), 0.25);
        cell.store(-3.5);
        assert_eq!(cell.load(), -3.5);
    }

    #[test]
    fn probability_maps_through_the_curve() {
        let (handle, params) = handle();
        handle.apply(ControlMsg::Probability(0.5)).unwrap();
        assert!((params.pad_target.load() - 0.4).abs() < 1e-6);
        assert!((params.arp_target.load() - 0.3).abs() < 1e-6);
        assert!((params.cutoff_target.load() - 5000.0).abs() < 1e-3);
    }

    #[test]
    fn probability_is_clamped_and_nan_safe() {
        let (handle, params) = handle();
        handle.apply(ControlMsg::Probability(4.0)).unwrap();
        assert_eq!(params.probability.load(), 1.0);
        handle.apply(ControlMsg::Probability(f32::NAN)).unwrap();
        assert_eq!(params.probability.load(), 0.0);
    }

    #[test]
    fn manual_overrides_respect_bounds() {
        let (handle, params) = handle();
        handle.apply(ControlMsg::PadVolume(2.0)).unwrap();
        assert_eq!(params.pad_target.load(), 1.0);
        handle.apply(ControlMsg::FilterCutoff(20.0)).unwrap();
        assert_eq!(params.cutoff_target.load(), CUTOFF_MIN_HZ);
        handle.apply(ControlMsg::FilterCutoff(99_999.0)).unwrap();
        assert_eq!(params.cutoff_target.load(), CUTOFF_MAX_HZ);
    }

    #[test]
    fn unknown_preset_is_rejected_at_the_boundary() {
        let (handle, _params) = handle();
        let err = handle
            .apply(ControlMsg::Preset("ambient".to_string()))
            .unwrap_err();
        assert!(err.contains("ambient"));
    }
}
