use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tracing::{info, trace, warn};

use crate::harmony::adaptive::AdaptiveControl;
use crate::harmony::chord::{Chord, Quality};
use crate::harmony::harmonizer::Harmonizer;
use crate::harmony::tension::TENSION_MAX;

use super::arpeggiator::Arpeggiator;
use super::shared::{ChordFrame, EngineEvent, SharedParams};

/// Control-rate loop: on the chord schedule it reads the latest probability,
/// asks the harmonizer for the next chord and publishes the result; on the
/// faster arp schedule it emits single pitches. Runs on its own thread and
/// never blocks the render path.
pub struct ControlLoop {
    pub harmonizer: Harmonizer,
    pub adaptive: Option<AdaptiveControl>,
    pub arpeggiator: Arpeggiator,
    pub octave: u8,
    pub arp_velocity: u8,
    pub chord_interval: Duration,
    pub arp_interval: Duration,
}

impl ControlLoop {
    pub fn run(
        mut self,
        params: Arc<SharedParams>,
        chord_tx: Sender<ChordFrame>,
        preset_rx: Receiver<String>,
        event_tx: Sender<EngineEvent>,
        stop: Arc<AtomicBool>,
    ) {
        let mut current = Chord::new(0, Quality::Maj);
        let mut next_chord_at = Instant::now();
        let mut next_arp_at = Instant::now() + self.arp_interval;

        loop {
            if stop.load(Ordering::SeqCst) {
                info!("control loop stopping");
                break;
            }

            // Preset swaps happen between selections, never mid-score.
            while let Ok(name) = preset_rx.try_recv() {
                match self.harmonizer.apply_preset(&name) {
                    Ok(()) => info!(preset = %name, "preset applied"),
                    Err(err) => warn!("preset rejected: {err}"),
                }
            }

            let now = Instant::now();
            if now >= next_chord_at {
                let prob = params.probability.load();
                let chord = self.harmonizer.next(&current, prob);
                if let Some(policy) = self.adaptive.as_mut() {
                    let target = prob.clamp(0.0, 1.0) * TENSION_MAX;
                    let achieved = self.harmonizer.tension(current.root(), &chord);
                    policy.observe(target, achieved, self.harmonizer.engine_mut());
                }

                let pitches: Arc<[u8]> = chord.pitches(self.octave).into();
                let frame = ChordFrame {
                    root: chord.root(),
                    quality: chord.quality,
                    probability: prob,
                    pitches: pitches.clone(),
                };
                let _ = chord_tx.try_send(frame);
                let _ = event_tx.try_send(EngineEvent::ChordChosen {
                    root: chord.root(),
                    quality: chord.quality,
                    pitches: pitches.clone(),
                });
                info!(
                    target: "control::chord",
                    chord = %chord,
                    prob = prob,
                    "chord published"
                );
                self.arpeggiator.set_chord(&pitches);
                current = chord;

                next_chord_at += self.chord_interval;
                if next_chord_at < now {
                    next_chord_at = now + self.chord_interval;
                    trace!("chord schedule overrun");
                }
            }

            if now >= next_arp_at {
                if let Some(pitch) = self.arpeggiator.next_pitch() {
                    let _ = event_tx.try_send(EngineEvent::NoteEmitted {
                        pitch,
                        velocity: self.arp_velocity,
                    });
                }
                next_arp_at += self.arp_interval;
                if next_arp_at < now {
                    next_arp_at = now + self.arp_interval;
                }
            }

            let wake = next_chord_at.min(next_arp_at);
            let pause = wake
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(50));
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }
    }
}
