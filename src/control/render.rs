use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use ringbuf::HeapProd;
use tracing::{error, info, trace};

use crate::audio::output::AudioOutput;
use crate::synth::limiter::LimiterMeter;
use crate::synth::SynthesisEngine;

use super::shared::{ChordFrame, SharedParams};

/// Render worker: one block per deadline, always consuming the latest
/// published state.
///
/// Each iteration drains the chord channel to the newest frame, snapshots
/// the scalar targets, renders, and pushes the block to the ring buffer (and
/// the optional WAV tee). A fault inside the renderer is caught, the block
/// replaced with silence and the fault reported on the meter; the audio
/// stream itself never observes it. On stop at least one silent block is
/// forced into the ring before the worker exits, and all engine state is
/// reset so a restart begins clean.
pub fn run(
    mut engine: SynthesisEngine,
    params: Arc<SharedParams>,
    chord_rx: Receiver<ChordFrame>,
    mut producer: Option<HeapProd<f32>>,
    wav_tx: Option<Sender<Arc<[f32]>>>,
    meter: Arc<LimiterMeter>,
    stop: Arc<AtomicBool>,
) {
    let block_frames = engine.block_frames();
    let block_duration =
        Duration::from_secs_f32(block_frames as f32 / engine.sample_rate().max(1.0));
    let mut buf = vec![0.0f32; block_frames * 2];
    let mut next_deadline = Instant::now();

    loop {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        next_deadline += block_duration;

        // Drain to the latest chord frame; each one is a complete publish.
        while let Ok(frame) = chord_rx.try_recv() {
            engine.set_chord(&frame);
        }
        engine.set_targets(
            params.pad_target.load(),
            params.arp_target.load(),
            params.cutoff_target.load(),
        );
        engine.set_state(params.state.load(Ordering::Relaxed));

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            engine.render(&mut buf);
        }));
        if outcome.is_err() {
            buf.fill(0.0);
            meter.record_fault();
            error!("render fault, block replaced with silence");
        }

        if let Some(prod) = producer.as_mut() {
            AudioOutput::push_samples(prod, &buf, &stop);
        }
        if let Some(tx) = &wav_tx {
            let _ = tx.try_send(Arc::from(&buf[..]));
        }

        let now = Instant::now();
        if now < next_deadline {
            std::thread::sleep(next_deadline - now);
        } else {
            next_deadline = now;
            trace!("render worker overrun");
        }
    }

    // Two-phase shutdown: silence reaches the device before any teardown,
    // and the engine restarts from clean state.
    buf.fill(0.0);
    if let Some(prod) = producer.as_mut() {
        AudioOutput::push_samples(prod, &buf, &AtomicBool::new(false));
    }
    if let Some(tx) = &wav_tx {
        let _ = tx.try_send(Arc::from(&buf[..]));
    }
    engine.reset();
    info!("render worker stopped");
}
