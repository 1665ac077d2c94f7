// Entry point: wires the control loop, render worker and audio output.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::bounded;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use neurochord::audio::{AudioOutput, WavOutput};
use neurochord::cli::Args;
use neurochord::config::AppConfig;
use neurochord::control::{
    render, ArpMode, Arpeggiator, ChordFrame, ControlHandle, ControlLoop, ControlMsg,
    EngineEvent, SharedParams,
};
use neurochord::harmony::{key_to_pitch_class, AdaptiveControl, Harmonizer, TensionWeights};
use neurochord::synth::{LimiterMeter, LimiterMode, SynthesisEngine};

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = AppConfig::load_or_default(&args.config);

    let key_name = args.key.clone().or_else(|| cfg.harmony.key.clone());
    let key_root = match &key_name {
        Some(name) => Some(key_to_pitch_class(name)?),
        None => None,
    };
    let arp_mode = ArpMode::from_name(
        args.arp_mode
            .as_deref()
            .unwrap_or(&cfg.control.arp_mode),
    )?;
    let preset_name = args.preset.clone().or_else(|| cfg.harmony.preset.clone());
    let bpm = args.bpm.unwrap_or(cfg.control.bpm);
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(format!("bpm must be positive, got {bpm}"));
    }

    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_ctrlc = stop.clone();
    ctrlc::set_handler(move || {
        stop_for_ctrlc.store(true, Ordering::SeqCst);
    })
    .map_err(|err| format!("failed to set Ctrl-C handler: {err}"))?;

    // Channels: chord frames to the render worker, preset requests to the
    // control loop, outbound events to subscribers, blocks to the wav tee.
    let (chord_tx, chord_rx) = bounded::<ChordFrame>(8);
    let (preset_tx, preset_rx) = bounded::<String>(4);
    let (event_tx, event_rx) = bounded::<EngineEvent>(64);
    let (wav_tx, wav_rx) = bounded::<Arc<[f32]>>(16);

    let params = Arc::new(SharedParams::new(&cfg.curve));
    let handle = ControlHandle::new(
        params.clone(),
        cfg.curve.clone(),
        chord_tx.clone(),
        preset_tx,
    );
    let meter = Arc::new(LimiterMeter::default());

    let (mut audio_out, producer) = if args.play {
        let (out, prod) = AudioOutput::open(cfg.audio.sample_rate, cfg.audio.latency_ms)?;
        (Some(out), Some(prod))
    } else {
        (None, None)
    };

    let wav_handle = args
        .wav
        .clone()
        .map(|path| WavOutput::run(wav_rx, path, cfg.audio.sample_rate));
    let wav_tx_for_render = if args.wav.is_some() {
        Some(wav_tx.clone())
    } else {
        None
    };
    drop(wav_tx);

    let engine = SynthesisEngine::new(
        cfg.audio.sample_rate as f32,
        cfg.audio.block_frames,
        &cfg.synth,
        LimiterMode::default(),
        Some(meter.clone()),
    );

    let mut harmonizer = Harmonizer::new(
        key_root,
        TensionWeights::default(),
        cfg.harmony.octave,
        SmallRng::from_os_rng(),
    )
    .with_top_k(cfg.harmony.top_k);
    if let Some(name) = &preset_name {
        harmonizer.apply_preset(name)?;
        info!(preset = %name, "startup preset applied");
    }
    let adaptive = (args.adaptive || cfg.harmony.adaptive)
        .then(|| AdaptiveControl::new(cfg.harmony.learning_rate, cfg.harmony.history_len));
    let arpeggiator = Arpeggiator::new(arp_mode, cfg.control.arp_gate, SmallRng::from_os_rng());

    let beat = 60.0 / bpm;
    let control_loop = ControlLoop {
        harmonizer,
        adaptive,
        arpeggiator,
        octave: cfg.harmony.octave,
        arp_velocity: cfg.control.arp_velocity,
        chord_interval: Duration::from_secs_f32(beat * cfg.control.beats_per_chord.max(0.25)),
        arp_interval: Duration::from_secs_f32(beat * cfg.control.arp_interval_beats.max(0.05)),
    };

    let control_handle = {
        let params = params.clone();
        let stop = stop.clone();
        thread::Builder::new()
            .name("control".into())
            .spawn(move || control_loop.run(params, chord_tx, preset_rx, event_tx, stop))
            .map_err(|err| format!("failed to spawn control thread: {err}"))?
    };

    let render_handle = {
        let params = params.clone();
        let stop = stop.clone();
        let meter = meter.clone();
        thread::Builder::new()
            .name("render".into())
            .spawn(move || {
                render::run(
                    engine,
                    params,
                    chord_rx,
                    producer,
                    wav_tx_for_render,
                    meter,
                    stop,
                )
            })
            .map_err(|err| format!("failed to spawn render thread: {err}"))?
    };

    // Outbound events are for external subscribers; here they just land in
    // the log. The thread ends when the control loop drops its sender.
    let event_handle = thread::Builder::new()
        .name("events".into())
        .spawn(move || {
            for event in event_rx.iter() {
                match event {
                    EngineEvent::ChordChosen {
                        root,
                        quality,
                        pitches,
                    } => {
                        info!(target: "events", root, quality = quality.name(), ?pitches, "chord");
                    }
                    EngineEvent::NoteEmitted { pitch, velocity } => {
                        debug!(target: "events", pitch, velocity, "note");
                    }
                }
            }
        })
        .map_err(|err| format!("failed to spawn event thread: {err}"))?;

    info!(
        key = key_name.as_deref().unwrap_or("none"),
        bpm,
        demo = args.demo,
        "running"
    );

    let started = Instant::now();
    while !stop.load(Ordering::SeqCst) {
        if args.demo {
            // Stand-in for the external classifier: a slow oscillation over
            // the full probability range, with the discrete state following.
            let t = started.elapsed().as_secs_f32();
            let prob = (t * 0.25).sin().abs();
            let _ = handle.apply(ControlMsg::Probability(prob));
            let _ = handle.apply(ControlMsg::State(u8::from(prob > 0.5)));
        }
        if args.duration > 0.0 && started.elapsed().as_secs_f32() >= args.duration {
            stop.store(true, Ordering::SeqCst);
            break;
        }
        thread::sleep(Duration::from_millis(100));
    }

    // Shutdown is two-phase: the render worker pushes silence and resets
    // before the device goes away.
    stop.store(true, Ordering::SeqCst);
    let _ = control_handle.join();
    let _ = render_handle.join();
    thread::sleep(Duration::from_secs_f32(cfg.audio.latency_ms.max(10.0) / 1000.0));
    if let Some(out) = audio_out.as_mut() {
        out.stop();
    }
    drop(handle);
    let _ = event_handle.join();
    if let Some(wav) = wav_handle {
        let _ = wav.join();
    }

    if let Some(stats) = meter.take_snapshot() {
        info!(
            num_over = stats.num_over,
            max_abs_in = stats.max_abs_in,
            "limiter engaged during session"
        );
    }
    if meter.fault_count() > 0 {
        info!(faults = meter.fault_count(), "render faults were muted");
    }
    info!("shutdown complete");
    Ok(())
}
