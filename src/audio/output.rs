use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::*;
use ringbuf::{HeapProd, HeapRb};
use tracing::{error, info};

/// Connection to the default output device. The stream callback pulls
/// interleaved stereo frames from a heap ring buffer; an underrun plays
/// silence rather than stale data.
pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    pub config: cpal::StreamConfig,
}

impl AudioOutput {
    /// Open the device and start the stream; returns the producer the
    /// render worker pushes into.
    pub fn open(sample_rate: u32, latency_ms: f32) -> Result<(Self, HeapProd<f32>), String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| "no default output device".to_string())?;

        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let latency_frames = ((sample_rate as f32 * latency_ms / 1000.0) as usize).max(256);
        let rb = HeapRb::<f32>::new(latency_frames * 2 * 10);
        let (prod, mut cons) = rb.split();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let filled = cons.pop_slice(data);
                    if filled < data.len() {
                        data[filled..].fill(0.0);
                    }
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|err| format!("failed to build output stream: {err}"))?;
        stream
            .play()
            .map_err(|err| format!("failed to start output stream: {err}"))?;
        info!(sample_rate, "audio output started");

        Ok((
            Self {
                stream: Some(stream),
                config,
            },
            prod,
        ))
    }

    pub fn stop(&mut self) {
        self.stream.take();
    }

    /// Push a whole block, backing off briefly while the ring is full.
    /// Bails out when `stop` is raised so shutdown never spins here.
    pub fn push_samples(prod: &mut HeapProd<f32>, samples: &[f32], stop: &AtomicBool) {
        let mut offset = 0;
        while offset < samples.len() {
            offset += prod.push_slice(&samples[offset..]);
            if offset < samples.len() {
                if stop.load(Ordering::Relaxed) {
                    return;
                }
                std::thread::sleep(Duration::from_micros(200));
            }
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stream.take();
    }
}
