use std::sync::Arc;

use crossbeam_channel::Receiver;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::error;

/// Capture thread: receives rendered stereo blocks and writes them as
/// 16-bit WAV until every sender is gone.
pub struct WavOutput;

impl WavOutput {
    pub fn run(
        rx: Receiver<Arc<[f32]>>,
        path: String,
        sample_rate: u32,
    ) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let spec = WavSpec {
                channels: 2,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            };
            let mut writer = match WavWriter::create(&path, spec) {
                Ok(writer) => writer,
                Err(err) => {
                    error!("failed to create wav file {path}: {err}");
                    return;
                }
            };

            while let Ok(samples) = rx.recv() {
                for &s in samples.iter() {
                    let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    if let Err(err) = writer.write_sample(v) {
                        error!("wav write failed: {err}");
                        return;
                    }
                }
            }

            if let Err(err) = writer.finalize() {
                error!("wav finalize failed: {err}");
            }
        })
    }
}
