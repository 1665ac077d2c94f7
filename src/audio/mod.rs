pub mod output;
pub mod writer;

pub use output::AudioOutput;
pub use writer::WavOutput;
