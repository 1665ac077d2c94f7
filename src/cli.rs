use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Play audio in realtime
    #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true")]
    pub play: bool,

    /// Write rendered audio to a wav file
    #[arg(long)]
    pub wav: Option<String>,

    /// Path to config TOML
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// Key for the harmonizer, e.g. C, F#, Bb (overrides config)
    #[arg(long)]
    pub key: Option<String>,

    /// Reharmonization preset to apply at startup (overrides config)
    #[arg(long)]
    pub preset: Option<String>,

    /// Enable adaptive tension weights
    #[arg(long, default_value_t = false)]
    pub adaptive: bool,

    /// Arpeggio mode: up, down, updown, random, off (overrides config)
    #[arg(long)]
    pub arp_mode: Option<String>,

    /// Beats per minute (overrides config)
    #[arg(long)]
    pub bpm: Option<f32>,

    /// Drive the probability with a slow oscillation instead of external input
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Seconds to run before exiting (0 = run until Ctrl-C)
    #[arg(long, default_value_t = 0.0)]
    pub duration: f32,
}
