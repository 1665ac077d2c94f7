pub mod adaptive;
pub mod chord;
pub mod harmonizer;
pub mod library;
pub mod presets;
pub mod tension;

pub use adaptive::AdaptiveControl;
pub use chord::{key_to_pitch_class, voice_leading_cost, Chord, Extension, Quality};
pub use harmonizer::Harmonizer;
pub use library::{ChordLibrary, LibraryFilter};
pub use tension::{fifths_distance, TensionEngine, TensionWeights, TENSION_MAX};
