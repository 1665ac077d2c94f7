pub mod arpeggiator;
pub mod render;
pub mod scheduler;
pub mod shared;

pub use arpeggiator::{ArpMode, Arpeggiator};
pub use scheduler::ControlLoop;
pub use shared::{
    AtomicF32, ChordFrame, ControlHandle, ControlMsg, EngineEvent, SharedParams,
};
