use rand::rngs::SmallRng;
use rand::Rng;

/// Pattern the arpeggiator walks through the current pitch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpMode {
    Up,
    Down,
    UpDown,
    Random,
    Off,
}

impl ArpMode {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "up" => Ok(ArpMode::Up),
            "down" => Ok(ArpMode::Down),
            "updown" | "up-down" => Ok(ArpMode::UpDown),
            "random" => Ok(ArpMode::Random),
            "off" => Ok(ArpMode::Off),
            other => Err(format!("unknown arpeggio mode '{other}'")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArpMode::Up => "up",
            ArpMode::Down => "down",
            ArpMode::UpDown => "updown",
            ArpMode::Random => "random",
            ArpMode::Off => "off",
        }
    }
}

/// Cycles the current chord's pitches in a fixed pattern.
///
/// The pitch set is replaced wholesale (sorted ascending) on every chord
/// assignment, and both a chord assignment and a mode switch reset the
/// cursor, so no stale position ever survives either event. The up-down
/// bounce is an explicit ascending/descending machine; a boundary pitch is
/// never emitted twice in a row.
#[derive(Debug)]
pub struct Arpeggiator {
    mode: ArpMode,
    gate: f32,
    pitches: Vec<u8>,
    index: usize,
    ascending: bool,
    rng: SmallRng,
}

impl Arpeggiator {
    pub fn new(mode: ArpMode, gate: f32, rng: SmallRng) -> Self {
        Self {
            mode,
            gate: clamp_gate(gate),
            pitches: Vec::new(),
            index: 0,
            ascending: true,
            rng,
        }
    }

    pub fn mode(&self) -> ArpMode {
        self.mode
    }

    /// Fraction of the note slot a pitch is held for.
    pub fn gate(&self) -> f32 {
        self.gate
    }

    pub fn set_gate(&mut self, gate: f32) {
        self.gate = clamp_gate(gate);
    }

    pub fn set_mode(&mut self, mode: ArpMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn set_chord(&mut self, pitches: &[u8]) {
        self.pitches = pitches.to_vec();
        self.pitches.sort_unstable();
        self.reset();
    }

    fn reset(&mut self) {
        self.ascending = true;
        self.index = match self.mode {
            ArpMode::Down => self.pitches.len().saturating_sub(1),
            _ => 0,
        };
    }

    /// Emit the pitch at the cursor and advance it, or `None` when off or
    /// the pitch set is empty.
    pub fn next_pitch(&mut self) -> Option<u8> {
        let len = self.pitches.len();
        if self.mode == ArpMode::Off || len == 0 {
            return None;
        }
        if self.mode == ArpMode::Random {
            return Some(self.pitches[self.rng.random_range(0..len)]);
        }

        let pitch = self.pitches[self.index.min(len - 1)];
        match self.mode {
            ArpMode::Up => {
                self.index = (self.index + 1) % len;
            }
            ArpMode::Down => {
                self.index = if self.index == 0 { len - 1 } else { self.index - 1 };
            }
            ArpMode::UpDown => {
                if len > 1 {
                    if self.ascending {
                        if self.index + 1 >= len {
                            self.ascending = false;
                            self.index = len - 2;
                        } else {
                            self.index += 1;
                        }
                    } else if self.index == 0 {
                        self.ascending = true;
                        self.index = 1;
                    } else {
                        self.index -= 1;
                    }
                }
            }
            ArpMode::Random | ArpMode::Off => {}
        }
        Some(pitch)
    }
}

fn clamp_gate(gate: f32) -> f32 {
    if gate.is_finite() {
        gate.clamp(0.05, 1.0)
    } else {
        0.9
    }
}
