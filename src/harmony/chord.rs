use std::fmt;

/// Chord quality. `Dom7` is the plain dominant seventh ("7" in chord symbols).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Maj,
    Min,
    Dom7,
    Maj7,
    Min7,
    Dim,
    Aug,
    Sus2,
    Sus4,
}

impl Quality {
    pub const ALL: [Quality; 9] = [
        Quality::Maj,
        Quality::Min,
        Quality::Dom7,
        Quality::Maj7,
        Quality::Min7,
        Quality::Dim,
        Quality::Aug,
        Quality::Sus2,
        Quality::Sus4,
    ];

    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "maj" => Ok(Quality::Maj),
            "min" => Ok(Quality::Min),
            "7" => Ok(Quality::Dom7),
            "maj7" => Ok(Quality::Maj7),
            "m7" => Ok(Quality::Min7),
            "dim" => Ok(Quality::Dim),
            "aug" => Ok(Quality::Aug),
            "sus2" => Ok(Quality::Sus2),
            "sus4" => Ok(Quality::Sus4),
            other => Err(format!("unknown chord quality '{other}'")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Quality::Maj => "maj",
            Quality::Min => "min",
            Quality::Dom7 => "7",
            Quality::Maj7 => "maj7",
            Quality::Min7 => "m7",
            Quality::Dim => "dim",
            Quality::Aug => "aug",
            Quality::Sus2 => "sus2",
            Quality::Sus4 => "sus4",
        }
    }

    /// Semitone offsets from the root, root position.
    fn semitones(&self) -> &'static [i32] {
        match self {
            Quality::Maj => &[0, 4, 7],
            Quality::Min => &[0, 3, 7],
            Quality::Dim => &[0, 3, 6],
            Quality::Aug => &[0, 4, 8],
            Quality::Sus2 => &[0, 2, 7],
            Quality::Sus4 => &[0, 5, 7],
            Quality::Dom7 => &[0, 4, 7, 10],
            Quality::Maj7 => &[0, 4, 7, 11],
            Quality::Min7 => &[0, 3, 7, 10],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Extension {
    Nine,
    Eleven,
    Thirteen,
    FlatNine,
    SharpNine,
    SharpEleven,
    FlatThirteen,
}

impl Extension {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "9" => Ok(Extension::Nine),
            "11" => Ok(Extension::Eleven),
            "13" => Ok(Extension::Thirteen),
            "b9" => Ok(Extension::FlatNine),
            "#9" => Ok(Extension::SharpNine),
            "#11" => Ok(Extension::SharpEleven),
            "b13" => Ok(Extension::FlatThirteen),
            other => Err(format!("unknown chord extension '{other}'")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Extension::Nine => "9",
            Extension::Eleven => "11",
            Extension::Thirteen => "13",
            Extension::FlatNine => "b9",
            Extension::SharpNine => "#9",
            Extension::SharpEleven => "#11",
            Extension::FlatThirteen => "b13",
        }
    }

    /// Semitone offset from the chord root (an octave above the triad).
    pub fn semitones(&self) -> i32 {
        match self {
            Extension::Nine => 14,
            Extension::Eleven => 17,
            Extension::Thirteen => 21,
            Extension::FlatNine => 13,
            Extension::SharpNine => 15,
            Extension::SharpEleven => 18,
            Extension::FlatThirteen => 20,
        }
    }

    pub fn is_altered(&self) -> bool {
        matches!(
            self,
            Extension::FlatNine
                | Extension::SharpNine
                | Extension::SharpEleven
                | Extension::FlatThirteen
        )
    }
}

/// Pitch-class based chord (no absolute octave). Value type: equality and
/// hashing follow the content, so it can key a memo table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    root: u8,
    pub quality: Quality,
    extensions: Vec<Extension>,
    pub inversion: u8,
}

impl Chord {
    pub fn new(root: u8, quality: Quality) -> Self {
        Self {
            root: root % 12,
            quality,
            extensions: Vec::new(),
            inversion: 0,
        }
    }

    pub fn with_extensions(mut self, extensions: &[Extension]) -> Self {
        self.extensions = extensions.to_vec();
        self.extensions.sort_unstable();
        self.extensions.dedup();
        self
    }

    pub fn with_inversion(mut self, inversion: u8) -> Self {
        self.inversion = inversion;
        self
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Realize the chord as MIDI note numbers at the given octave.
    ///
    /// Inversion lifts the lowest `inversion` chord tones up an octave before
    /// the final ascending sort.
    pub fn pitches(&self, octave: u8) -> Vec<u8> {
        let base = self.root as i32 + 12 * octave as i32;
        let mut notes: Vec<i32> = self.quality.semitones().iter().map(|s| base + s).collect();
        for ext in &self.extensions {
            notes.push(base + ext.semitones());
        }
        for note in notes.iter_mut().take(self.inversion as usize) {
            *note += 12;
        }
        notes.sort_unstable();
        notes
            .into_iter()
            .map(|n| n.clamp(0, 127) as u8)
            .collect()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.root, self.quality.name())?;
        for ext in &self.extensions {
            write!(f, "{}", ext.name())?;
        }
        if self.inversion > 0 {
            write!(f, "/{}", self.inversion)?;
        }
        Ok(())
    }
}

/// Mean melodic movement between the realized pitches of two chords: each
/// pitch of the smaller set is greedily matched to its nearest neighbor in
/// the larger set and the absolute semitone distances are averaged.
pub fn voice_leading_cost(a: &Chord, b: &Chord, octave: u8) -> f32 {
    let pa = a.pitches(octave);
    let pb = b.pitches(octave);
    let (small, large) = if pa.len() <= pb.len() { (pa, pb) } else { (pb, pa) };
    if small.is_empty() || large.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for &n in &small {
        let nearest = large
            .iter()
            .map(|&m| (m as f32 - n as f32).abs())
            .fold(f32::INFINITY, f32::min);
        sum += nearest;
    }
    sum / small.len() as f32
}

/// Note name (C, C#, Db, ... B) to pitch class. Case-insensitive.
pub fn key_to_pitch_class(name: &str) -> Result<u8, String> {
    match name.trim().to_ascii_uppercase().as_str() {
        "C" => Ok(0),
        "C#" | "DB" => Ok(1),
        "D" => Ok(2),
        "D#" | "EB" => Ok(3),
        "E" => Ok(4),
        "F" => Ok(5),
        "F#" | "GB" => Ok(6),
        "G" => Ok(7),
        "G#" | "AB" => Ok(8),
        "A" => Ok(9),
        "A#" | "BB" => Ok(10),
        "B" => Ok(11),
        other => Err(format!("unknown key '{other}'")),
    }
}
