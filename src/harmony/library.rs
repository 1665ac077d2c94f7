use super::chord::{Chord, Extension, Quality};

/// Major-scale degrees used when a library is restricted to a key.
const DIATONIC_DEGREES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

const BASIC_EXTENSION_SETS: [&[Extension]; 4] = [
    &[],
    &[Extension::Nine],
    &[Extension::Nine, Extension::Eleven],
    &[Extension::Nine, Extension::Eleven, Extension::Thirteen],
];

const ALTERED_EXTENSION_SETS: [&[Extension]; 3] = [
    &[Extension::SharpEleven],
    &[Extension::FlatNine],
    &[Extension::SharpNine],
];

/// Candidate filters for a library rebuild.
#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    /// Restrict roots to the diatonic degrees of this key, if set.
    pub key_root: Option<u8>,
    /// Restrict qualities to this list; `None` allows all of them.
    pub qualities: Option<Vec<Quality>>,
    /// Include altered extension sets (b9, #9, #11).
    pub allow_altered: bool,
}

/// Ordered candidate collection. Rebuilt as a whole, never mutated in place.
#[derive(Debug, Clone)]
pub struct ChordLibrary {
    chords: Vec<Chord>,
}

impl ChordLibrary {
    /// Deterministic cross of roots, qualities and extension sets. Calling
    /// this repeatedly with the same filter yields the same library.
    pub fn build(filter: &LibraryFilter) -> Self {
        let roots: Vec<u8> = match filter.key_root {
            Some(key) => DIATONIC_DEGREES.iter().map(|d| (key + d) % 12).collect(),
            None => (0..12).collect(),
        };
        let qualities: Vec<Quality> = match &filter.qualities {
            Some(allowed) => Quality::ALL
                .iter()
                .copied()
                .filter(|q| allowed.contains(q))
                .collect(),
            None => Quality::ALL.to_vec(),
        };

        let mut chords = Vec::new();
        for &root in &roots {
            for &quality in &qualities {
                for ext in BASIC_EXTENSION_SETS {
                    chords.push(Chord::new(root, quality).with_extensions(ext));
                }
                if filter.allow_altered {
                    for ext in ALTERED_EXTENSION_SETS {
                        chords.push(Chord::new(root, quality).with_extensions(ext));
                    }
                }
            }
        }
        Self { chords }
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chord> {
        self.chords.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chord> {
        self.chords.iter()
    }

    pub fn contains(&self, chord: &Chord) -> bool {
        self.chords.contains(chord)
    }
}
