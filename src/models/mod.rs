//! Models module for chord sheets
//!
//! Value objects (pitches, chords, keys) and the canonical document tree
//! that every format parser produces and every renderer consumes.

pub mod pitch;
pub mod chord;
pub mod nashville;
pub mod key;
pub mod format;
pub mod chordsheet;

// Re-export commonly used types
pub use pitch::{Accidental, ChordRoot, Letter, PitchClass};
pub use chord::{Chord, Extension, Quality};
pub use nashville::NashvilleNumber;
pub use key::Key;
pub use format::NotationFormat;
pub use chordsheet::*;
