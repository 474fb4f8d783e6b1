pub mod degrees;
pub mod transpose;

pub use degrees::{degree_in_key, pitch_class_of_degree};
pub use transpose::{key_distance, transpose_chord, transpose_sheet, transpose_sheet_by, transpose_symbol};
