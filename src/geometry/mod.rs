//! Vectors

mod three_vector;
pub use three_vector::*;
