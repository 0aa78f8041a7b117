//! Visual definitions shared by every renderer.

mod stroke;

pub use stroke::{StrokeDefinition, StrokeStyle};
