//! Timeline layout of directly-follows graphs.
//!
//! The [`TimelineEngine`] turns a [`Dfg`](timeflow_core::dfg::Dfg) and a
//! [`DurationTable`](timeflow_core::duration::DurationTable) into a
//! [`TimelineLayout`]: every activity is placed on a horizontal time axis at a
//! coordinate proportional to its duration, activities that would overlap
//! are stacked into lanes, and every edge gets a stroke weight derived from
//! its frequency.
//!
//! # Pipeline Position
//!
//! ```text
//! connections file ─┐
//!                   ├─ layout (this module) ─► TimelineLayout ─► export
//! duration file  ───┘
//! ```
//!
//! The engine performs no I/O and has no hidden state: the same inputs always
//! produce the same layout.

mod engine;
mod timeline;

pub use engine::TimelineEngine;
pub use timeline::{
    AxisTick, PlacedEdge, PlacedNode, TerminalKind, TerminalMarker, TimeAxis, TimelineLayout,
};
