//! Timeflow Core Types and Definitions
//!
//! Foundational types for rendering directly-follows graphs on a timeline:
//!
//! - **Identifiers**: per-graph activity arena ([`identifier::ActivityRegistry`])
//! - **Model**: the directly-follows graph ([`dfg::Dfg`]) and its builder
//! - **Durations**: [`duration::ActivityDuration`] and [`duration::DurationTable`]
//! - **Event logs**: traces ([`event_log::EventLog`]) and DFG [`discovery`]
//! - **Colors**, **Geometry** and **Draw** definitions shared by renderers

pub mod color;
pub mod dfg;
pub mod discovery;
pub mod draw;
pub mod duration;
pub mod event_log;
pub mod geometry;
pub mod identifier;
