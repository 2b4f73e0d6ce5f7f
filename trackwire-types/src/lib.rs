//! Type definitions for trackwire

pub mod report;
pub mod timestamp;

pub use report::{AdReadings, CellInfo, PositionReport};
pub use timestamp::FrameTimestamp;
