//! Shared enums for alignment runs.

mod enums;

pub use enums::{AlignMode, TrackKind};
