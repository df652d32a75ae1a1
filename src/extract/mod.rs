//! The extraction pipeline.
//!
//! ```text
//! provider -> text pass -> image pass -> table strategies -> normalize -> dedup -> Document
//! ```

pub mod assembler;
pub mod dedup;
pub mod geometry;
pub mod images;
pub mod normalize;
mod options;
pub mod tables;

pub use assembler::{Assembler, Stage};
pub use options::{AlignmentPass, ExtractOptions, GridMode, PageSelection, StrategyKind};
