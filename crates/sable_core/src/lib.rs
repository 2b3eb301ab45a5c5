//! sable_core: Core utilities shared by every stage of the Sable pipeline.
//!
//! Provides source spans and the line map used to turn byte offsets into
//! line/column positions for diagnostics.

pub mod text;

pub use text::{LineAndColumn, LineMap, TextPos, TextSpan};
