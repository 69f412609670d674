//! Positions and directed selections in a content tree.
//!
//! A [`Cursor`] is a point (node + char offset). A [`Range`] is a directed
//! pair of cursors; when both ends are equal it denotes the whole node rather
//! than an empty span.

pub mod cursor;
pub mod range;

pub use cursor::Cursor;
pub use range::Range;
