pub mod error;
pub mod navigator;
pub mod selection;
pub mod tree;
pub mod walkers;

// Re-export key types for easier usage
pub use error::{ParseActionError, ParseGranularityError, TreeError};
pub use navigator::{Navigator, NavigatorOptions, SessionStore};
pub use selection::{Cursor, Range};
pub use tree::{ContentTree, Document, LiveSelection, NodeId, NodeKind, TextPoint, Traversal};
pub use walkers::{Action, Braille, Description, Granularity, Walker};
