//! Cursor state and the editor context.
//!
//! - `cursor`: a single caret (`Cursor`) and every movement operation, run
//!   against a borrowed `CursorEnv`.
//! - `editor`: `EditorState`, the context object owning cursors, the optional
//!   buffer, the line breaker, the word-boundary slot, the viewport and the
//!   layout cache. Batch operations fan out over all cursors and merge
//!   duplicates afterwards.
//!
//! Invariants maintained here:
//! - The cursor list is never empty; index 0 is the primary cursor.
//! - After any batch operation no two cursors share a position.
//! - With no buffer attached every movement is a no-op, while coordinate
//!   queries still answer approximately.

pub mod cursor;
pub mod editor;

pub use cursor::{Cursor, CursorEnv, CursorId};
pub use editor::EditorState;
