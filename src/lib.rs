//! # TaskBoard Core
//!
//! Board screen logic for the TaskBoard kanban app.
//!
//! This crate loads a user's boards from loosely-typed records, resolves the
//! board being viewed, filters its tasks by assignee and category, and keeps
//! task positions consistent after drag-and-drop, without depending on any
//! particular UI toolkit or board backend.

pub mod config;
pub mod domain;
pub mod error;
pub mod session;
pub mod storage;
pub mod view;

// Re-export commonly used types
pub use config::BoardViewConfig;
pub use domain::{
    board::{Board, Column},
    filter::{Facet, FacetFilter, TaskVisibility},
    reorder::DropEvent,
    task::{Category, Task},
    user::User,
};
pub use error::{Result, TaskboardError};
pub use session::{ActiveBoardHub, BoardUpdate, Navigator, Strings};
pub use storage::{BoardStore, FileBoardStore};
pub use view::{BoardView, BoardViewDeps, BoardViewEvent, Subscriptions, ViewSources};
