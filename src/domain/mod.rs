pub mod board;
pub mod filter;
pub mod raw;
pub mod reorder;
pub mod sorting;
pub mod task;
pub mod user;

pub use board::{load_active_boards, Board, Column};
pub use filter::{filter_tasks, Facet, FacetFilter, FilterOptions, TaskFlags, TaskVisibility};
pub use raw::{coerce_number, RawBoard, RawCategory, RawColumn, RawTask, RawUser};
pub use reorder::{is_drag_handle, renumber_columns, DropEvent};
pub use sorting::sort_by_position;
pub use task::{Category, Task};
pub use user::{SecurityLevel, User};
