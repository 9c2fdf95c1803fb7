use crate::domain::raw::{coerce_id, coerce_number, is_flag_set, RawBoard, RawColumn};
use crate::domain::reorder::DropEvent;
use crate::domain::sorting::sort_by_position;
use crate::domain::task::{Category, Task};
use crate::domain::user::User;
use crate::error::{Result, TaskboardError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// An ordered lane of tasks within a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: u64,
    pub name: String,
    pub position: i64,
    pub board_id: u64,
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Column {
    pub fn new(id: u64, name: String, position: i64) -> Self {
        Self {
            id,
            name,
            position,
            board_id: 0,
            tasks: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Builds a column from a raw record; tasks are sorted by position
    pub fn from_raw(raw: &RawColumn, board_id: u64) -> Option<Self> {
        let Some(id) = coerce_id(&raw.id) else {
            warn!(id = %raw.id, board_id, "Skipping column record with non-numeric id");
            return None;
        };

        let mut tasks: Vec<Task> = raw
            .own_task
            .iter()
            .filter_map(|task| Task::from_raw(task, id))
            .collect();
        sort_by_position(&mut tasks);

        Some(Self {
            id,
            name: raw.name.clone(),
            position: coerce_number(&raw.position).unwrap_or_default(),
            board_id: coerce_id(&raw.board_id).unwrap_or(board_id),
            tasks,
            extra: raw.extra.clone(),
        })
    }

    pub fn task_index(&self, task_id: u64) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == task_id)
    }
}

impl From<&Column> for RawColumn {
    fn from(column: &Column) -> Self {
        Self {
            id: Value::from(column.id),
            name: column.name.clone(),
            position: Value::from(column.position),
            board_id: Value::from(column.board_id),
            own_task: column.tasks.iter().map(Into::into).collect(),
            extra: column.extra.clone(),
        }
    }
}

/// Kanban board: columns of tasks plus the categories and users it is shared with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
    pub is_active: bool,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl Board {
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            is_active: true,
            columns: Vec::new(),
            categories: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Builds a board from a raw record.
    ///
    /// Returns `None` when the id is not a number. Columns are sorted by position,
    /// and tasks within each column by theirs.
    pub fn from_raw(raw: &RawBoard) -> Option<Self> {
        let Some(id) = coerce_id(&raw.id) else {
            warn!(id = %raw.id, name = %raw.name, "Skipping board record with non-numeric id");
            return None;
        };

        let mut columns: Vec<Column> = raw
            .own_column
            .iter()
            .filter_map(|column| Column::from_raw(column, id))
            .collect();
        sort_by_position(&mut columns);

        Some(Self {
            id,
            name: raw.name.clone(),
            is_active: is_flag_set(&raw.is_active),
            columns,
            categories: raw.own_category.iter().filter_map(Category::from_raw).collect(),
            users: raw.shared_user.iter().filter_map(User::from_raw).collect(),
        })
    }

    pub fn column(&self, column_id: u64) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: u64) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.id == column_id)
    }

    /// Iterates over every task on the board, column by column
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flat_map(|column| column.tasks.iter())
    }

    /// Finds the column currently holding a task
    pub fn column_of_task(&self, task_id: u64) -> Option<u64> {
        self.columns
            .iter()
            .find(|column| column.task_index(task_id).is_some())
            .map(|column| column.id)
    }

    /// Moves a task into `to_column_id` at `index`, the way the drag surface
    /// rearranges the lists before reporting a drop.
    ///
    /// The index is clamped to the destination length. Positions are left for
    /// [`crate::domain::reorder::renumber_columns`] to fix up.
    pub fn move_task(&mut self, task_id: u64, to_column_id: u64, index: usize) -> Result<DropEvent> {
        if self.column(to_column_id).is_none() {
            return Err(TaskboardError::ColumnNotFound(to_column_id));
        }

        let from_column_id = self
            .column_of_task(task_id)
            .ok_or(TaskboardError::TaskNotFound(task_id))?;

        let task = {
            let source = self
                .column_mut(from_column_id)
                .ok_or(TaskboardError::ColumnNotFound(from_column_id))?;
            let at = source
                .task_index(task_id)
                .ok_or(TaskboardError::TaskNotFound(task_id))?;
            source.tasks.remove(at)
        };

        let destination = self
            .column_mut(to_column_id)
            .ok_or(TaskboardError::ColumnNotFound(to_column_id))?;
        let index = index.min(destination.tasks.len());
        destination.tasks.insert(index, task);

        debug!(task_id, from_column_id, to_column_id, index, "Moved task");

        Ok(DropEvent::new(task_id, to_column_id, from_column_id))
    }
}

/// Builds typed boards from raw records, keeping only active ones.
///
/// A board deactivated upstream disappears from the result entirely.
pub fn load_active_boards(raw_boards: &[RawBoard]) -> Vec<Board> {
    raw_boards
        .iter()
        .filter_map(Board::from_raw)
        .filter(|board| board.is_active)
        .collect()
}
