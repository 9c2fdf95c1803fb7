use crate::domain::board::{Board, Column};
use crate::domain::raw::coerce_id;
use crate::error::{Result, TaskboardError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A completed drag of a task, reported by the drag surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub task_id: u64,
    pub to_column_id: u64,
    pub from_column_id: u64,
}

impl DropEvent {
    pub fn new(task_id: u64, to_column_id: u64, from_column_id: u64) -> Self {
        Self {
            task_id,
            to_column_id,
            from_column_id,
        }
    }

    /// Builds an event from the element ids the drag surface reports: the moved
    /// item and the containers it was dropped into and taken from.
    pub fn from_element_ids(item: &str, to_container: &str, from_container: &str) -> Result<Self> {
        let parse = |raw: &str| {
            coerce_id(&Value::String(raw.to_string()))
                .ok_or_else(|| TaskboardError::InvalidRecord(format!("Invalid element id '{}'", raw)))
        };

        Ok(Self::new(parse(item)?, parse(to_container)?, parse(from_container)?))
    }

    /// The source column, unless the task stayed in its column
    pub fn distinct_source(&self) -> Option<u64> {
        (self.from_column_id != self.to_column_id).then_some(self.from_column_id)
    }
}

/// Assigns positions `1..=n` in list order and points every task at the column
pub fn renumber_column(column: &mut Column) {
    let column_id = column.id;
    for (index, task) in column.tasks.iter_mut().enumerate() {
        task.column_id = column_id;
        task.position = index as i64 + 1;
    }
}

/// Renumbers the columns touched by a drop.
///
/// The lists are expected to already be in their post-drop order. A drop within
/// one column touches that column once. Returns copies of the renumbered columns,
/// in board order, ready to be persisted.
pub fn renumber_columns(board: &mut Board, event: &DropEvent) -> Vec<Column> {
    let source = event.distinct_source();

    let affected: Vec<Column> = board
        .columns
        .iter_mut()
        .filter(|column| column.id == event.to_column_id || Some(column.id) == source)
        .map(|column| {
            renumber_column(column);
            column.clone()
        })
        .collect();

    debug!(
        task_id = event.task_id,
        to_column_id = event.to_column_id,
        from_column_id = event.from_column_id,
        columns = affected.len(),
        "Renumbered columns after drop"
    );

    affected
}

/// Only elements carrying the handle class may start a drag
pub fn is_drag_handle<'a, I>(classes: I, handle_class: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    classes.into_iter().any(|class| class == handle_class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Task;

    fn board() -> Board {
        Board::new(1, "Dev".to_string())
            .with_column(
                Column::new(1, "Todo".to_string(), 1)
                    .with_task(Task::new(10, "A".to_string(), 1, 1))
                    .with_task(Task::new(11, "B".to_string(), 1, 2))
                    .with_task(Task::new(12, "C".to_string(), 1, 3)),
            )
            .with_column(
                Column::new(2, "Doing".to_string(), 2)
                    .with_task(Task::new(20, "D".to_string(), 2, 1))
                    .with_task(Task::new(21, "E".to_string(), 2, 2)),
            )
            .with_column(
                Column::new(3, "Done".to_string(), 3)
                    .with_task(Task::new(30, "F".to_string(), 3, 5)),
            )
    }

    fn assert_dense(column: &Column) {
        for (index, task) in column.tasks.iter().enumerate() {
            assert_eq!(task.position, index as i64 + 1);
            assert_eq!(task.column_id, column.id);
        }
    }

    #[test]
    fn test_drop_across_columns_renumbers_both() {
        let mut board = board();
        let event = board.move_task(11, 2, 1).unwrap();

        let affected = renumber_columns(&mut board, &event);

        assert_eq!(affected.len(), 2);
        assert_dense(&board.columns[0]);
        assert_dense(&board.columns[1]);

        let doing: Vec<u64> = board.columns[1].tasks.iter().map(|t| t.id).collect();
        assert_eq!(doing, vec![20, 11, 21]);
        assert_eq!(board.columns[1].tasks[1].column_id, 2);
        assert_eq!(board.columns[0].tasks[1].id, 12);
        assert_eq!(board.columns[0].tasks[1].position, 2);
    }

    #[test]
    fn test_drop_within_column_touches_only_that_column() {
        let mut board = board();
        let event = board.move_task(12, 1, 0).unwrap();
        assert_eq!(event.distinct_source(), None);

        let affected = renumber_columns(&mut board, &event);

        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].id, 1);
        let todo: Vec<u64> = board.columns[0].tasks.iter().map(|t| t.id).collect();
        assert_eq!(todo, vec![12, 10, 11]);
        assert_dense(&board.columns[0]);

        // Untouched column keeps its stale position
        assert_eq!(board.columns[2].tasks[0].position, 5);
    }

    #[test]
    fn test_affected_columns_are_copies_in_board_order() {
        let mut board = board();
        let event = board.move_task(20, 1, 0).unwrap();

        let affected = renumber_columns(&mut board, &event);

        assert_eq!(affected[0].id, 1);
        assert_eq!(affected[1].id, 2);
        assert_eq!(affected[0], board.columns[0]);
    }

    #[test]
    fn test_unknown_columns_touch_nothing() {
        let mut board = board();
        let before = board.clone();

        let affected = renumber_columns(&mut board, &DropEvent::new(10, 40, 41));

        assert!(affected.is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_from_element_ids() {
        let event = DropEvent::from_element_ids("11", "2", "1").unwrap();
        assert_eq!(event, DropEvent::new(11, 2, 1));

        assert!(DropEvent::from_element_ids("task", "2", "1").is_err());
    }

    #[test]
    fn test_is_drag_handle() {
        assert!(is_drag_handle(["icon", "drag-handle"], "drag-handle"));
        assert!(!is_drag_handle(["task-title"], "drag-handle"));
        assert!(!is_drag_handle(Vec::<&str>::new(), "drag-handle"));
    }
}
