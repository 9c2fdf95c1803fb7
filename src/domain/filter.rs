//! Facet filters over a board's tasks.
//!
//! Filter results are kept in a [`TaskVisibility`] overlay keyed by task id so
//! the domain tasks stay free of view state.

use crate::domain::board::Board;
use crate::domain::sorting::{sort_categories_by_name, sort_users_by_name};
use crate::domain::task::{Category, Task};
use crate::domain::user::User;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Selector value of a facet filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facet {
    /// Tasks with no assignee, or no category
    Unassigned,
    Id(u64),
}

impl Facet {
    /// Selector value the pickers use for [`Facet::Unassigned`]
    pub const UNASSIGNED_SENTINEL: i64 = -1;

    /// Maps a picker value to a facet. Zero and other negatives mean "no filter".
    pub fn from_raw(value: i64) -> Option<Self> {
        match value {
            Self::UNASSIGNED_SENTINEL => Some(Self::Unassigned),
            v if v > 0 => Some(Self::Id(v as u64)),
            _ => None,
        }
    }

    /// Ids past `i64::MAX` saturate so they never read back as the sentinel
    pub fn as_raw(&self) -> i64 {
        match self {
            Self::Unassigned => Self::UNASSIGNED_SENTINEL,
            Self::Id(id) => i64::try_from(*id).unwrap_or(i64::MAX),
        }
    }

    /// `Unassigned` matches an empty list, `Id` matches a list containing the id
    pub fn matches<I>(&self, mut ids: I) -> bool
    where
        I: Iterator<Item = u64>,
    {
        match self {
            Self::Unassigned => ids.next().is_none(),
            Self::Id(wanted) => ids.any(|id| id == *wanted),
        }
    }
}

/// The two facet selectors of the board screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFilter {
    pub user: Option<Facet>,
    pub category: Option<Facet>,
}

impl FacetFilter {
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.category.is_none()
    }

    /// A task is rejected when it fails any active facet
    pub fn rejects(&self, task: &Task) -> bool {
        let fails_user = self
            .user
            .is_some_and(|facet| !facet.matches(task.assignees.iter().map(|user| user.id)));
        let fails_category = self
            .category
            .is_some_and(|facet| !facet.matches(task.categories.iter().map(|cat| cat.id)));

        fails_user || fails_category
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.category = None;
    }
}

/// Per-task view flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFlags {
    /// The task fails an active facet filter
    pub filtered: bool,
    /// Filtered tasks are hidden rather than de-emphasized
    pub hide_filtered: bool,
}

/// View-state overlay holding [`TaskFlags`] for each task of the active board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskVisibility {
    flags: HashMap<u64, TaskFlags>,
}

impl TaskVisibility {
    /// Flags for a task; unknown tasks are neither filtered nor hidden
    pub fn flags(&self, task_id: u64) -> TaskFlags {
        self.flags.get(&task_id).copied().unwrap_or_default()
    }

    pub fn is_filtered(&self, task_id: u64) -> bool {
        self.flags(task_id).filtered
    }

    /// Filtered tasks are only invisible when hiding is switched on
    pub fn is_visible(&self, task_id: u64) -> bool {
        let flags = self.flags(task_id);
        !(flags.filtered && flags.hide_filtered)
    }

    pub fn filtered_count(&self) -> usize {
        self.flags.values().filter(|flags| flags.filtered).count()
    }

    /// Sets `hide_filtered` on every task entry
    pub fn set_hide_filtered(&mut self, hide: bool) {
        for flags in self.flags.values_mut() {
            flags.hide_filtered = hide;
        }
    }

    /// Carries the `hide_filtered` flags of a previous overlay over to this one
    pub fn carry_hide_flags(&mut self, previous: &TaskVisibility) {
        for (task_id, flags) in self.flags.iter_mut() {
            flags.hide_filtered = previous.flags(*task_id).hide_filtered;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Recomputes the filtered flag of every task on the board.
///
/// A task ends up filtered when it fails the user facet or the category facet;
/// with both facets unset nothing is filtered. `hide_filtered` starts cleared.
pub fn filter_tasks(board: &Board, filter: &FacetFilter) -> TaskVisibility {
    let flags = board
        .tasks()
        .map(|task| {
            (
                task.id,
                TaskFlags {
                    filtered: filter.rejects(task),
                    hide_filtered: false,
                },
            )
        })
        .collect();

    TaskVisibility { flags }
}

/// Choices offered by the two facet pickers of a board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
}

impl FilterOptions {
    pub fn for_board(board: &Board) -> Self {
        let mut users = board.users.clone();
        let mut categories = board.categories.clone();
        sort_users_by_name(&mut users);
        sort_categories_by_name(&mut categories);

        Self { users, categories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::Column;

    fn board() -> Board {
        let alice = User::new(1, "alice".to_string());
        let bob = User::new(2, "bob".to_string());
        let bug = Category::new(7, "Bug".to_string());
        let feature = Category::new(8, "Feature".to_string());

        let mut board = Board::new(1, "Dev".to_string()).with_column(
            Column::new(1, "Todo".to_string(), 1)
                .with_task(
                    Task::new(1, "alice bug".to_string(), 1, 1)
                        .with_assignee(alice.clone())
                        .with_category(bug.clone()),
                )
                .with_task(
                    Task::new(2, "bob feature".to_string(), 1, 2)
                        .with_assignee(bob.clone())
                        .with_category(feature.clone()),
                )
                .with_task(Task::new(3, "nobody".to_string(), 1, 3))
                .with_task(
                    Task::new(4, "both".to_string(), 1, 4)
                        .with_assignee(alice.clone())
                        .with_assignee(bob.clone()),
                ),
        );
        board.users = vec![bob, alice];
        board.categories = vec![feature, bug];
        board
    }

    fn filtered_ids(visibility: &TaskVisibility, board: &Board) -> Vec<u64> {
        board
            .tasks()
            .filter(|task| visibility.is_filtered(task.id))
            .map(|task| task.id)
            .collect()
    }

    #[test]
    fn test_no_filters_filters_nothing() {
        let board = board();
        let visibility = filter_tasks(&board, &FacetFilter::default());

        assert_eq!(visibility.filtered_count(), 0);
        assert!(board.tasks().all(|task| visibility.is_visible(task.id)));
    }

    #[test]
    fn test_user_filter() {
        let board = board();
        let filter = FacetFilter {
            user: Some(Facet::Id(1)),
            category: None,
        };

        let visibility = filter_tasks(&board, &filter);
        assert_eq!(filtered_ids(&visibility, &board), vec![2, 3]);
    }

    #[test]
    fn test_unassigned_user_filter() {
        let board = board();
        let filter = FacetFilter {
            user: Some(Facet::Unassigned),
            category: None,
        };

        let visibility = filter_tasks(&board, &filter);
        assert_eq!(filtered_ids(&visibility, &board), vec![1, 2, 4]);
    }

    #[test]
    fn test_uncategorized_filter() {
        let board = board();
        let filter = FacetFilter {
            user: None,
            category: Some(Facet::Unassigned),
        };

        let visibility = filter_tasks(&board, &filter);
        assert_eq!(filtered_ids(&visibility, &board), vec![1, 2]);
    }

    #[test]
    fn test_failing_either_filter_marks_filtered() {
        let board = board();
        let filter = FacetFilter {
            user: Some(Facet::Id(1)),
            category: Some(Facet::Id(7)),
        };

        let visibility = filter_tasks(&board, &filter);
        // Task 4 passes the user facet but has no category
        assert_eq!(filtered_ids(&visibility, &board), vec![2, 3, 4]);
    }

    #[test]
    fn test_filtered_matches_facet_formula() {
        let board = board();
        let facets = [None, Some(Facet::Unassigned), Some(Facet::Id(1)), Some(Facet::Id(7))];

        for user in facets {
            for category in facets {
                let filter = FacetFilter { user, category };
                let visibility = filter_tasks(&board, &filter);

                for task in board.tasks() {
                    let fails_user = user.is_some_and(|f| !f.matches(task.assignees.iter().map(|u| u.id)));
                    let fails_cat = category.is_some_and(|f| !f.matches(task.categories.iter().map(|c| c.id)));
                    assert_eq!(visibility.is_filtered(task.id), fails_user || fails_cat);
                }
            }
        }
    }

    #[test]
    fn test_facet_from_raw() {
        assert_eq!(Facet::from_raw(-1), Some(Facet::Unassigned));
        assert_eq!(Facet::from_raw(4), Some(Facet::Id(4)));
        assert_eq!(Facet::from_raw(0), None);
        assert_eq!(Facet::from_raw(-7), None);
        assert_eq!(Facet::Unassigned.as_raw(), -1);
    }

    #[test]
    fn test_large_facet_id_stays_positive() {
        assert_eq!(Facet::Id(4).as_raw(), 4);
        assert_eq!(Facet::Id(u64::MAX).as_raw(), i64::MAX);
        assert_ne!(Facet::from_raw(Facet::Id(u64::MAX).as_raw()), Some(Facet::Unassigned));
    }

    #[test]
    fn test_hide_filtered_controls_visibility() {
        let board = board();
        let filter = FacetFilter {
            user: Some(Facet::Id(2)),
            category: None,
        };
        let mut visibility = filter_tasks(&board, &filter);

        // Filtered but not hidden: still shown
        assert!(visibility.is_filtered(1));
        assert!(visibility.is_visible(1));

        visibility.set_hide_filtered(true);
        assert!(!visibility.is_visible(1));
        assert!(visibility.is_visible(2));
        assert!(board.tasks().all(|task| visibility.flags(task.id).hide_filtered));
    }

    #[test]
    fn test_carry_hide_flags() {
        let board = board();
        let mut previous = filter_tasks(&board, &FacetFilter::default());
        previous.set_hide_filtered(true);

        let mut next = filter_tasks(
            &board,
            &FacetFilter {
                user: Some(Facet::Unassigned),
                category: None,
            },
        );
        next.carry_hide_flags(&previous);

        assert!(!next.is_visible(1));
        assert!(next.is_visible(3));
    }

    #[test]
    fn test_filter_options_sorted_by_name() {
        let options = FilterOptions::for_board(&board());

        assert_eq!(options.users[0].username, "alice");
        assert_eq!(options.categories[0].name, "Bug");
    }
}
