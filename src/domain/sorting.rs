use crate::domain::board::Column;
use crate::domain::task::{Category, Task};
use crate::domain::user::User;

/// Items with a display position inside their container
pub trait Positioned {
    fn position(&self) -> i64;
}

impl Positioned for Column {
    fn position(&self) -> i64 {
        self.position
    }
}

impl Positioned for Task {
    fn position(&self) -> i64 {
        self.position
    }
}

/// Sorts items ascending by position.
///
/// The sort is stable, so items sharing a position keep their relative order.
///
/// # Examples
/// ```
/// use taskboard_core::domain::sorting::sort_by_position;
/// use taskboard_core::domain::task::Task;
///
/// let mut tasks = vec![
///     Task::new(1, "C".to_string(), 1, 3),
///     Task::new(2, "A".to_string(), 1, 1),
///     Task::new(3, "B".to_string(), 1, 2),
/// ];
///
/// sort_by_position(&mut tasks);
/// assert_eq!(tasks[0].title, "A");
/// ```
pub fn sort_by_position<T: Positioned>(items: &mut [T]) {
    items.sort_by_key(|item| item.position());
}

/// Sorts users by username, ignoring case
pub fn sort_users_by_name(users: &mut [User]) {
    users.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));
}

/// Sorts categories by name, ignoring case
pub fn sort_categories_by_name(categories: &mut [Category]) {
    categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_columns_by_position() {
        let mut columns = vec![
            Column::new(1, "Done".to_string(), 3),
            Column::new(2, "Todo".to_string(), 1),
            Column::new(3, "Doing".to_string(), 2),
        ];

        sort_by_position(&mut columns);

        assert_eq!(columns[0].name, "Todo");
        assert_eq!(columns[1].name, "Doing");
        assert_eq!(columns[2].name, "Done");
    }

    #[test]
    fn test_sort_by_position_is_stable() {
        let mut tasks = vec![
            Task::new(1, "First".to_string(), 1, 2),
            Task::new(2, "Second".to_string(), 1, 1),
            Task::new(3, "Third".to_string(), 1, 2),
        ];

        sort_by_position(&mut tasks);

        assert_eq!(tasks[0].id, 2);
        assert_eq!(tasks[1].id, 1);
        assert_eq!(tasks[2].id, 3);
    }

    #[test]
    fn test_sort_by_position_numeric_not_lexical() {
        let mut tasks = vec![
            Task::new(1, "Ten".to_string(), 1, 10),
            Task::new(2, "Two".to_string(), 1, 2),
        ];

        sort_by_position(&mut tasks);

        assert_eq!(tasks[0].title, "Two");
    }

    #[test]
    fn test_sort_users_case_insensitive() {
        let mut users = vec![
            User::new(1, "zed".to_string()),
            User::new(2, "Alice".to_string()),
            User::new(3, "bob".to_string()),
        ];

        sort_users_by_name(&mut users);

        assert_eq!(users[0].username, "Alice");
        assert_eq!(users[1].username, "bob");
        assert_eq!(users[2].username, "zed");
    }

    #[test]
    fn test_sort_categories_case_insensitive() {
        let mut categories = vec![
            Category::new(1, "ux".to_string()),
            Category::new(2, "Bug".to_string()),
        ];

        sort_categories_by_name(&mut categories);

        assert_eq!(categories[0].name, "Bug");
    }
}
