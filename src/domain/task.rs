use crate::domain::raw::{coerce_id, coerce_number, RawCategory, RawTask};
use crate::domain::user::User;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A category tasks can be tagged with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_task_color: Option<String>,
}

impl Category {
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            default_task_color: None,
        }
    }

    pub fn from_raw(raw: &RawCategory) -> Option<Self> {
        let Some(id) = coerce_id(&raw.id) else {
            warn!(id = %raw.id, "Skipping category record with non-numeric id");
            return None;
        };

        Some(Self {
            id,
            name: raw.name.clone(),
            default_task_color: raw.default_task_color.clone(),
        })
    }
}

impl From<&Category> for RawCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: Value::from(category.id),
            name: category.name.clone(),
            default_task_color: category.default_task_color.clone(),
            extra: Map::new(),
        }
    }
}

/// A kanban task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub column_id: u64,
    pub position: i64,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Record fields this crate does not interpret, written back as they came
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Creates a new task in the given column
    pub fn new(id: u64, title: String, column_id: u64, position: i64) -> Self {
        Self {
            id,
            title,
            description: None,
            color: None,
            column_id,
            position,
            assignees: Vec::new(),
            categories: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Builds a task from a raw record found in `owner_column_id`.
    ///
    /// A task whose own `column_id` is not a number takes the owning column's id;
    /// a non-numeric position becomes 0.
    pub fn from_raw(raw: &RawTask, owner_column_id: u64) -> Option<Self> {
        let Some(id) = coerce_id(&raw.id) else {
            warn!(id = %raw.id, column_id = owner_column_id, "Skipping task record with non-numeric id");
            return None;
        };

        Some(Self {
            id,
            title: raw.title.clone(),
            description: raw.description.clone(),
            color: raw.color.clone(),
            column_id: coerce_id(&raw.column_id).unwrap_or(owner_column_id),
            position: coerce_number(&raw.position).unwrap_or_default(),
            assignees: raw.assignees.iter().filter_map(User::from_raw).collect(),
            categories: raw.categories.iter().filter_map(Category::from_raw).collect(),
            extra: raw.extra.clone(),
        })
    }

    pub fn with_assignee(mut self, user: User) -> Self {
        self.assignees.push(user);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn is_assigned_to(&self, user_id: u64) -> bool {
        self.assignees.iter().any(|user| user.id == user_id)
    }

    pub fn has_category(&self, category_id: u64) -> bool {
        self.categories.iter().any(|cat| cat.id == category_id)
    }
}

impl From<&Task> for RawTask {
    fn from(task: &Task) -> Self {
        Self {
            id: Value::from(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            color: task.color.clone(),
            column_id: Value::from(task.column_id),
            position: Value::from(task.position),
            assignees: task.assignees.iter().map(Into::into).collect(),
            categories: task.categories.iter().map(Into::into).collect(),
            extra: task.extra.clone(),
        }
    }
}
