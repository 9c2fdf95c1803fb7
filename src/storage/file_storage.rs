use crate::{
    domain::{raw::coerce_id, Column, RawBoard, RawCategory, RawColumn, RawUser},
    error::{Result, TaskboardError},
    storage::BoardStore,
};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::debug;

/// File-based board store keeping every board in a single JSON document
pub struct FileBoardStore {
    root_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBoardStore {
    const DATA_DIR: &'static str = ".taskboard";
    const BOARDS_FILE: &'static str = "boards.json";

    /// Creates a new FileBoardStore for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
            write_lock: Mutex::new(()),
        }
    }

    fn boards_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the data directory and an empty board list
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        if !self.boards_file().exists() {
            self.write_boards(&[]).await?;
        }

        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.boards_file().exists()
    }

    /// Replaces the stored board list
    pub async fn save_boards(&self, boards: &[RawBoard]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_boards(boards).await
    }

    async fn write_boards(&self, boards: &[RawBoard]) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(boards)?;
        fs::write(self.boards_file(), json).await?;
        Ok(())
    }

    async fn read_boards(&self) -> Result<Vec<RawBoard>> {
        let boards_file = self.boards_file();

        if !boards_file.exists() {
            debug!(path = %boards_file.display(), "No boards stored yet");
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&boards_file).await?;
        let boards: Vec<RawBoard> = serde_json::from_str(&contents)?;
        Ok(boards)
    }
}

#[async_trait]
impl BoardStore for FileBoardStore {
    async fn fetch_boards(&self) -> Result<Vec<RawBoard>> {
        self.read_boards().await
    }

    async fn update_column(&self, column: &Column) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if !self.is_initialized().await {
            return Err(TaskboardError::StorageError(
                "Board store not initialized".to_string(),
            ));
        }

        let mut boards = self.read_boards().await?;

        let mut updated = RawColumn::from(column);
        restore_task_references(&boards, &mut updated);

        let slot = boards
            .iter_mut()
            .flat_map(|board| board.own_column.iter_mut())
            .find(|raw| coerce_id(&raw.id) == Some(column.id))
            .ok_or(TaskboardError::ColumnNotFound(column.id))?;
        *slot = updated;

        self.write_boards(&boards).await?;
        debug!(column_id = column.id, tasks = column.tasks.len(), "Column saved");
        Ok(())
    }
}

/// Puts back the stored user and category records the column's tasks refer to,
/// so their fields are written exactly as they were stored
fn restore_task_references(stored: &[RawBoard], column: &mut RawColumn) {
    for task in &mut column.own_task {
        for user in &mut task.assignees {
            if let Some(found) = find_user(stored, &user.id) {
                *user = found.clone();
            }
        }
        for category in &mut task.categories {
            if let Some(found) = find_category(stored, &category.id) {
                *category = found.clone();
            }
        }
    }
}

fn find_user<'a>(stored: &'a [RawBoard], id: &Value) -> Option<&'a RawUser> {
    let id = coerce_id(id)?;
    stored
        .iter()
        .flat_map(|board| {
            let assignees = board
                .own_column
                .iter()
                .flat_map(|column| column.own_task.iter())
                .flat_map(|task| task.assignees.iter());
            assignees.chain(board.shared_user.iter())
        })
        .find(|user| coerce_id(&user.id) == Some(id))
}

fn find_category<'a>(stored: &'a [RawBoard], id: &Value) -> Option<&'a RawCategory> {
    let id = coerce_id(id)?;
    stored
        .iter()
        .flat_map(|board| {
            let tagged = board
                .own_column
                .iter()
                .flat_map(|column| column.own_task.iter())
                .flat_map(|task| task.categories.iter());
            tagged.chain(board.own_category.iter())
        })
        .find(|category| coerce_id(&category.id) == Some(id))
}
