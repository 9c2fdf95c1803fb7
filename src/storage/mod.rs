use crate::{
    domain::{Column, RawBoard},
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;

pub use file_storage::FileBoardStore;

/// Board data source for the board screen
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Fetches every board the signed-in user can see, active or not
    async fn fetch_boards(&self) -> Result<Vec<RawBoard>>;

    /// Persists a column together with its tasks' positions
    async fn update_column(&self, column: &Column) -> Result<()>;
}
