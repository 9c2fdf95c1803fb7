//! The board screen: which board is shown, how its tasks are filtered, and
//! what happens when a task is dropped on a new spot.
//!
//! [`BoardView`] holds the state a renderer binds to. It reacts to one
//! [`BoardViewEvent`] at a time; [`subscriptions::Subscriptions`] feeds it from
//! the upstream channels.

use crate::config::BoardViewConfig;
use crate::domain::{
    coerce_number, filter_tasks, load_active_boards, renumber_columns, Board, DropEvent, Facet,
    FacetFilter, FilterOptions, RawBoard, TaskVisibility, User,
};
use crate::error::{Result, TaskboardError};
use crate::session::{ActiveBoardHub, BoardUpdate, Navigator, Strings};
use crate::storage::BoardStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn, Instrument};

pub mod subscriptions;

pub use subscriptions::{Subscriptions, ViewSources};

const BOARDS_KEY: &str = "boards";
const NO_BOARDS_USER_KEY: &str = "boards_noBoardsMessageUser";
const NO_BOARDS_ADMIN_KEY: &str = "boards_noBoardsMessageAdmin";

/// Collaborators of the board screen, created once per application session
#[derive(Clone)]
pub struct BoardViewDeps {
    pub store: Arc<dyn BoardStore>,
    pub hub: ActiveBoardHub,
    pub navigator: Arc<dyn Navigator>,
}

/// Everything the board screen reacts to
#[derive(Debug, Clone)]
pub enum BoardViewEvent {
    StringsChanged(Strings),
    BoardsFetched(Vec<RawBoard>),
    ActiveBoardChanged(BoardUpdate),
    UserChanged(Option<User>),
    /// Raw `id` route parameter
    RouteChanged(Option<String>),
    UserFilterChanged(Option<Facet>),
    CategoryFilterChanged(Option<Facet>),
    HideFilteredChanged(bool),
    TaskDropped(DropEvent),
}

/// State of the board screen
pub struct BoardView {
    config: BoardViewConfig,
    deps: BoardViewDeps,
    /// Publisher id of this view on the hub
    origin: u64,
    strings: Strings,
    no_boards_message: String,
    hide_filtered: bool,
    filter: FacetFilter,
    board_nav_id: Option<i64>,
    active_user: Option<User>,
    active_board: Option<Board>,
    boards: Vec<Board>,
    visibility: TaskVisibility,
    page_name: String,
    title: String,
    loading: bool,
}

impl BoardView {
    pub fn new(config: BoardViewConfig, strings: Strings, deps: BoardViewDeps) -> Self {
        let title = config.title_for("Kanban App");
        let page_name = strings.get(BOARDS_KEY).to_string();
        let no_boards_message = strings.get(NO_BOARDS_USER_KEY).to_string();
        let origin = deps.hub.register();

        Self {
            config,
            deps,
            origin,
            strings,
            no_boards_message,
            hide_filtered: false,
            filter: FacetFilter::default(),
            board_nav_id: None,
            active_user: None,
            active_board: None,
            boards: Vec::new(),
            visibility: TaskVisibility::default(),
            page_name,
            title,
            loading: true,
        }
    }

    /// Processes events until every sender is gone, then hands the view back
    pub async fn run(mut self, mut events: mpsc::Receiver<BoardViewEvent>) -> Self {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!("Board view event queue closed");
        self
    }

    pub fn handle(&mut self, event: BoardViewEvent) {
        match event {
            BoardViewEvent::StringsChanged(strings) => self.on_strings_changed(strings),
            BoardViewEvent::BoardsFetched(boards) => self.on_boards_fetched(&boards),
            BoardViewEvent::ActiveBoardChanged(update) => self.on_active_board_changed(update),
            BoardViewEvent::UserChanged(user) => self.on_user_changed(user),
            BoardViewEvent::RouteChanged(id) => self.on_route_changed(id.as_deref()),
            BoardViewEvent::UserFilterChanged(facet) => self.set_user_filter(facet),
            BoardViewEvent::CategoryFilterChanged(facet) => self.set_category_filter(facet),
            BoardViewEvent::HideFilteredChanged(hide) => self.set_hide_filtered(hide),
            BoardViewEvent::TaskDropped(event) => {
                // Persistence runs on its own; failures are logged by the task
                self.on_task_dropped(event);
            }
        }
    }

    pub fn on_strings_changed(&mut self, strings: Strings) {
        self.strings = strings;

        if let Some(user) = self.active_user.clone() {
            self.update_active_user(user);
        }
    }

    pub fn on_boards_fetched(&mut self, raw_boards: &[RawBoard]) {
        self.boards.clear();
        self.update_boards_list(raw_boards);
        self.loading = false;
    }

    /// A board was published by another screen.
    ///
    /// Updates this view published itself were already applied when it sent
    /// them. A newer copy of the board already shown replaces it and keeps the
    /// filters; any other board is shown with the filters cleared.
    pub fn on_active_board_changed(&mut self, update: BoardUpdate) {
        let BoardUpdate { origin, board } = update;
        if origin == self.origin {
            debug!(board_id = board.id, "Own active board update ignored");
            return;
        }

        if let Some(listed) = self.boards.iter_mut().find(|listed| listed.id == board.id) {
            *listed = board.clone();
        }

        let showing = self.active_board.as_ref().is_some_and(|active| active.id == board.id);
        if showing {
            self.active_board = Some(board);
            self.filter_tasks();
        } else {
            self.show_board(board);
        }
    }

    pub fn on_user_changed(&mut self, user: Option<User>) {
        if let Some(user) = user {
            self.update_active_user(user);
        }
    }

    /// Zero, empty or non-numeric ids mean no board is requested.
    ///
    /// Integral decimals such as `"5.0"` name board 5. A negative id matches
    /// no board, so the previous one stays shown.
    pub fn on_route_changed(&mut self, id: Option<&str>) {
        self.board_nav_id = id
            .and_then(|id| coerce_number(&Value::String(id.to_string())))
            .filter(|id| *id != 0);
        self.update_active_board();
    }

    /// Sends the user to their default board when the route named none
    pub fn init(&mut self) {
        if self.board_nav_id.is_some() {
            return;
        }

        if let Some(default_board_id) = self.active_user.as_ref().and_then(|u| u.default_board_id) {
            self.board_nav_id = i64::try_from(default_board_id).ok();
            self.go_to_board();
        }
    }

    pub fn go_to_board(&self) {
        let Some(board_id) = self.board_nav_id else {
            return;
        };

        let route = self.config.board_route(board_id);
        info!(board_id, route = %route, "Navigating to board");
        self.deps.navigator.navigate(&route);
    }

    /// Selects the board to navigate to, e.g. from the board picker
    pub fn set_board_nav_id(&mut self, board_id: Option<u64>) {
        self.board_nav_id = board_id.and_then(|id| i64::try_from(id).ok());
    }

    /// Rebuilds the board list from raw records and resolves the active board
    pub fn update_boards_list(&mut self, raw_boards: &[RawBoard]) {
        self.boards = load_active_boards(raw_boards);
        debug!(
            received = raw_boards.len(),
            active = self.boards.len(),
            "Board list updated"
        );
        self.update_active_board();
    }

    /// Activates the board matching the navigation id and publishes it.
    ///
    /// Without a navigation id no board is active. When no board matches, the
    /// previous active board stays.
    pub fn update_active_board(&mut self) {
        let Some(nav_id) = self.board_nav_id else {
            self.active_board = None;
            return;
        };

        let Some(board) = self
            .boards
            .iter()
            .find(|board| i64::try_from(board.id) == Ok(nav_id))
            .cloned()
        else {
            debug!(board_id = nav_id, "No loaded board matches navigation id");
            return;
        };

        self.page_name = board.name.clone();
        self.show_board(board.clone());
        self.deps.hub.publish(self.origin, board);
    }

    /// Shows a board with the window title set and the filters cleared
    fn show_board(&mut self, board: Board) {
        self.title = self.config.title_for(&board.name);
        self.active_board = Some(board);
        self.filter.clear();
        self.visibility = TaskVisibility::default();
    }

    pub fn set_user_filter(&mut self, facet: Option<Facet>) {
        self.filter.user = facet;
        self.filter_tasks();
    }

    pub fn set_category_filter(&mut self, facet: Option<Facet>) {
        self.filter.category = facet;
        self.filter_tasks();
    }

    /// Recomputes which tasks of the active board fail the facet filters
    pub fn filter_tasks(&mut self) {
        let Some(board) = &self.active_board else {
            return;
        };

        let mut visibility = filter_tasks(board, &self.filter);
        visibility.carry_hide_flags(&self.visibility);
        debug!(
            board_id = board.id,
            filtered = visibility.filtered_count(),
            "Tasks filtered"
        );
        self.visibility = visibility;
    }

    pub fn set_hide_filtered(&mut self, hide: bool) {
        self.hide_filtered = hide;
        self.toggle_filtered();
    }

    /// Pushes the hide-filtered setting to every task
    pub fn toggle_filtered(&mut self) {
        if self.visibility.is_empty() {
            if let Some(board) = &self.active_board {
                self.visibility = filter_tasks(board, &self.filter);
            }
        }
        self.visibility.set_hide_filtered(self.hide_filtered);
    }

    /// Renumbers the columns a drop touched, republishes the board and saves
    /// each column in the background.
    ///
    /// The returned handles may be ignored; a failed save is logged. Outside a
    /// tokio runtime the reorder still applies but nothing is saved.
    pub fn on_task_dropped(&mut self, event: DropEvent) -> Vec<JoinHandle<Result<()>>> {
        let Some(board) = self.active_board.as_mut() else {
            warn!(task_id = event.task_id, "Task dropped with no active board");
            return Vec::new();
        };

        let columns = renumber_columns(board, &event);
        let board_id = board.id;
        let snapshot = board.clone();
        if let Some(listed) = self.boards.iter_mut().find(|board| board.id == board_id) {
            *listed = snapshot.clone();
        }
        self.deps.hub.publish(self.origin, snapshot);

        let Ok(runtime) = Handle::try_current() else {
            warn!(
                board_id,
                columns = columns.len(),
                "No async runtime, reordered columns not saved"
            );
            return Vec::new();
        };

        columns
            .into_iter()
            .map(|column| {
                let store = Arc::clone(&self.deps.store);
                runtime.spawn(
                    async move {
                        let result = store.update_column(&column).await;
                        if let Err(err) = &result {
                            warn!(column_id = column.id, error = %err, "Failed to save column");
                        }
                        result
                    }
                    .in_current_span(),
                )
            })
            .collect()
    }

    /// Moves a task on the active board and handles the resulting drop
    pub fn drop_task(
        &mut self,
        task_id: u64,
        to_column_id: u64,
        index: usize,
    ) -> Result<Vec<JoinHandle<Result<()>>>> {
        let board = self
            .active_board
            .as_mut()
            .ok_or(TaskboardError::NoActiveBoard)?;

        let event = board.move_task(task_id, to_column_id, index)?;
        Ok(self.on_task_dropped(event))
    }

    /// True once loading finished and there is nothing to show
    pub fn no_boards(&self) -> bool {
        !self.loading && self.boards.is_empty()
    }

    pub fn filter_options(&self) -> Option<FilterOptions> {
        self.active_board.as_ref().map(FilterOptions::for_board)
    }

    pub fn is_drag_handle<'a, I>(&self, classes: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        crate::domain::is_drag_handle(classes, &self.config.drag_handle_class)
    }

    fn update_active_user(&mut self, user: User) {
        let key = if user.is_admin() {
            NO_BOARDS_ADMIN_KEY
        } else {
            NO_BOARDS_USER_KEY
        };
        self.no_boards_message = self.strings.get(key).to_string();
        self.active_user = Some(user);
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn active_board(&self) -> Option<&Board> {
        self.active_board.as_ref()
    }

    pub fn active_user(&self) -> Option<&User> {
        self.active_user.as_ref()
    }

    pub fn board_nav_id(&self) -> Option<i64> {
        self.board_nav_id
    }

    pub fn filter(&self) -> &FacetFilter {
        &self.filter
    }

    pub fn visibility(&self) -> &TaskVisibility {
        &self.visibility
    }

    pub fn hide_filtered(&self) -> bool {
        self.hide_filtered
    }

    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn no_boards_message(&self) -> &str {
        &self.no_boards_message
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
