use crate::domain::User;
use crate::session::{BoardUpdate, Strings};
use crate::storage::BoardStore;
use crate::view::BoardViewEvent;
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, warn, Instrument};

/// Upstream channels the board screen listens to
pub struct ViewSources {
    pub strings: watch::Receiver<Strings>,
    pub user: watch::Receiver<Option<User>>,
    /// Raw `id` route parameter
    pub route: watch::Receiver<Option<String>>,
    pub active_board: broadcast::Receiver<BoardUpdate>,
    pub store: Arc<dyn BoardStore>,
}

/// Forwarders from every upstream channel into the view's event queue.
///
/// All forwarders are released together when this guard is dropped.
pub struct Subscriptions {
    handles: Vec<JoinHandle<()>>,
}

impl Subscriptions {
    pub fn attach(sources: ViewSources, events: mpsc::Sender<BoardViewEvent>) -> Self {
        let ViewSources {
            strings,
            user,
            route,
            active_board,
            store,
        } = sources;

        let handles = vec![
            forward_watch(strings, events.clone(), BoardViewEvent::StringsChanged),
            fetch_boards(store, events.clone()),
            forward_active_board(active_board, events.clone()),
            forward_watch(user, events.clone(), BoardViewEvent::UserChanged),
            forward_watch(route, events, BoardViewEvent::RouteChanged),
        ];
        debug!(count = handles.len(), "Board view subscribed");

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn unsubscribe_all(&mut self) {
        if self.handles.is_empty() {
            return;
        }

        debug!(count = self.handles.len(), "Board view unsubscribed");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

/// Sends the current value, then every change, until either side goes away
fn forward_watch<T, F>(
    mut source: watch::Receiver<T>,
    events: mpsc::Sender<BoardViewEvent>,
    wrap: F,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> BoardViewEvent + Send + 'static,
{
    tokio::spawn(
        async move {
            loop {
                let value = T::clone(&source.borrow_and_update());
                if events.send(wrap(value)).await.is_err() {
                    break;
                }
                if source.changed().await.is_err() {
                    break;
                }
            }
        }
        .in_current_span(),
    )
}

fn forward_active_board(
    mut source: broadcast::Receiver<BoardUpdate>,
    events: mpsc::Sender<BoardViewEvent>,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            loop {
                match source.recv().await {
                    Ok(update) => {
                        if events
                            .send(BoardViewEvent::ActiveBoardChanged(update))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Active board updates skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        .in_current_span(),
    )
}

/// A failed fetch leaves the view loading
fn fetch_boards(store: Arc<dyn BoardStore>, events: mpsc::Sender<BoardViewEvent>) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            match store.fetch_boards().await {
                Ok(boards) => {
                    let _ = events.send(BoardViewEvent::BoardsFetched(boards)).await;
                }
                Err(err) => error!(error = %err, "Failed to fetch boards"),
            }
        }
        .in_current_span(),
    )
}
