use super::state::{AppListState, LoadState};
use crate::inventory::{filter, list_installed_apps, PackageRegistry, Scope};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

struct Inner {
    registry: Arc<dyn PackageRegistry>,
    state: watch::Sender<AppListState>,
    search_task: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
}

/// Holds the latest enumeration snapshot and its filtered view.
///
/// Clones share state. Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct AppListStore {
    inner: Arc<Inner>,
}
impl AppListStore {
    pub fn new(registry: Arc<dyn PackageRegistry>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(AppListState::default());
        Self {
            inner: Arc::new(Inner {
                registry,
                state,
                search_task: Mutex::new(None),
                debounce,
            }),
        }
    }
    pub fn subscribe(&self) -> watch::Receiver<AppListState> {
        self.inner.state.subscribe()
    }
    pub fn snapshot(&self) -> AppListState {
        self.inner.state.borrow().clone()
    }
    /// Starts an enumeration unless one is already pending, in which case `None` is returned.
    pub fn load(&self, scope: Scope) -> Option<JoinHandle<()>> {
        let started = self.inner.state.send_if_modified(|s| {
            if s.is_loading() {
                return false;
            }
            s.load = LoadState::Pending;
            true
        });
        if !started {
            debug!("load already in progress, ignoring");
            return None;
        }
        let inner = Arc::clone(&self.inner);
        let registry = Arc::clone(&inner.registry);
        let worker = tokio::spawn(async move { list_installed_apps(registry.as_ref(), scope).await });
        Some(tokio::spawn(async move {
            let result = worker.await;
            inner.state.send_modify(|s| {
                s.user_apps_only = scope.is_user_only();
                match result {
                    Ok(apps) => {
                        s.filtered_apps = filter(&apps, &s.search_query);
                        s.load = LoadState::Ok(apps.len());
                        s.all_apps = apps;
                    }
                    Err(e) => {
                        error!("app enumeration task failed: {}", e);
                        s.load = LoadState::Err(e.to_string());
                    }
                }
            });
        }))
    }
    /// Re-runs the last load with the scope it used.
    pub fn reload(&self) -> Option<JoinHandle<()>> {
        let scope = Scope::from_user_only(self.inner.state.borrow().user_apps_only);
        self.load(scope)
    }
    /// Records `query` now and re-filters after the debounce delay; a newer query
    /// cancels any filter still waiting.
    pub fn update_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.inner.state.send_modify(|s| s.search_query = query.clone());
        let mut slot = self
            .inner
            .search_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(prev) = slot.take() {
            prev.abort();
        }
        let inner = Arc::clone(&self.inner);
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            inner.state.send_modify(|s| {
                s.filtered_apps = filter(&s.all_apps, &query);
            });
        }));
    }
    pub fn clear_search(&self) {
        self.update_search_query("");
    }
    /// Waits for a pending debounced filter, if any, to apply.
    pub async fn settle_search(&self) {
        let pending = self
            .inner
            .search_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(task) = pending {
            // A cancelled task was superseded; nothing to wait for.
            let _ = task.await;
        }
    }
}
