mod app_list;
mod state;

pub use app_list::{AppListStore, DEFAULT_SEARCH_DEBOUNCE};
pub use state::{AppListState, LoadState};
