use crate::inventory::ApplicationRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Uninitialized,
    Pending,
    /// Number of apps in the completed snapshot.
    Ok(usize),
    Err(String),
}

#[derive(Debug, Clone, Default)]
pub struct AppListState {
    pub all_apps: Vec<ApplicationRecord>,
    pub filtered_apps: Vec<ApplicationRecord>,
    pub search_query: String,
    pub user_apps_only: bool,
    pub load: LoadState,
}
impl AppListState {
    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Pending)
    }
    pub fn displayed_count(&self) -> usize {
        self.filtered_apps.len()
    }
    pub fn total_count(&self) -> usize {
        self.all_apps.len()
    }
    pub fn error(&self) -> Option<&str> {
        match &self.load {
            LoadState::Err(e) => Some(e),
            _ => None,
        }
    }
    pub fn count_text(&self) -> String {
        let kind = if self.user_apps_only { "User apps" } else { "All apps" };
        if self.displayed_count() == self.total_count() {
            format!("{}: {}", kind, self.total_count())
        } else {
            format!("{}: {} / {}", kind, self.displayed_count(), self.total_count())
        }
    }
}
