use super::models::ApplicationRecord;

/// Apps whose package or display name contains `query`, ignoring case. Order is kept.
pub fn filter(records: &[ApplicationRecord], query: &str) -> Vec<ApplicationRecord> {
    if query.is_empty() {
        return records.to_vec();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|app| matches(app, &needle))
        .cloned()
        .collect()
}

fn matches(app: &ApplicationRecord, lowered_query: &str) -> bool {
    app.package_name.to_lowercase().contains(lowered_query)
        || app.display_name.to_lowercase().contains(lowered_query)
}
