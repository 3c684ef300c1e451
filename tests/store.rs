mod common;

use appinv::inventory::Scope;
use appinv::store::{AppListStore, LoadState, DEFAULT_SEARCH_DEBOUNCE};
use common::{entry, FakeRegistry};
use std::sync::Arc;
use std::time::Duration;

fn store_with(registry: FakeRegistry) -> AppListStore {
    AppListStore::new(Arc::new(registry), DEFAULT_SEARCH_DEBOUNCE)
}

fn sample() -> FakeRegistry {
    FakeRegistry::with(vec![
        entry("com.android.chrome", "Chrome", true),
        entry("org.telegram.messenger", "Telegram", false),
        entry("com.whatsapp", "WhatsApp", false),
    ])
}

fn shown(store: &AppListStore) -> Vec<String> {
    store
        .snapshot()
        .filtered_apps
        .into_iter()
        .map(|a| a.display_name)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn load_populates_snapshot() {
    let store = store_with(sample());
    assert_eq!(store.snapshot().load, LoadState::Uninitialized);
    store.load(Scope::All).unwrap().await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.load, LoadState::Ok(3));
    assert_eq!(state.total_count(), 3);
    assert_eq!(shown(&store), vec!["Chrome", "Telegram", "WhatsApp"]);
    assert_eq!(state.count_text(), "All apps: 3");
}

#[tokio::test(start_paused = true)]
async fn overlapping_load_is_ignored() {
    let registry = FakeRegistry {
        delay: Some(Duration::from_secs(2)),
        ..sample()
    };
    let store = store_with(registry);
    let first = store.load(Scope::All).expect("first load starts");
    assert!(store.snapshot().is_loading());
    assert!(store.load(Scope::UserOnly).is_none());
    first.await.unwrap();
    let state = store.snapshot();
    assert!(!state.user_apps_only);
    assert_eq!(state.load, LoadState::Ok(3));
    assert!(store.load(Scope::UserOnly).is_some());
}

#[tokio::test(start_paused = true)]
async fn user_scope_is_remembered_for_reload() {
    let store = store_with(sample());
    store.load(Scope::UserOnly).unwrap().await.unwrap();
    assert_eq!(shown(&store), vec!["Telegram", "WhatsApp"]);
    assert_eq!(store.snapshot().count_text(), "User apps: 2");
    store.reload().unwrap().await.unwrap();
    assert!(store.snapshot().user_apps_only);
    assert_eq!(store.snapshot().total_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn search_is_debounced_and_last_query_wins() {
    let store = store_with(sample());
    store.load(Scope::All).unwrap().await.unwrap();

    store.update_search_query("tele");
    assert_eq!(store.snapshot().search_query, "tele");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(shown(&store).len(), 3, "filter must wait for the debounce delay");

    store.update_search_query("whats");
    tokio::time::sleep(Duration::from_millis(250)).await;
    // 350ms after the first query, but it was superseded.
    assert_eq!(shown(&store).len(), 3);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(shown(&store), vec!["WhatsApp"]);
    assert_eq!(store.snapshot().count_text(), "All apps: 1 / 3");
}

#[tokio::test(start_paused = true)]
async fn settle_search_waits_for_pending_filter() {
    let store = store_with(sample());
    store.load(Scope::All).unwrap().await.unwrap();
    store.update_search_query("COM.");
    store.settle_search().await;
    assert_eq!(shown(&store), vec!["Chrome", "WhatsApp"]);
    store.clear_search();
    store.settle_search().await;
    assert_eq!(shown(&store).len(), 3);
    assert_eq!(store.snapshot().search_query, "");
}

#[tokio::test(start_paused = true)]
async fn load_applies_current_query() {
    let store = store_with(sample());
    store.update_search_query("gram");
    store.settle_search().await;
    assert!(shown(&store).is_empty());
    store.load(Scope::All).unwrap().await.unwrap();
    assert_eq!(shown(&store), vec!["Telegram"]);
}

#[tokio::test(start_paused = true)]
async fn failed_registry_loads_empty_snapshot() {
    let registry = FakeRegistry {
        deny: true,
        ..sample()
    };
    let store = store_with(registry);
    store.load(Scope::All).unwrap().await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.load, LoadState::Ok(0));
    assert!(state.all_apps.is_empty());
    assert!(state.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_completed_load() {
    let store = store_with(sample());
    let mut rx = store.subscribe();
    store.load(Scope::All);
    let state = rx.wait_for(|s| !s.is_loading() && s.total_count() > 0).await.unwrap().clone();
    assert_eq!(state.load, LoadState::Ok(3));
}
