use crate::inventory::Scope;
use crate::store::{AppListState, AppListStore};
use crate::ui::{BrowseCommand, ConsoleUi, Menu};
use colored::*;

/// Interactive search over one device's app list. Returns when the user quits or input ends.
pub async fn run_browse(store: &AppListStore, scope: Scope) -> anyhow::Result<()> {
    Menu::render_browse_help();
    load_and_wait(store, scope).await?;
    render(&store.snapshot());
    loop {
        let Some(input) = tokio::task::spawn_blocking(ConsoleUi::read_line).await? else {
            return Ok(());
        };
        match Menu::parse_command(&input) {
            BrowseCommand::Quit => return Ok(()),
            BrowseCommand::Help => Menu::render_browse_help(),
            BrowseCommand::ToggleScope => {
                let next = Scope::from_user_only(!store.snapshot().user_apps_only);
                load_and_wait(store, next).await?;
                render(&store.snapshot());
            }
            BrowseCommand::Reload => {
                let scope = Scope::from_user_only(store.snapshot().user_apps_only);
                load_and_wait(store, scope).await?;
                render(&store.snapshot());
            }
            BrowseCommand::ClearSearch => {
                store.clear_search();
                store.settle_search().await;
                render(&store.snapshot());
            }
            BrowseCommand::Details(n) => match store.snapshot().filtered_apps.get(n - 1) {
                Some(app) => ConsoleUi::render_app_details(app),
                None => ConsoleUi::warn(&format!("No row {}", n)),
            },
            BrowseCommand::Search(query) => {
                store.update_search_query(query);
                store.settle_search().await;
                render(&store.snapshot());
            }
        }
    }
}

async fn load_and_wait(store: &AppListStore, scope: Scope) -> anyhow::Result<()> {
    let mut rx = store.subscribe();
    if store.load(scope).is_some() {
        ConsoleUi::info("Loading installed apps...");
    }
    rx.wait_for(|s| !s.is_loading()).await?;
    if let Some(e) = store.snapshot().error() {
        ConsoleUi::error(&format!("Loading failed: {}", e));
    }
    Ok(())
}

fn render(state: &AppListState) {
    ConsoleUi::render_app_table(&state.filtered_apps);
    let query = if state.search_query.is_empty() {
        String::new()
    } else {
        format!("  search: {:?}", state.search_query)
    };
    println!("{}{}", state.count_text().bright_white().bold(), query.bright_black());
}
