mod browse;
mod console;
mod menu;

pub use browse::run_browse;
pub use console::ConsoleUi;
pub use menu::{BrowseCommand, Menu};
