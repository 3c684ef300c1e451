use crate::adb::Device;
use crate::ui::ConsoleUi;
use colored::*;

/// One line of input in a browse session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Quit,
    Help,
    ToggleScope,
    Reload,
    ClearSearch,
    /// 1-based row of the currently shown list.
    Details(usize),
    Search(String),
}

pub struct Menu;

impl Menu {
    pub fn parse_index(input: &str) -> Option<usize> {
        let s = input.trim();
        if let Ok(n) = s.parse::<usize>() {
            if n > 0 {
                return Some(n);
            }
        }
        // Full-width digits, as typed by CJK input methods.
        let clean: String = s
            .chars()
            .map(|c| match c {
                '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
                _ => c,
            })
            .filter(|c| c.is_ascii_digit())
            .collect();
        match clean.parse::<usize>() {
            Ok(num) if num > 0 => Some(num),
            _ => None,
        }
    }

    pub fn parse_command(input: &str) -> BrowseCommand {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("q") {
            return BrowseCommand::Quit;
        }
        let Some(cmd) = trimmed.strip_prefix(':') else {
            return BrowseCommand::Search(trimmed.to_string());
        };
        match cmd.trim() {
            "u" => BrowseCommand::ToggleScope,
            "r" => BrowseCommand::Reload,
            "c" => BrowseCommand::ClearSearch,
            "q" => BrowseCommand::Quit,
            other => match Self::parse_index(other) {
                Some(n) => BrowseCommand::Details(n),
                None => BrowseCommand::Help,
            },
        }
    }

    pub fn render_browse_help() {
        println!(
            "\n{} {} {}",
            "===".bright_cyan(),
            "Browse".bright_white().bold(),
            "===".bright_cyan()
        );
        let items = [
            ("text", "search package and app names"),
            (":c", "clear search"),
            (":u", "toggle user apps only and reload"),
            (":r", "reload from device"),
            (":<n>", "show details of row n"),
            ("q", "quit"),
        ];
        for (k, label) in items {
            println!("  {:<6} {}", k.bright_cyan(), label);
        }
    }

    /// Asks the user to pick one of several devices. `None` if they quit.
    pub fn pick_device(devices: &[Device]) -> Option<&Device> {
        loop {
            println!("\nConnected devices:");
            ConsoleUi::render_device_table(devices);
            println!("Enter a number to select a device (q to quit, 1..{}):", devices.len());
            let input = ConsoleUi::read_line()?;
            if input.eq_ignore_ascii_case("q") {
                return None;
            }
            match Self::parse_index(&input) {
                Some(n) if n <= devices.len() => return devices.get(n - 1),
                _ => ConsoleUi::warn("Invalid input, try again"),
            }
        }
    }
}
