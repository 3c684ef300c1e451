use crate::adb::Device;
use crate::inventory::ApplicationRecord;
use colored::*;
use std::io::{self, Write};

pub struct ConsoleUi;

impl ConsoleUi {
    pub fn write_banner() {
        println!("{}\n", "appinv - installed app inventory".bright_white().bold());
    }

    /// `None` on end of input.
    pub fn read_line() -> Option<String> {
        let mut buf = String::new();
        print!("> ");
        let _ = io::stdout().flush();
        match io::stdin().read_line(&mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(buf.trim().to_string()),
        }
    }

    pub fn info(msg: &str) {
        println!("{} {}", "[INFO]".bright_blue(), msg);
    }

    pub fn warn(msg: &str) {
        println!("{} {}", "[WARN]".bright_yellow(), msg);
    }

    pub fn error(msg: &str) {
        eprintln!("{} {}", "[ERROR]".bright_red().bold(), msg);
    }

    pub fn success(msg: &str) {
        println!("{}", msg.bright_green());
    }

    pub fn render_device_table(devices: &[Device]) {
        if devices.is_empty() {
            Self::warn("No devices found");
            return;
        }

        let sep = "-".repeat(80);
        println!("{}", sep.bright_black());
        println!(
            "{:<4} {:<20} {:<30} {:<15}",
            "#".bright_cyan(),
            "Serial".bright_cyan(),
            "Device".bright_cyan(),
            "Android".bright_cyan()
        );
        println!("{}", sep.bright_black());

        for (idx, d) in devices.iter().enumerate() {
            let n = format!("{}", idx + 1).bright_white().bold();
            let s = d.serial.bright_white();
            let name = d.display_name().bright_green();
            let ver = d.android_version.as_deref().unwrap_or("Unknown");
            println!("{:<4} {:<20} {:<30} {:<15}", n, s, name, ver.bright_yellow());
        }

        println!("{}", sep.bright_black());
        println!();
    }

    pub fn render_app_table(apps: &[ApplicationRecord]) {
        if apps.is_empty() {
            Self::warn("No apps match");
            return;
        }

        let sep = "-".repeat(100);
        println!("{}", sep.bright_black());
        println!(
            "{:<5} {:<28} {:<42} {:<18} {:<6}",
            "#".bright_cyan(),
            "Name".bright_cyan(),
            "Package".bright_cyan(),
            "Version".bright_cyan(),
            "Type".bright_cyan()
        );
        println!("{}", sep.bright_black());

        for (idx, app) in apps.iter().enumerate() {
            let kind = if app.is_system_app {
                "system".bright_black()
            } else {
                "user".bright_green()
            };
            println!(
                "{:<5} {:<28} {:<42} {:<18} {:<6}",
                format!("{}", idx + 1).bright_white().bold(),
                truncate(&app.display_name, 28).bright_white(),
                truncate(&app.package_name, 42),
                truncate(&app.version_name, 18).bright_yellow(),
                kind
            );
        }

        println!("{}", sep.bright_black());
    }

    pub fn render_app_details(app: &ApplicationRecord) {
        let rows = [
            ("Name", app.display_name.clone()),
            ("Package", app.package_name.clone()),
            ("Version", format!("{} ({})", app.version_name, app.version_code)),
            ("Type", if app.is_system_app { "system" } else { "user" }.to_string()),
            ("Installed", app.installed_at()),
            ("Updated", app.updated_at()),
            ("MD5", app.md5_signature.clone()),
            ("SHA1", app.sha1_signature.clone()),
            ("SHA256", app.sha256_signature.clone()),
            ("Icon", if app.icon.is_placeholder() { "placeholder" } else { "loaded" }.to_string()),
        ];
        println!();
        for (k, v) in rows {
            println!("  {:<10} {}", k.bright_cyan(), v);
        }
        println!();
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}
