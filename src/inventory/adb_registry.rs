use super::apk;
use super::models::{IconSource, PackageEntry};
use super::registry::PackageRegistry;
use crate::adb::AdbClient;
use crate::core::{AdbError, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, TimeZone};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

const DUMPSYS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct AdbRegistryOptions {
    pub fetch_certificates: bool,
    pub fetch_concurrency: usize,
}
impl Default for AdbRegistryOptions {
    fn default() -> Self {
        Self {
            fetch_certificates: false,
            fetch_concurrency: 4,
        }
    }
}

/// Package registry of a device reached through adb.
pub struct AdbRegistry {
    client: AdbClient,
    serial: String,
    options: AdbRegistryOptions,
}
impl AdbRegistry {
    pub fn new(client: AdbClient, serial: impl Into<String>, options: AdbRegistryOptions) -> Self {
        Self {
            client,
            serial: serial.into(),
            options,
        }
    }
    async fn base_apk_path(&self, package: &str) -> Result<String> {
        let output = self.client.shell(&self.serial, &["pm", "path", package]).await?;
        let paths: Vec<&str> = output
            .lines()
            .filter_map(|l| l.trim().strip_prefix("package:"))
            .collect();
        paths
            .iter()
            .find(|p| p.ends_with("/base.apk"))
            .or_else(|| paths.first())
            .map(|p| p.to_string())
            .ok_or_else(|| AdbError::Parse(format!("no apk path for {}", package)))
    }
    async fn attach_apk_contents(&self, mut entry: PackageEntry) -> PackageEntry {
        let fetched = async {
            let path = self.base_apk_path(&entry.package_name).await?;
            let bytes = self.client.read_device_file(&self.serial, &path).await?;
            apk::inspect(&bytes)
        }
        .await;
        match fetched {
            Ok(contents) => {
                entry.certificates = contents.certificates;
                if let Some(icon) = contents.icon {
                    entry.icon = IconSource::Inline(icon);
                }
            }
            Err(e) => debug!("Failed to get signatures for {}: {}", entry.package_name, e),
        }
        entry
    }
}
#[async_trait]
impl PackageRegistry for AdbRegistry {
    async fn installed_packages(&self) -> Result<Vec<Result<PackageEntry>>> {
        let output = self
            .client
            .shell(&self.serial, &["dumpsys", "package", "packages"])
            .await?;
        if output.contains("Permission Denial") {
            return Err(AdbError::PermissionDenied(
                output.lines().next().unwrap_or_default().trim().to_string(),
            ));
        }
        let entries = parse_dumpsys_packages(&output);
        debug!(serial = %self.serial, count = entries.len(), "parsed dumpsys packages");
        if !self.options.fetch_certificates {
            return Ok(entries);
        }
        let concurrency = self.options.fetch_concurrency.max(1);
        let enriched: Vec<Result<PackageEntry>> = stream::iter(entries)
            .map(|entry| async move {
                match entry {
                    Ok(e) => Ok(self.attach_apk_contents(e).await),
                    Err(e) => Err(e),
                }
            })
            .buffered(concurrency)
            .collect()
            .await;
        Ok(enriched)
    }
}

/// Splits `dumpsys package packages` output into one entry per `Package [..]` block.
///
/// Only the top-level `Packages:` section is read; `Hidden system packages:` and
/// later sections repeat names and are ignored.
pub fn parse_dumpsys_packages(output: &str) -> Vec<Result<PackageEntry>> {
    let mut entries = Vec::new();
    let mut in_section = false;
    let mut current: Option<(String, Vec<&str>)> = None;
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            in_section = line.trim_end() == "Packages:";
            if let Some((name, lines)) = current.take() {
                entries.push(parse_package_block(&name, &lines));
            }
            continue;
        }
        if !in_section {
            continue;
        }
        let trimmed = line.trim();
        if let Some(name) = package_header(trimmed) {
            if let Some((prev, lines)) = current.take() {
                entries.push(parse_package_block(&prev, &lines));
            }
            current = Some((name.to_string(), Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(trimmed);
        }
    }
    if let Some((name, lines)) = current.take() {
        entries.push(parse_package_block(&name, &lines));
    }
    entries
}

fn package_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Package [")?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

fn parse_package_block(name: &str, lines: &[&str]) -> Result<PackageEntry> {
    if name.trim().is_empty() {
        return Err(AdbError::malformed("<unnamed>", "empty package name"));
    }
    let mut entry = PackageEntry::new(name);
    let mut version_code = None;
    let mut first_install = None;
    let mut last_update = None;
    for line in lines {
        if let Some(v) = line.strip_prefix("versionCode=") {
            if version_code.is_none() {
                let raw = v.split_whitespace().next().unwrap_or_default();
                version_code = Some(raw.parse::<i64>().map_err(|_| {
                    AdbError::malformed(name, format!("bad versionCode {:?}", raw))
                })?);
            }
        } else if let Some(v) = line.strip_prefix("versionName=") {
            if entry.version_name.is_none() && !v.is_empty() && v != "null" {
                entry.version_name = Some(v.to_string());
            }
        } else if let Some(v) = line.strip_prefix("firstInstallTime=") {
            first_install.get_or_insert_with(|| parse_dumpsys_time(v));
        } else if let Some(v) = line.strip_prefix("lastUpdateTime=") {
            last_update.get_or_insert_with(|| parse_dumpsys_time(v));
        } else if line.starts_with("flags=[") || line.starts_with("pkgFlags=[") {
            entry.is_system |= line.split_whitespace().any(|f| f == "SYSTEM");
        }
    }
    entry.version_code =
        version_code.ok_or_else(|| AdbError::malformed(name, "missing versionCode"))?;
    entry.first_install_time_ms = first_install.unwrap_or(0);
    entry.last_update_time_ms = last_update.unwrap_or(0);
    Ok(entry)
}

fn parse_dumpsys_time(raw: &str) -> i64 {
    NaiveDateTime::parse_from_str(raw.trim(), DUMPSYS_TIME_FORMAT)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|t| t.timestamp_millis())
        .unwrap_or_else(|| {
            warn!("unparseable dumpsys timestamp {:?}", raw);
            0
        })
}
