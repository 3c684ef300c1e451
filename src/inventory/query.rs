use super::models::{ApplicationRecord, Icon, PackageEntry, Scope, UNKNOWN};
use super::registry::PackageRegistry;
use super::signature::CertificateDigests;
use std::collections::HashSet;
use tracing::{error, warn};

/// Every installed app, sorted by case-insensitive display name.
///
/// Never fails: a registry that cannot be queried yields an empty list, a malformed
/// package is skipped, and an icon that cannot be loaded becomes a placeholder.
/// `Scope::UserOnly` is applied after sorting, so it is exactly the `All` result with
/// system apps removed.
pub async fn list_installed_apps<R>(registry: &R, scope: Scope) -> Vec<ApplicationRecord>
where
    R: PackageRegistry + ?Sized,
{
    let entries = match registry.installed_packages().await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to get installed packages: {}", e);
            return Vec::new();
        }
    };
    let mut seen = HashSet::new();
    let mut apps = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to get info for package: {}", e);
                continue;
            }
        };
        if !seen.insert(entry.package_name.clone()) {
            warn!("Duplicate package {} reported, keeping first", entry.package_name);
            continue;
        }
        let icon = load_icon_safely(registry, &entry).await;
        apps.push(build_record(entry, icon));
    }
    apps.sort_by_cached_key(ApplicationRecord::sort_key);
    if scope.is_user_only() {
        apps.retain(|app| !app.is_system_app);
    }
    apps
}

async fn load_icon_safely<R>(registry: &R, entry: &PackageEntry) -> Icon
where
    R: PackageRegistry + ?Sized,
{
    match registry.load_icon(entry).await {
        Ok(icon) => icon,
        Err(e) => {
            warn!(
                "Failed to load icon for {}, using default icon: {}",
                entry.package_name, e
            );
            Icon::Placeholder
        }
    }
}

fn build_record(entry: PackageEntry, icon: Icon) -> ApplicationRecord {
    let digests = CertificateDigests::from_signers(&entry.certificates);
    let display_name = entry
        .label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| entry.package_name.clone());
    ApplicationRecord {
        package_name: entry.package_name,
        display_name,
        version_name: entry.version_name.unwrap_or_else(|| UNKNOWN.to_string()),
        version_code: entry.version_code,
        md5_signature: digests.md5,
        sha1_signature: digests.sha1,
        sha256_signature: digests.sha256,
        installed_at_ms: entry.first_install_time_ms,
        updated_at_ms: entry.last_update_time_ms,
        is_system_app: entry.is_system,
        icon,
    }
}

