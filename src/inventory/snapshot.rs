use super::models::{IconSource, PackageEntry};
use super::registry::PackageRegistry;
use crate::core::{AdbError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub packages: Vec<SnapshotPackage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    pub package_name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub version_name: Option<String>,
    #[serde(default)]
    pub version_code: i64,
    #[serde(default)]
    pub first_install_time: i64,
    #[serde(default)]
    pub last_update_time: i64,
    #[serde(default)]
    pub system: bool,
    /// Hex encoded DER certificates.
    #[serde(default)]
    pub certificates: Vec<String>,
    /// Icon file, relative paths resolve against the snapshot's directory.
    #[serde(default)]
    pub icon: Option<PathBuf>,
}
impl SnapshotPackage {
    fn into_entry(self, base: &Path) -> Result<PackageEntry> {
        if self.package_name.trim().is_empty() {
            return Err(AdbError::malformed("<unnamed>", "empty package name"));
        }
        let certificates = self
            .certificates
            .iter()
            .map(|c| hex::decode(c.trim()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AdbError::malformed(&self.package_name, format!("bad certificate hex: {}", e)))?;
        let icon = match self.icon {
            Some(p) if p.is_absolute() => IconSource::File(p),
            Some(p) => IconSource::File(base.join(p)),
            None => IconSource::None,
        };
        Ok(PackageEntry {
            package_name: self.package_name,
            label: self.label,
            version_name: self.version_name,
            version_code: self.version_code,
            first_install_time_ms: self.first_install_time,
            last_update_time_ms: self.last_update_time,
            is_system: self.system,
            certificates,
            icon,
        })
    }
}

/// Registry backed by a JSON snapshot file, re-read on every query.
#[derive(Debug, Clone)]
pub struct SnapshotRegistry {
    path: PathBuf,
}
impl SnapshotRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
#[async_trait]
impl PackageRegistry for SnapshotRegistry {
    async fn installed_packages(&self) -> Result<Vec<Result<PackageEntry>>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let doc: SnapshotDocument = serde_json::from_str(&raw)?;
        let base = self.path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(doc
            .packages
            .into_iter()
            .map(|p| p.into_entry(&base))
            .collect())
    }
}
