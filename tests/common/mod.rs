#![allow(dead_code)]

use appinv::core::{AdbError, Result};
use appinv::inventory::{Icon, IconSource, PackageEntry, PackageRegistry};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// In-memory registry. `None` slots stand for packages with malformed metadata.
#[derive(Default, Clone)]
pub struct FakeRegistry {
    pub entries: Vec<Option<PackageEntry>>,
    pub deny: bool,
    pub broken_icons: HashSet<String>,
    pub delay: Option<Duration>,
}
impl FakeRegistry {
    pub fn with(entries: Vec<PackageEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }
}
#[async_trait]
impl PackageRegistry for FakeRegistry {
    async fn installed_packages(&self) -> Result<Vec<Result<PackageEntry>>> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.deny {
            return Err(AdbError::PermissionDenied("QUERY_ALL_PACKAGES".into()));
        }
        Ok(self
            .entries
            .iter()
            .map(|e| e.clone().ok_or_else(|| AdbError::malformed("broken", "no application info")))
            .collect())
    }
    async fn load_icon(&self, entry: &PackageEntry) -> Result<Icon> {
        if self.broken_icons.contains(&entry.package_name) {
            return Err(AdbError::Parse("out of memory decoding icon".into()));
        }
        match &entry.icon {
            IconSource::Inline(b) => Ok(Icon::Bytes(b.clone())),
            _ => Ok(Icon::Placeholder),
        }
    }
}

pub fn entry(package: &str, label: &str, system: bool) -> PackageEntry {
    let mut e = PackageEntry::new(package);
    e.label = Some(label.to_string());
    e.is_system = system;
    e.version_name = Some("1.0".to_string());
    e.version_code = 1;
    e
}
