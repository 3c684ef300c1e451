use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const UNKNOWN: &str = "Unknown";
pub const ERROR: &str = "Error";

/// Which packages an enumeration returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scope {
    #[default]
    All,
    UserOnly,
}
impl Scope {
    pub fn from_user_only(user_only: bool) -> Self {
        if user_only {
            Self::UserOnly
        } else {
            Self::All
        }
    }
    pub fn is_user_only(self) -> bool {
        matches!(self, Self::UserOnly)
    }
}

/// Launcher icon of a package. Never part of a record's identity.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Icon {
    Bytes(Vec<u8>),
    #[default]
    Placeholder,
}
impl Icon {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}
impl fmt::Debug for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => write!(f, "Icon({} bytes)", b.len()),
            Self::Placeholder => f.write_str("Icon(placeholder)"),
        }
    }
}

/// Where a registry can find a package's icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    None,
    File(PathBuf),
    Inline(Vec<u8>),
}

/// Raw package description as reported by a registry, before digests and sorting.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    pub package_name: String,
    pub label: Option<String>,
    pub version_name: Option<String>,
    pub version_code: i64,
    pub first_install_time_ms: i64,
    pub last_update_time_ms: i64,
    pub is_system: bool,
    /// DER encoded signer certificates; a rotated signer lists its lineage, oldest first.
    pub certificates: Vec<Vec<u8>>,
    pub icon: IconSource,
}
impl PackageEntry {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            label: None,
            version_name: None,
            version_code: 0,
            first_install_time_ms: 0,
            last_update_time_ms: 0,
            is_system: false,
            certificates: Vec::new(),
            icon: IconSource::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub package_name: String,
    pub display_name: String,
    pub version_name: String,
    pub version_code: i64,
    pub md5_signature: String,
    pub sha1_signature: String,
    pub sha256_signature: String,
    pub installed_at_ms: i64,
    pub updated_at_ms: i64,
    pub is_system_app: bool,
    #[serde(skip)]
    pub icon: Icon,
}
impl PartialEq for ApplicationRecord {
    fn eq(&self, other: &Self) -> bool {
        self.package_name == other.package_name
            && self.display_name == other.display_name
            && self.version_name == other.version_name
            && self.version_code == other.version_code
            && self.md5_signature == other.md5_signature
            && self.sha1_signature == other.sha1_signature
            && self.sha256_signature == other.sha256_signature
            && self.installed_at_ms == other.installed_at_ms
            && self.updated_at_ms == other.updated_at_ms
            && self.is_system_app == other.is_system_app
    }
}
impl Eq for ApplicationRecord {}
impl ApplicationRecord {
    pub fn sort_key(&self) -> String {
        self.display_name.to_lowercase()
    }
    pub fn installed_at(&self) -> String {
        format_epoch_ms(self.installed_at_ms)
    }
    pub fn updated_at(&self) -> String {
        format_epoch_ms(self.updated_at_ms)
    }
}

pub fn format_epoch_ms(ms: i64) -> String {
    use chrono::{Local, TimeZone};
    match Local.timestamp_millis_opt(ms).single() {
        Some(t) if ms > 0 => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => UNKNOWN.to_string(),
    }
}
