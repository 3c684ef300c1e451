pub mod adb_registry;
pub mod apk;
pub mod filter;
pub mod models;
pub mod query;
pub mod registry;
pub mod signature;
pub mod snapshot;

pub use adb_registry::{AdbRegistry, AdbRegistryOptions};
pub use filter::filter;
pub use models::{ApplicationRecord, Icon, IconSource, PackageEntry, Scope};
pub use query::list_installed_apps;
pub use registry::PackageRegistry;
pub use signature::CertificateDigests;
pub use snapshot::SnapshotRegistry;
