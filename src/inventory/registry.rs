use super::models::{Icon, IconSource, PackageEntry};
use crate::core::Result;
use async_trait::async_trait;

/// Source of installed-package metadata.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// All installed packages, with signer certificates where the registry can supply them.
    ///
    /// An `Err` here means the registry itself could not be queried. Individual entries may
    /// still be `Err` when that package's metadata is malformed.
    async fn installed_packages(&self) -> Result<Vec<Result<PackageEntry>>>;

    async fn load_icon(&self, entry: &PackageEntry) -> Result<Icon> {
        match &entry.icon {
            IconSource::None => Ok(Icon::Placeholder),
            IconSource::Inline(bytes) => Ok(Icon::Bytes(bytes.clone())),
            IconSource::File(path) => Ok(Icon::Bytes(tokio::fs::read(path).await?)),
        }
    }
}
