use crate::core::{AdbError, Result};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

const ADB_BIN: &str = if cfg!(windows) { "adb.exe" } else { "adb" };

#[derive(Debug, Clone)]
pub struct AdbClient {
    adb_path: PathBuf,
    command_timeout: Duration,
}
impl AdbClient {
    pub fn new(configured: Option<&Path>, command_timeout: Duration) -> Result<Self> {
        let adb_path = Self::resolve_adb(configured)?;
        debug!(adb = %adb_path.display(), "resolved adb");
        Ok(Self {
            adb_path,
            command_timeout,
        })
    }
    pub fn adb_path(&self) -> &Path {
        &self.adb_path
    }
    fn resolve_adb(configured: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = configured {
            if p.exists() {
                return Ok(p.to_path_buf());
            }
            return Err(AdbError::AdbNotFound);
        }
        if let Ok(current_exe) = std::env::current_exe() {
            if let Some(parent) = current_exe.parent() {
                let bundled = parent.join("platform-tools").join(ADB_BIN);
                if bundled.exists() {
                    return Ok(bundled);
                }
                let vendor_bundled = parent.join("vendor").join("platform-tools").join(ADB_BIN);
                if vendor_bundled.exists() {
                    return Ok(vendor_bundled);
                }
            }
        }
        let local_vendor = PathBuf::from("vendor").join("platform-tools").join(ADB_BIN);
        if local_vendor.exists() {
            if let Ok(abs) = std::fs::canonicalize(local_vendor) {
                return Ok(abs);
            }
        }
        which::which("adb").map_err(|_| AdbError::AdbNotFound)
    }
    async fn output(&self, args: &[&str]) -> Result<Output> {
        debug!(?args, "adb");
        let secs = self.command_timeout.as_secs();
        timeout(
            self.command_timeout,
            Command::new(&self.adb_path).args(args).kill_on_drop(true).output(),
        )
        .await
        .map_err(|_| AdbError::Timeout(secs))?
        .map_err(AdbError::from)
    }
    pub async fn ensure_present(&self) -> Result<()> {
        let output = self.output(&["version"]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(AdbError::CommandFailed("adb version failed".to_string()))
        }
    }
    pub async fn start_server(&self) -> Result<()> {
        self.output(&["start-server"]).await?;
        Ok(())
    }
    pub async fn execute(&self, args: &[&str]) -> Result<(String, String)> {
        let output = self.output(args).await?;
        let stdout = String::from_utf8(output.stdout)?;
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(AdbError::CommandFailed(stderr));
        }
        Ok((stdout, stderr))
    }
    /// Like [`execute`](Self::execute) but keeps stdout as raw bytes.
    pub async fn execute_raw(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.output(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(AdbError::CommandFailed(stderr));
        }
        Ok(output.stdout)
    }
    pub async fn shell(&self, serial: &str, cmd: &[&str]) -> Result<String> {
        let mut args = vec!["-s", serial, "shell"];
        args.extend_from_slice(cmd);
        let (stdout, stderr) = self.execute(&args).await?;
        if !stderr.is_empty() && stderr.to_lowercase().contains("error") {
            return Err(AdbError::CommandFailed(stderr));
        }
        Ok(stdout)
    }
    /// Reads a device file verbatim through `exec-out`, bypassing pty newline mangling.
    pub async fn read_device_file(&self, serial: &str, path: &str) -> Result<Vec<u8>> {
        self.execute_raw(&["-s", serial, "exec-out", "cat", path]).await
    }
}
