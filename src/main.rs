use anyhow::{bail, Context};
use appinv::adb::{AdbClient, DeviceManager};
use appinv::core::{AdbError, Config};
use appinv::inventory::{
    filter, list_installed_apps, AdbRegistry, AdbRegistryOptions, PackageRegistry, Scope,
    SnapshotRegistry,
};
use appinv::store::AppListStore;
use appinv::ui::{run_browse, ConsoleUi, Menu};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "appinv", version, about = "Installed Android app inventory over adb")]
struct Cli {
    /// Config file; defaults to <config dir>/appinv/config.toml
    #[arg(long, global = true, env = "APPINV_CONFIG")]
    config: Option<PathBuf>,
    /// adb binary to use instead of the configured or discovered one
    #[arg(long, global = true)]
    adb: Option<PathBuf>,
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List authorised devices
    Devices,
    /// Print installed apps once
    List {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Case-insensitive substring of package or app name
        #[arg(long, short)]
        query: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Interactive search session
    Browse {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scope: ScopeArgs,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Device serial, as shown by `appinv devices`
    #[arg(long, short, conflicts_with = "snapshot")]
    serial: Option<String>,
    /// Read packages from a JSON snapshot instead of a device
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Pull each APK to compute signing-certificate digests and load icons
    #[arg(long, overrides_with = "no_certs")]
    certs: bool,
    /// Skip APK pulls even if the config enables them
    #[arg(long, overrides_with = "certs")]
    no_certs: bool,
}
impl SourceArgs {
    fn fetch_certificates(&self, config: &Config) -> bool {
        flag(self.certs, self.no_certs, config.fetch_certificates)
    }
}

#[derive(Args, Debug)]
struct ScopeArgs {
    /// Only apps that are not part of the system image
    #[arg(long, overrides_with = "all_apps")]
    user_only: bool,
    /// Include system apps even if the config sets user_apps_only
    #[arg(long, overrides_with = "user_only")]
    all_apps: bool,
}
impl ScopeArgs {
    fn scope(&self, config: &Config) -> Scope {
        Scope::from_user_only(flag(self.user_only, self.all_apps, config.user_apps_only))
    }
}

/// An explicit `--x` or `--no-x` beats the config value.
fn flag(on: bool, off: bool, configured: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => configured,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.adb.is_some() {
        config.adb_path = cli.adb.clone();
    }
    init_tracing(&config, cli.verbose);

    match cli.command {
        Command::Devices => {
            let client = connect(&config).await?;
            let devices = DeviceManager::new(client).list_devices().await?;
            ConsoleUi::render_device_table(&devices);
        }
        Command::List {
            source,
            scope,
            query,
            json,
        } => {
            let registry = open_registry(&source, &config).await?;
            let scope = scope.scope(&config);
            let apps = list_installed_apps(registry.as_ref(), scope).await;
            let apps = filter(&apps, query.as_deref().unwrap_or_default());
            if json {
                println!("{}", serde_json::to_string_pretty(&apps)?);
            } else {
                ConsoleUi::render_app_table(&apps);
                ConsoleUi::success(&format!("{} apps", apps.len()));
            }
        }
        Command::Browse { source, scope } => {
            ConsoleUi::write_banner();
            let registry = open_registry(&source, &config).await?;
            let store = AppListStore::new(registry, config.search_debounce());
            let scope = scope.scope(&config);
            run_browse(&store, scope).await?;
        }
    }
    Ok(())
}

fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &Config) -> anyhow::Result<AdbClient> {
    let client = AdbClient::new(config.adb_path.as_deref(), config.command_timeout()).context(
        "adb not found. Install Android Platform-Tools or set adb_path in the config",
    )?;
    client
        .ensure_present()
        .await
        .context("adb version check failed")?;
    client.start_server().await?;
    Ok(client)
}

async fn open_registry(
    source: &SourceArgs,
    config: &Config,
) -> anyhow::Result<Arc<dyn PackageRegistry>> {
    if let Some(path) = &source.snapshot {
        return Ok(Arc::new(SnapshotRegistry::new(path)));
    }
    let client = connect(config).await?;
    let device_mgr = DeviceManager::new(client.clone());
    let serial = match &source.serial {
        Some(serial) => device_mgr.find(serial).await?.serial,
        None => {
            let devices = device_mgr.list_devices().await?;
            match devices.len() {
                0 => return Err(AdbError::NoDevices.into()),
                1 => devices[0].serial.clone(),
                _ => match Menu::pick_device(&devices) {
                    Some(d) => d.serial.clone(),
                    None => bail!("no device selected"),
                },
            }
        }
    };
    tracing::info!(%serial, "using device");
    let options = AdbRegistryOptions {
        fetch_certificates: source.fetch_certificates(config),
        fetch_concurrency: config.fetch_concurrency,
    };
    Ok(Arc::new(AdbRegistry::new(client, serial, options)))
}
