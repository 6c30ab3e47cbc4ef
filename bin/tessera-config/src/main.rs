//! Tessera Config - client configuration tool
//!
//! Writes the client configuration file (servers and storage sections) to
//! the user or system location, or prints an existing one.

use anyhow::{Context, Result, anyhow};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tessera_common::{Config, StorageBackend};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// File name of the configuration inside a config directory
const CONFIG_FILE: &str = "tessera.toml";

/// System-wide configuration directory
const GLOBAL_CONFIG_DIR: &str = "/etc/tessera";

#[derive(Parser, Debug)]
#[command(name = "tessera-config")]
#[command(about = "Write or print the Tessera client configuration")]
#[command(version)]
struct Args {
    /// Use the configuration of the current user
    #[arg(long)]
    local: bool,

    /// Use the system-wide configuration
    #[arg(long)]
    global: bool,

    /// Print the configuration instead of writing it
    #[arg(long)]
    print: bool,

    /// Data servers to use
    #[arg(long, value_name = "host1,host2")]
    data: Option<String>,

    /// Metadata servers to use
    #[arg(long, value_name = "host1,host2")]
    metadata: Option<String>,

    /// Storage backend to use
    #[arg(long, value_name = "null|gio|posix")]
    storage_backend: Option<String>,

    /// Storage path to use
    #[arg(long, value_name = "/path/to/storage")]
    storage_path: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Where the configuration goes
#[derive(Debug, PartialEq, Eq)]
enum Location {
    Local,
    Global,
    Stdout,
}

/// What the tool was asked to do
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Print(Location),
    Write(Config, Location),
}

impl Args {
    const fn location(&self) -> Location {
        if self.local {
            Location::Local
        } else if self.global {
            Location::Global
        } else {
            Location::Stdout
        }
    }

    fn has_values(&self) -> bool {
        self.data.is_some()
            || self.metadata.is_some()
            || self.storage_backend.is_some()
            || self.storage_path.is_some()
    }

    /// Check flag combinations. `None` means a usage error.
    fn action(&self) -> Option<Action> {
        if self.local && self.global {
            return None;
        }

        if self.print {
            if self.has_values() || (!self.local && !self.global) {
                return None;
            }
            return Some(Action::Print(self.location()));
        }

        let backend: StorageBackend = self.storage_backend.as_deref()?.parse().ok()?;
        let config = Config::from_lists(
            self.data.as_deref()?,
            self.metadata.as_deref()?,
            backend,
            self.storage_path.clone()?,
        );
        Some(Action::Write(config, self.location()))
    }
}

fn config_path(location: &Location) -> Result<Option<PathBuf>> {
    match location {
        Location::Local => {
            let dirs = ProjectDirs::from("", "", "tessera")
                .ok_or_else(|| anyhow!("could not resolve the user config directory"))?;
            Ok(Some(dirs.config_dir().join(CONFIG_FILE)))
        }
        Location::Global => Ok(Some(Path::new(GLOBAL_CONFIG_DIR).join(CONFIG_FILE))),
        Location::Stdout => Ok(None),
    }
}

fn print_config(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    print!("{text}");
    Ok(())
}

fn write_config(config: &Config, path: Option<&Path>) -> Result<()> {
    config.validate()?;
    match path {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote configuration to {}", path.display());
        }
        None => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

fn run(action: Action) -> Result<()> {
    match action {
        Action::Print(location) => {
            let path = config_path(&location)?
                .ok_or_else(|| anyhow!("--print needs --local or --global"))?;
            print_config(&path)
        }
        Action::Write(config, location) => {
            let path = config_path(&location)?;
            debug!("Writing {config:?} to {path:?}");
            write_config(&config, path.as_deref())
        }
    }
}

/// Exit status for an argument parse error. Help and version requests
/// succeed; every usage error exits with 1.
fn usage_status(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print()?;
            std::process::exit(usage_status(&e));
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(action) = args.action() else {
        Args::command().print_help()?;
        std::process::exit(1);
    };

    run(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tessera-config").chain(argv.iter().copied())).unwrap()
    }

    const WRITE: &[&str] = &[
        "--data",
        "d1, d2",
        "--metadata",
        "m1",
        "--storage-backend",
        "posix",
        "--storage-path",
        "/srv/tessera",
    ];

    fn with(extra: &[&str]) -> Args {
        let mut argv = extra.to_vec();
        argv.extend_from_slice(WRITE);
        args(&argv)
    }

    fn parse_status(argv: &[&str]) -> i32 {
        let err = Args::try_parse_from(std::iter::once("tessera-config").chain(argv.iter().copied()))
            .unwrap_err();
        usage_status(&err)
    }

    #[test]
    fn test_usage_errors_exit_one() {
        assert_eq!(parse_status(&["--bogus"]), 1);
        assert_eq!(parse_status(&["--data"]), 1);
        assert_eq!(parse_status(&["stray"]), 1);
        assert_eq!(parse_status(&["--help"]), 0);
        assert_eq!(parse_status(&["--version"]), 0);
    }

    #[test]
    fn test_write_to_stdout() {
        let Some(Action::Write(config, location)) = with(&[]).action() else {
            panic!("expected a write");
        };
        assert_eq!(location, Location::Stdout);
        assert_eq!(config.servers.data, vec!["d1", "d2"]);
        assert_eq!(config.servers.metadata, vec!["m1"]);
        assert_eq!(config.storage.backend, StorageBackend::Posix);
        assert_eq!(config.storage.path, PathBuf::from("/srv/tessera"));
    }

    #[test]
    fn test_write_locations() {
        assert!(matches!(with(&["--local"]).action(), Some(Action::Write(_, Location::Local))));
        assert!(matches!(with(&["--global"]).action(), Some(Action::Write(_, Location::Global))));
    }

    #[test]
    fn test_local_and_global_conflict() {
        assert_eq!(with(&["--local", "--global"]).action(), None);
        assert_eq!(args(&["--print", "--local", "--global"]).action(), None);
    }

    #[test]
    fn test_print_rules() {
        assert_eq!(
            args(&["--print", "--local"]).action(),
            Some(Action::Print(Location::Local))
        );
        assert_eq!(
            args(&["--print", "--global"]).action(),
            Some(Action::Print(Location::Global))
        );
        assert_eq!(args(&["--print"]).action(), None);
        assert_eq!(args(&["--print", "--local", "--data", "d1"]).action(), None);
        assert_eq!(
            args(&["--print", "--global", "--storage-path", "/x"]).action(),
            None
        );
    }

    #[test]
    fn test_write_needs_every_value() {
        assert_eq!(args(&[]).action(), None);
        assert_eq!(
            args(&["--data", "d", "--metadata", "m", "--storage-backend", "null"]).action(),
            None
        );
        assert_eq!(
            args(&["--data", "d", "--storage-backend", "null", "--storage-path", "/x"]).action(),
            None
        );
    }

    #[test]
    fn test_backend_must_be_known() {
        let base = ["--data", "d", "--metadata", "m", "--storage-path", "/x"];
        for backend in ["null", "gio", "posix"] {
            let mut argv = base.to_vec();
            argv.extend(["--storage-backend", backend]);
            assert!(args(&argv).action().is_some(), "{backend}");
        }
        for backend in ["mongodb", "POSIX", ""] {
            let mut argv = base.to_vec();
            argv.extend(["--storage-backend", backend]);
            assert_eq!(args(&argv).action(), None, "{backend}");
        }
    }

    #[test]
    fn test_write_then_print_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/tessera.toml");
        let config = Config::from_lists("d1,d2", "m1", StorageBackend::Gio, "/srv");

        write_config(&config, Some(&path)).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
        print_config(&path).unwrap();
    }

    #[test]
    fn test_write_rejects_empty_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        let config = Config::from_lists(" , ", "m1", StorageBackend::Null, "/srv");
        assert!(write_config(&config, Some(&path)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_print_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(print_config(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_global_path() {
        assert_eq!(
            config_path(&Location::Global).unwrap(),
            Some(PathBuf::from("/etc/tessera/tessera.toml"))
        );
        assert_eq!(config_path(&Location::Stdout).unwrap(), None);
    }
}
