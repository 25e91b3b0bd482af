use log::LevelFilter;
use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("midikeyrs")
        .join("logs"))
}

/// Installs the file logger at `~/.local/share/midikeyrs/logs/app.log`.
/// Returns the log file path.
pub fn init_logger(level: LevelFilter) -> Result<PathBuf, Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let path = log_dir.join("app.log");
    let log_file = OpenOptions::new().create(true).append(true).open(&path)?;

    INIT.call_once(|| {
        let config = Config::default();
        if let Ok(()) = CombinedLogger::init(vec![WriteLogger::new(level, config, log_file)]) {
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(path)
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}

/// Installs env_logger on stderr; `RUST_LOG` overrides `level`.
pub fn init_stderr_logger(level: LevelFilter) -> Result<(), Error> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .map_err(|e| Error::new(ErrorKind::Other, e))
}
