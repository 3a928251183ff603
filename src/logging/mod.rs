//! Logger setup. Records go to stderr through `pretty_env_logger` and,
//! when enabled, are tee'd into a per-run file that can be uploaded on exit.

mod upload;

pub use upload::{upload_log, UploadOutcome};

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};

use crate::config::{LogConfig, LogFileConfig};

struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// `<path>/<pref><date>.log` for a run started at `started`.
pub fn log_file_path(config: &LogFileConfig, started: DateTime<Local>) -> PathBuf {
    Path::new(&config.path).join(format!("{}{}.log", config.pref, started.format(&config.date)))
}

/// Creates the log directory when missing and opens the run's log file.
pub fn open_log_file(config: &LogFileConfig, started: DateTime<Local>) -> io::Result<(PathBuf, File)> {
    let dir = Path::new(&config.path);
    if !dir.is_dir() {
        fs::create_dir_all(dir)?;
    }
    let path = log_file_path(config, started);
    let file = File::options().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Installs the global logger, returns the log file when file logging is on.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LogConfig) -> io::Result<Option<PathBuf>> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.parse_filters(&filters);

    let mut log_file = None;
    if config.file.enable {
        let (path, file) = open_log_file(&config.file, Local::now())?;
        builder
            .write_style(env_logger::WriteStyle::Never)
            .target(env_logger::Target::Pipe(Box::new(Tee { file })));
        log_file = Some(path);
    }

    if builder.try_init().is_err() {
        eprintln!("Logger already initialized");
    }

    match &log_file {
        Some(path) => info!("Logging to file: '{}'", path.display()),
        None => info!("Logging to file disabled"),
    }
    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn file_config(dir: &Path) -> LogFileConfig {
        LogFileConfig {
            enable: true,
            path: dir.join("nested/logs").to_string_lossy().into_owned(),
            pref: "relaystash_".to_string(),
            date: "%Y-%m-%d_%H-%M-%S".to_string(),
        }
    }

    #[test]
    fn test_log_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        let path = log_file_path(&config, started);
        assert_eq!(path.file_name().unwrap(), "relaystash_2024-03-09_07-05-01.log");
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());

        let (path, mut file) = open_log_file(&config, Local::now()).unwrap();
        writeln!(file, "hello").unwrap();

        assert!(path.parent().unwrap().is_dir());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
