//! Logger setup shared by the `train` and `serve` subcommands.
//!
//! Lines look like `2026-01-01 12:00:00,123 | INFO | titanic_classifiers::titanic_model | ...`.
//! The level filter comes from `TITANIC_LOG` (default `info`). With a log
//! file, every line goes to stderr and to the file.
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;

pub const LOG_ENV: &str = "TITANIC_LOG";

/// Writes every buffer to stderr and to a file.
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

fn builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::default();
    builder
        .filter_level(LevelFilter::Info)
        .parse_env(env_logger::Env::default().filter_or(LOG_ENV, "info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {} | {} | {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.module_path().unwrap_or("titanic"),
                record.args()
            )
        });
    builder
}

/// Install the global logger. `log_file` is truncated on each run.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = builder();
    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
    }
    builder
        .try_init()
        .context("A global logger has already been installed")?;
    Ok(())
}
