use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file size that triggers trimming (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Newest bytes kept after trimming (1 MB)
const KEEP_SIZE: u64 = 1024 * 1024;

const LOG_FILE_NAME: &str = "mixplan.log";
const TRIM_MARKER: &[u8] = b"--- earlier entries trimmed ---\n";

/// Newest whole lines of an oversized log, or `None` while it is under the cap
fn oversized_tail(path: &Path) -> io::Result<Option<Vec<u8>>> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    if len <= MAX_LOG_SIZE {
        return Ok(None);
    }

    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(len - KEEP_SIZE))?;
    let mut tail = Vec::with_capacity(KEEP_SIZE as usize);
    file.read_to_end(&mut tail)?;

    let first_full_line = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(tail.len(), |i| i + 1);
    tail.drain(..first_full_line);
    Ok(Some(tail))
}

/// Cut the log back to its newest lines; returns whether anything was removed
fn trim_log(path: &Path) -> io::Result<bool> {
    let Some(tail) = oversized_tail(path)? else {
        return Ok(false);
    };
    fs::write(path, [TRIM_MARKER, tail.as_slice()].concat())?;
    Ok(true)
}

fn env_filter(level: &str) -> EnvFilter {
    let default_filter = format!("mixplan={level},mixplan_core=warn");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Path of the log file inside `log_dir`
#[must_use]
pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Initialize logging.
///
/// Without `log_dir`, events go to stderr so stdout stays clean for JSON
/// output. With it, they are appended to `{log_dir}/mixplan.log`, which is
/// trimmed to the newest 1MB whenever it grows past 5MB. `RUST_LOG` overrides
/// `level`.
pub fn init_logging(log_dir: Option<&Path>, level: &str) -> color_eyre::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(level));

    let Some(log_dir) = log_dir else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()?;
        return Ok(());
    };

    fs::create_dir_all(log_dir)?;
    let path = log_path(log_dir);
    let trimmed = trim_log(&path);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    registry
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    match trimmed {
        Ok(true) => tracing::info!(path = %path.display(), "Trimmed oversized log file"),
        Ok(false) => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not trim log file"),
    }
    tracing::info!(path = %path.display(), "mixplan logging initialized");
    Ok(())
}
