use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::Level;

use crate::config::Config;
use crate::utils::Error;

/// `verbose` is accepted as an alias of `trace`.
pub fn parse_log_level(raw: &str) -> Level {
    match raw.trim().to_ascii_lowercase().as_str() {
        "verbose" => Level::TRACE,
        other => Level::from_str(other).unwrap_or(Level::INFO),
    }
}

pub fn init_logging(config: &Config) -> Result<(), Error> {
    let level = parse_log_level(config.log_level());

    let Some(log_file) = &config.logs.file else {
        tracing_subscriber::fmt().with_max_level(level).init();
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

pub fn ensure_cache_dir(config: &Config) -> Result<(), String> {
    let cache_dir = PathBuf::from(&config.cache.dir);
    if cache_dir.exists() {
        if !cache_dir.is_dir() {
            return Err(format!(
                "Configured cache dir '{}' exists but is not a directory",
                cache_dir.display()
            ));
        }
        return Ok(());
    }

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        format!(
            "Failed to create configured cache dir '{}': {}",
            cache_dir.display(),
            e
        )
    })?;
    tracing::info!("Created cache directory: '{}'", cache_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level("debug"), Level::DEBUG);
        assert_eq!(parse_log_level("WARN"), Level::WARN);
        assert_eq!(parse_log_level("verbose"), Level::TRACE);
        assert_eq!(parse_log_level("chatty"), Level::INFO);
    }

    #[test]
    fn creates_missing_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cache.dir = dir.path().join("nested/cache").to_string_lossy().into_owned();

        ensure_cache_dir(&config).unwrap();
        assert!(dir.path().join("nested/cache").is_dir());
        ensure_cache_dir(&config).unwrap();
    }

    #[test]
    fn cache_dir_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache");
        std::fs::write(&file, b"").unwrap();
        let mut config = Config::default();
        config.cache.dir = file.to_string_lossy().into_owned();

        assert!(ensure_cache_dir(&config).is_err());
    }
}
