use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::ArchmapConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".archmap.toml";
const MAX_TRAVERSAL_DEPTH: usize = 10;

pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML string, replacing invalid sections with their defaults
pub fn parse_and_validate_config(contents: &str) -> Result<ArchmapConfig> {
    let mut config = toml::from_str::<ArchmapConfig>(contents)
        .map_err(|e| Error::Configuration(format!("failed to parse {}: {}", CONFIG_FILE_NAME, e)))?;

    if let Err(e) = config.trends.validate() {
        log::warn!("Invalid [trends] section: {}. Using defaults.", e);
        config.trends = Default::default();
    }
    if let Err(e) = config.hotspots.validate() {
        log::warn!("Invalid [hotspots] section: {}. Using defaults.", e);
        config.hotspots = Default::default();
    }
    if let Err(e) = config.refactoring.validate() {
        log::warn!("Invalid [refactoring] section: {}. Using defaults.", e);
        config.refactoring = Default::default();
    }
    if let Err(e) = config.grouping.validate() {
        log::warn!("Invalid [grouping] section: {}. Using defaults.", e);
        config.grouping = Default::default();
    }

    Ok(config)
}

pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<ArchmapConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// `start` and its ancestors, nearest first, at most `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Nearest `.archmap.toml` at or above `start`, or defaults
pub fn load_config_from(start: PathBuf) -> ArchmapConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            ArchmapConfig::default()
        })
}

pub fn load_config() -> ArchmapConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            ArchmapConfig::default()
        }
    }
}
