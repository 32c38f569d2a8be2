//! Data validation utilities.

use std::path::{Path, PathBuf};

use stonewar_core::config::BattleConfig;
use stonewar_core::error::GameError;

use crate::{read, Result, ToolError};

/// Parse and check one battle config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid RON, or breaks
/// a rule.
pub fn validate_config_file(path: &Path) -> Result<BattleConfig> {
    let bytes = read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let config = BattleConfig::from_ron_str(&text).map_err(|e| match e {
        GameError::DataParseError { message, .. } => GameError::DataParseError {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })?;

    let problems = config.validate();
    if !problems.is_empty() {
        return Err(ToolError::InvalidConfig {
            path: path.to_path_buf(),
            problems,
        });
    }
    tracing::debug!(path = %path.display(), "Config valid");
    Ok(config)
}

/// Validate every `.ron` file under `path`, or `path` itself if it is a file.
///
/// Returns the files checked, in sorted order.
///
/// # Errors
///
/// Returns the first failure.
pub fn validate_data_path(path: &Path) -> Result<Vec<PathBuf>> {
    let files = if path.is_dir() {
        let entries = std::fs::read_dir(path).map_err(|source| ToolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    for file in &files {
        validate_config_file(file)?;
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stonewar-validate-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_valid_config() {
        let path = scratch("ok.ron", "(ply_time_secs: 60, actions_per_turn: 2)");
        let config = validate_config_file(&path).unwrap();
        assert_eq!(config.ply_time_secs, 60);
        assert_eq!(config.pass_limit, 8);
    }

    #[test]
    fn test_odd_actions_per_turn_rejected() {
        let path = scratch("odd.ron", "(actions_per_turn: 3)");
        let err = validate_config_file(&path).unwrap_err();
        assert!(matches!(err, ToolError::InvalidConfig { ref problems, .. } if problems.len() == 1));
    }

    #[test]
    fn test_parse_error_names_file() {
        let path = scratch("broken.ron", "(ply_time_secs: \"soon\")");
        let err = validate_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn test_bundled_assets_validate() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config");
        let files = validate_data_path(&dir).unwrap();
        assert!(!files.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = validate_config_file(Path::new("/nonexistent/battle.ron")).unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
    }
}
