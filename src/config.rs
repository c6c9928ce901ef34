//! Configuration for renderq paths.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (RENDERQ_HOME, RENDERQ_AUDIO, RENDERQ_RENDER,
//!    RENDERQ_CLIPS, RENDERQ_SCRIPTS)
//! 2. Config file (.renderq/config.yaml)
//! 3. Defaults (~/.renderq)
//!
//! Config file discovery:
//! - Searches current directory and parents for .renderq/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Base directory for default roots (relative to the project root)
    pub home: Option<String>,
    /// Audio asset root
    pub audio: Option<String>,
    /// Render output root
    pub render: Option<String>,
    /// Clip staging root
    pub clips: Option<String>,
    /// Job descriptor directory
    pub scripts: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Base directory the default roots hang off
    pub home: PathBuf,
    /// Audio asset root (background tracks, endings, sound effects)
    pub audio: PathBuf,
    /// Render output root
    pub render: PathBuf,
    /// Clip staging root
    pub clips: PathBuf,
    /// Job descriptor directory
    pub scripts: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".renderq").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Resolve one root: env var, then config file entry, then default
fn resolve_root(
    env_var: &str,
    configured: Option<&String>,
    base: &Path,
    default: PathBuf,
) -> PathBuf {
    if let Ok(value) = std::env::var(env_var) {
        PathBuf::from(value)
    } else if let Some(path_str) = configured {
        resolve_path(base, path_str)
    } else {
        default
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".renderq");

    let config_file = find_config_file();

    let (paths, base_dir) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .renderq/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        (config.paths, base_dir)
    } else {
        (PathsConfig::default(), PathBuf::from("."))
    };

    let home = resolve_root(
        "RENDERQ_HOME",
        paths.home.as_ref(),
        &base_dir,
        default_home,
    );

    let audio = resolve_root(
        "RENDERQ_AUDIO",
        paths.audio.as_ref(),
        &base_dir,
        home.join("audio"),
    );
    let render = resolve_root(
        "RENDERQ_RENDER",
        paths.render.as_ref(),
        &base_dir,
        home.join("render"),
    );
    let clips = resolve_root(
        "RENDERQ_CLIPS",
        paths.clips.as_ref(),
        &base_dir,
        home.join("clips"),
    );
    let scripts = resolve_root(
        "RENDERQ_SCRIPTS",
        paths.scripts.as_ref(),
        &base_dir,
        home.join("scripts"),
    );

    Ok(ResolvedConfig {
        home,
        audio,
        render,
        clips,
        scripts,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the renderq home directory
pub fn renderq_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the audio asset root
pub fn audio_dir() -> Result<PathBuf> {
    Ok(config()?.audio.clone())
}

/// Get the render output root
pub fn render_dir() -> Result<PathBuf> {
    Ok(config()?.render.clone())
}

/// Get the clip staging root
pub fn clips_dir() -> Result<PathBuf> {
    Ok(config()?.clips.clone())
}

/// Get the job descriptor directory
pub fn scripts_dir() -> Result<PathBuf> {
    Ok(config()?.scripts.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let renderq_dir = temp.path().join(".renderq");
        std::fs::create_dir_all(&renderq_dir).unwrap();

        let config_path = renderq_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  audio: ./audio
  render: ../render
  scripts: Guiones/jsons
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.audio, Some("./audio".to_string()));
        assert_eq!(config.paths.render, Some("../render".to_string()));
        assert_eq!(config.paths.scripts, Some("Guiones/jsons".to_string()));
        assert_eq!(config.paths.clips, None);
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_resolve_root_prefers_configured_over_default() {
        let base = PathBuf::from("/base");
        let configured = "clips".to_string();

        // Env var name chosen to never exist in a test environment
        let resolved = resolve_root(
            "RENDERQ_TEST_UNSET_ROOT",
            Some(&configured),
            &base,
            PathBuf::from("/default"),
        );
        assert_eq!(resolved, PathBuf::from("/base/clips"));

        let resolved = resolve_root(
            "RENDERQ_TEST_UNSET_ROOT",
            None,
            &base,
            PathBuf::from("/default"),
        );
        assert_eq!(resolved, PathBuf::from("/default"));
    }
}
