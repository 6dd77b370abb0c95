use crate::error::DeployError;
use crate::platform::default_preference_root;
use crate::types::*;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const APP_NAME: &str = "maya-deployer";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const MODULES_DIR_NAME: &str = "modules";

pub fn get_user_config_dir() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(APP_NAME);
    Ok(path)
}

pub fn get_settings_file_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os("MAYA_DEPLOYER_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let path = get_user_config_dir()?.join(CONFIG_FILE_NAME);
    tracing::debug!("Settings file path: {}", path.display());
    Ok(path)
}

/// Load settings from the optional JSON file, then apply environment overrides.
pub fn load_settings() -> Result<DeployerSettings> {
    let settings_path = get_settings_file_path()?;

    let mut settings = if settings_path.exists() {
        let content = fs::read_to_string(&settings_path).with_context(|| {
            format!("Could not read settings file at {}", settings_path.display())
        })?;
        serde_json::from_str(&content).with_context(|| {
            format!(
                "Could not parse settings file {} as JSON",
                settings_path.display()
            )
        })?
    } else {
        DeployerSettings::default()
    };

    if let Ok(tab) = env::var("MAYA_DEPLOYER_SHELF_TAB") {
        if !tab.trim().is_empty() {
            settings.shelf_tab_name = tab;
        }
    }

    if let Ok(value) = env::var("MAYA_DEPLOYER_NO_PAUSE") {
        if parse_flag(&value) {
            settings.pause_on_exit = false;
        }
    }

    if let Ok(value) = env::var("MAYA_DEPLOYER_NO_LAUNCH") {
        if parse_flag(&value) {
            settings.launch = false;
        }
    }

    Ok(settings)
}

pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Locate the per-user Maya directory that holds one folder per version.
///
/// `MAYA_APP_DIR` wins over the platform default. The directory must already
/// exist; this is the only fatal precondition of a run.
pub fn locate_preference_root() -> Result<PathBuf, DeployError> {
    let path = match env::var_os("MAYA_APP_DIR").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => default_preference_root().unwrap_or_else(|| PathBuf::from("maya")),
    };
    tracing::debug!("Maya user directory: {}", path.display());

    if path.is_dir() {
        Ok(path)
    } else {
        Err(DeployError::UserDirectoryNotFound { path })
    }
}

/// The distribution root is the dropped folder when one is given, otherwise
/// the folder the executable lives in.
pub fn locate_distribution_root(root_arg: Option<&Path>) -> Result<PathBuf> {
    let root = match root_arg {
        Some(root) => root.to_path_buf(),
        None => env::current_exe()
            .context("Could not determine the executable location")?
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow::anyhow!("Executable has no parent directory"))?,
    };
    absolute(&root)
}

pub fn resolve_paths(
    root_arg: Option<&Path>,
    preference_root: PathBuf,
    layout: &HostLayout,
) -> Result<DeployPaths> {
    let distribution_root = locate_distribution_root(root_arg)?;

    let install_root = env::var_os("MAYA_DEPLOYER_INSTALL_ROOT")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| layout.default_install_root.clone());

    let modules_dir = env::var_os("MAYA_MODULE_DIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| preference_root.join(MODULES_DIR_NAME));

    tracing::debug!("Distribution root: {}", distribution_root.display());
    tracing::debug!("Install root: {}", install_root.display());
    tracing::debug!("Modules directory: {}", modules_dir.display());

    Ok(DeployPaths {
        distribution_root,
        preference_root,
        install_root,
        modules_dir,
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = env::current_dir().context("Could not determine the current directory")?;
    Ok(normalize(&cwd.join(path)))
}

/// Resolve `.` and `..` lexically so the last component names the folder.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
