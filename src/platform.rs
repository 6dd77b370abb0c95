use crate::types::HostLayout;
use std::path::{Path, PathBuf};

pub const PRODUCT_NAME: &str = "maya";

pub fn get_host_layout() -> HostLayout {
    host_layout_for(std::env::consts::OS)
}

pub fn host_layout_for(os: &str) -> HostLayout {
    let (executable_rel_path, default_install_root) = match os {
        "windows" => {
            let program_files = std::env::var_os("ProgramFiles")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
            (
                Path::new("bin").join("maya.exe"),
                program_files.join("Autodesk"),
            )
        }
        "macos" => (
            Path::new("Maya.app")
                .join("Contents")
                .join("MacOS")
                .join("Maya"),
            PathBuf::from("/Applications/Autodesk"),
        ),
        _ => (
            Path::new("bin").join("maya"),
            PathBuf::from("/usr/autodesk"),
        ),
    };

    HostLayout {
        product: PRODUCT_NAME.to_string(),
        executable_rel_path,
        default_install_root,
    }
}

/// Where Maya keeps per-user, per-version preferences when `MAYA_APP_DIR`
/// is not set.
pub fn default_preference_root() -> Option<PathBuf> {
    default_preference_root_for(std::env::consts::OS)
}

fn default_preference_root_for(os: &str) -> Option<PathBuf> {
    match os {
        "windows" => Some(dirs::document_dir()?.join("maya")),
        "macos" => Some(
            dirs::home_dir()?
                .join("Library")
                .join("Preferences")
                .join("Autodesk")
                .join("maya"),
        ),
        _ => Some(dirs::home_dir()?.join("maya")),
    }
}
