use crate::version::VersionToken;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceGroup {
    #[serde(rename = "shelves")]
    ShelfDefinition,
    #[serde(rename = "scripts")]
    ScriptsTree,
    #[serde(rename = "icons")]
    IconSet,
}

impl ResourceGroup {
    pub const ALL: [ResourceGroup; 3] = [
        ResourceGroup::ShelfDefinition,
        ResourceGroup::ScriptsTree,
        ResourceGroup::IconSet,
    ];

    /// Destination for this group inside one version's preference tree
    /// (`<prefRoot>/<token>`).
    pub fn destination(self, version_dir: &Path, tool_name: &str) -> PathBuf {
        match self {
            ResourceGroup::ShelfDefinition => version_dir.join("prefs").join("shelves"),
            ResourceGroup::ScriptsTree => version_dir.join("scripts").join(tool_name),
            ResourceGroup::IconSet => version_dir.join("prefs").join("icons"),
        }
    }
}

impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceGroup::ShelfDefinition => "shelves",
            ResourceGroup::ScriptsTree => "scripts",
            ResourceGroup::IconSet => "icons",
        };
        write!(f, "{}", name)
    }
}

/// One source directory of the distribution and the group it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBundle {
    pub group: ResourceGroup,
    pub source: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationCandidate {
    pub token: VersionToken,
    /// The preference directory when one exists, otherwise the install folder
    pub root_path: PathBuf,
    pub has_preference_dir: bool,
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolIdentity {
    pub tool_name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleManifest {
    pub tool_name: String,
    pub version: String,
    pub root_path: PathBuf,
    pub path_directives: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployerSettings {
    #[serde(default = "default_shelf_tab_name")]
    pub shelf_tab_name: String,
    #[serde(default = "default_pause_on_exit")]
    pub pause_on_exit: bool,
    #[serde(default = "default_launch")]
    pub launch: bool,
    #[serde(default = "default_icon_extensions")]
    pub icon_extensions: Vec<String>,
}

fn default_shelf_tab_name() -> String {
    "Python".to_string()
}
fn default_pause_on_exit() -> bool {
    true
}
fn default_launch() -> bool {
    true
}
fn default_icon_extensions() -> Vec<String> {
    ["png", "svg", "xpm", "bmp", "jpg", "jpeg", "gif", "ico"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for DeployerSettings {
    fn default() -> Self {
        Self {
            shelf_tab_name: default_shelf_tab_name(),
            pause_on_exit: default_pause_on_exit(),
            launch: default_launch(),
            icon_extensions: default_icon_extensions(),
        }
    }
}

/// Where a run reads from and writes to, after defaults and overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPaths {
    pub distribution_root: PathBuf,
    pub preference_root: PathBuf,
    pub install_root: PathBuf,
    pub modules_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    /// Lowercase product name used in install folder names (`maya2025`)
    pub product: String,
    /// Executable location relative to a versioned install folder
    pub executable_rel_path: PathBuf,
    pub default_install_root: PathBuf,
}

impl HostLayout {
    pub fn executable_name(&self) -> Option<&str> {
        self.executable_rel_path.file_name()?.to_str()
    }
}
