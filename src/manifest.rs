//! Maya module manifest (`<toolName>.mod`)
//!
//! The manifest points Maya's module loader at the distribution root so the
//! script and icon search paths are extended for every Maya version without
//! per-version copies. It is rewritten on every run.

use crate::deploy::{icon_dir_name, SCRIPTS_DIR_NAME};
use crate::error::DeployError;
use crate::types::{ModuleManifest, ToolIdentity};
use anyhow::{anyhow, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TOOL_VERSION: &str = "1.0";
const REQUIREMENT_LINE: &str = "requires maya any";

impl ToolIdentity {
    /// Tool name from the distribution folder, version from the
    /// `version = "..."` assignment in `scripts/__init__.py`.
    pub fn from_distribution(root: &Path) -> Result<Self> {
        let tool_name = root
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| anyhow!("Cannot derive a tool name from {}", root.display()))?
            .to_string();

        let init_py = root.join(SCRIPTS_DIR_NAME).join("__init__.py");
        let version = fs::read_to_string(&init_py)
            .ok()
            .and_then(|text| read_version(&text))
            .unwrap_or_else(|| {
                tracing::debug!(
                    "No version in {}, using {}",
                    init_py.display(),
                    DEFAULT_TOOL_VERSION
                );
                DEFAULT_TOOL_VERSION.to_string()
            });

        Ok(Self { tool_name, version })
    }
}

fn read_version(text: &str) -> Option<String> {
    let re = Regex::new(r#"(?m)^\s*version\s*=\s*['"]([^'"\s]+)['"]"#).ok()?;
    re.captures(text).map(|cap| cap[1].to_string())
}

impl ModuleManifest {
    pub fn new(identity: &ToolIdentity, root_path: &Path) -> Self {
        let icon_dir = icon_dir_name(root_path);
        Self {
            tool_name: identity.tool_name.clone(),
            version: identity.version.clone(),
            root_path: root_path.to_path_buf(),
            path_directives: vec![
                ("PYTHONPATH".to_string(), SCRIPTS_DIR_NAME.to_string()),
                ("MAYA_SCRIPT_PATH".to_string(), SCRIPTS_DIR_NAME.to_string()),
                ("XBMLANGPATH".to_string(), icon_dir.to_string()),
            ],
        }
    }

    pub fn render(&self) -> String {
        // Maya reads module paths with forward slashes on every platform
        let root = self.root_path.to_string_lossy().replace('\\', "/");
        let mut out = format!("+ {} {} {}\n", self.tool_name, self.version, root);
        out.push_str(REQUIREMENT_LINE);
        out.push('\n');
        for (variable, relative) in &self.path_directives {
            out.push_str(&format!("{} +:= {}\n", variable, relative));
        }
        out
    }
}

pub struct ManifestWriter {
    modules_dir: PathBuf,
}

impl ManifestWriter {
    pub fn new(modules_dir: PathBuf) -> Self {
        Self { modules_dir }
    }

    pub fn manifest_path(&self, tool_name: &str) -> PathBuf {
        self.modules_dir.join(format!("{}.mod", tool_name))
    }

    /// Write (or overwrite) the manifest for `identity` rooted at `root_path`.
    pub fn write(&self, identity: &ToolIdentity, root_path: &Path) -> Result<PathBuf, DeployError> {
        let path = self.manifest_path(&identity.tool_name);
        let failed = |e: std::io::Error| DeployError::ManifestWriteFailed {
            path: path.clone(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.modules_dir).map_err(failed)?;
        let manifest = ModuleManifest::new(identity, root_path);
        fs::write(&path, manifest.render()).map_err(failed)?;

        tracing::info!("Module manifest written to {}", path.display());
        Ok(path)
    }
}
