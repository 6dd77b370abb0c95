//! Per-version bundle deployment
//!
//! Each resource group is merge-copied into a version's preference tree:
//! files from the distribution overwrite their counterparts, anything else
//! already at the destination is left alone. Groups fail independently and
//! nothing is rolled back.

use crate::error::DeployError;
use crate::types::{InstallationCandidate, ResourceBundle, ResourceGroup};
use crate::version::VersionToken;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SHELVES_DIR_NAME: &str = "shelves";
pub const SCRIPTS_DIR_NAME: &str = "scripts";
/// Canonical icon directory name; `icon` is accepted as well
pub const ICONS_DIR_NAME: &str = "icons";
pub const LEGACY_ICONS_DIR_NAME: &str = "icon";

#[derive(Debug)]
pub enum GroupOutcome {
    Copied { files: usize },
    MissingSource(DeployError),
    Failed(DeployError),
}

#[derive(Debug)]
pub struct DeployResult {
    pub token: VersionToken,
    pub outcomes: Vec<(ResourceGroup, GroupOutcome)>,
}

impl DeployResult {
    pub fn warnings(&self) -> impl Iterator<Item = &DeployError> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            GroupOutcome::Copied { .. } => None,
            GroupOutcome::MissingSource(e) | GroupOutcome::Failed(e) => Some(e),
        })
    }

    pub fn files_copied(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                GroupOutcome::Copied { files } => *files,
                _ => 0,
            })
            .sum()
    }

    #[cfg(test)]
    pub fn outcome(&self, group: ResourceGroup) -> Option<&GroupOutcome> {
        self.outcomes
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, outcome)| outcome)
    }
}

/// Name of the icon directory a distribution actually ships.
pub fn icon_dir_name(distribution_root: &Path) -> &'static str {
    if !distribution_root.join(ICONS_DIR_NAME).is_dir()
        && distribution_root.join(LEGACY_ICONS_DIR_NAME).is_dir()
    {
        LEGACY_ICONS_DIR_NAME
    } else {
        ICONS_DIR_NAME
    }
}

/// The three resource groups of a distribution root.
pub fn bundles_for(distribution_root: &Path) -> Vec<ResourceBundle> {
    ResourceGroup::ALL
        .iter()
        .map(|&group| {
            let dir = match group {
                ResourceGroup::ShelfDefinition => SHELVES_DIR_NAME,
                ResourceGroup::ScriptsTree => SCRIPTS_DIR_NAME,
                ResourceGroup::IconSet => icon_dir_name(distribution_root),
            };
            ResourceBundle {
                group,
                source: distribution_root.join(dir),
            }
        })
        .collect()
}

pub struct BundleDeployer {
    tool_name: String,
    bundles: Vec<ResourceBundle>,
    icon_extensions: Vec<String>,
}

impl BundleDeployer {
    pub fn new(tool_name: &str, bundles: Vec<ResourceBundle>, icon_extensions: &[String]) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            bundles,
            icon_extensions: icon_extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Deploy every resource group into one version's preference tree.
    ///
    /// Candidates without a preference directory are never touched; the
    /// caller filters them out, this is a second guard.
    pub fn deploy(&self, candidate: &InstallationCandidate) -> DeployResult {
        let mut outcomes = Vec::with_capacity(self.bundles.len());

        if !candidate.has_preference_dir || !candidate.root_path.is_dir() {
            tracing::warn!(
                "Skipping Maya {}: no preference directory at {}",
                candidate.token,
                candidate.root_path.display()
            );
            return DeployResult {
                token: candidate.token,
                outcomes,
            };
        }

        // Destinations first, so every group has somewhere to land even if
        // its own copy later fails.
        let destinations: Vec<(ResourceGroup, PathBuf, Option<DeployError>)> = self
            .bundles
            .iter()
            .map(|bundle| {
                let dest = bundle.group.destination(&candidate.root_path, &self.tool_name);
                let err = fs::create_dir_all(&dest)
                    .err()
                    .map(|e| copy_failed(bundle.group, &dest, e));
                (bundle.group, dest, err)
            })
            .collect();

        for (bundle, (_, dest, dir_err)) in self.bundles.iter().zip(destinations) {
            let outcome = if let Some(err) = dir_err {
                GroupOutcome::Failed(err)
            } else if !bundle.source.exists() {
                GroupOutcome::MissingSource(DeployError::MissingSourceBundle {
                    group: bundle.group,
                    path: bundle.source.clone(),
                })
            } else {
                match self.copy_group(bundle, &dest) {
                    Ok(files) => GroupOutcome::Copied { files },
                    Err(err) => GroupOutcome::Failed(err),
                }
            };

            match &outcome {
                GroupOutcome::Copied { files } => tracing::info!(
                    "Maya {}: copied {} {} file(s) to {}",
                    candidate.token,
                    files,
                    bundle.group,
                    dest.display()
                ),
                GroupOutcome::MissingSource(e) | GroupOutcome::Failed(e) => {
                    tracing::warn!("Maya {}: {}", candidate.token, e)
                }
            }
            outcomes.push((bundle.group, outcome));
        }

        DeployResult {
            token: candidate.token,
            outcomes,
        }
    }

    fn copy_group(&self, bundle: &ResourceBundle, dest: &Path) -> Result<usize, DeployError> {
        let copied = match bundle.group {
            ResourceGroup::ShelfDefinition => copy_shelf_files(&bundle.source, dest),
            ResourceGroup::ScriptsTree => merge_tree(&bundle.source, dest, |_| true),
            ResourceGroup::IconSet => merge_tree(&bundle.source, dest, |path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| self.icon_extensions.contains(&ext.to_lowercase()))
            }),
        };
        copied.map_err(|(path, e)| copy_failed(bundle.group, &path, e))
    }
}

fn copy_failed(group: ResourceGroup, path: &Path, e: std::io::Error) -> DeployError {
    DeployError::CopyFailed {
        group,
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

type CopyResult = Result<usize, (PathBuf, std::io::Error)>;

/// Shelf definitions are the top-level files of the shelves directory, or the
/// file itself when the source is a single file.
fn copy_shelf_files(source: &Path, dest: &Path) -> CopyResult {
    if source.is_file() {
        let target = dest.join(source.file_name().unwrap_or_default());
        fs::copy(source, &target).map_err(|e| (target, e))?;
        return Ok(1);
    }

    let entries = fs::read_dir(source).map_err(|e| (source.to_path_buf(), e))?;
    let mut copied = 0;
    for entry in entries {
        let entry = entry.map_err(|e| (source.to_path_buf(), e))?;
        if !entry.path().is_file() {
            continue;
        }
        let target = dest.join(entry.file_name());
        fs::copy(entry.path(), &target).map_err(|e| (target, e))?;
        copied += 1;
    }
    Ok(copied)
}

/// Recursive copy that keeps the source layout and never deletes.
fn merge_tree<F>(source: &Path, dest: &Path, include: F) -> CopyResult
where
    F: Fn(&Path) -> bool,
{
    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            (path, std::io::Error::other(e.to_string()))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| (entry.path().to_path_buf(), std::io::Error::other(e.to_string())))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| (target, e))?;
        } else if entry.file_type().is_file() && include(entry.path()) {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| (parent.to_path_buf(), e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| (target, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}
