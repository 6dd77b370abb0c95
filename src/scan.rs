//! Discovery of installed Maya versions
//!
//! Tiers, highest priority first:
//! 1. version folders under the user preference root
//! 2. `<product><token>` folders under the system install root
//! 3. a recursive search of the install root (fallback)
//! 4. the executable search path (fallback)
//!
//! Tiers 3 and 4 only run when tiers 1-2 leave the newest version without an
//! executable, and tier 4 only when tier 3 does too. The newest version is a
//! pure maximum over every token any tier observed; tier order only decides
//! which executable path is kept.

use crate::locate::{
    find_versioned_executables, is_executable, ExecutableStrategy, SearchContext,
    SearchPathLookup, StrategyKind,
};
use crate::types::InstallationCandidate;
use crate::version::VersionToken;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    PreferenceRoot,
    InstallRoot,
    InstallSearch,
    SearchPath,
}

impl From<StrategyKind> for Tier {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::ConventionalPath => Tier::InstallRoot,
            StrategyKind::InstallRootSearch => Tier::InstallSearch,
            StrategyKind::SearchPathLookup => Tier::SearchPath,
        }
    }
}

/// One tier's report about one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub tier: Tier,
    pub token: VersionToken,
    pub root_path: PathBuf,
    pub has_preference_dir: bool,
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub newest: Option<VersionToken>,
    /// One entry per distinct token, ascending
    pub candidates: Vec<InstallationCandidate>,
}

impl Discovery {
    /// Candidates whose preference directory exists and may be deployed into.
    pub fn deployable(&self) -> impl Iterator<Item = &InstallationCandidate> {
        self.candidates.iter().filter(|c| c.has_preference_dir)
    }

    #[cfg(test)]
    pub fn candidate(&self, token: VersionToken) -> Option<&InstallationCandidate> {
        self.candidates.iter().find(|c| c.token == token)
    }
}

pub struct VersionScanner {
    preference_root: PathBuf,
    ctx: SearchContext,
}

impl VersionScanner {
    pub fn new(preference_root: PathBuf, ctx: SearchContext) -> Self {
        Self {
            preference_root,
            ctx,
        }
    }

    pub fn discover(&self) -> Discovery {
        let mut observations = scan_preference_root(&self.preference_root);
        observations.extend(scan_install_root(&self.ctx));

        let newest = newest_of(observations.iter().map(|o| o.token));
        let has_executable = |token: VersionToken| {
            observations
                .iter()
                .any(|o| o.token == token && o.executable.is_some())
        };

        if !newest.is_some_and(has_executable) {
            tracing::debug!("No executable for newest version yet, trying fallback tiers");
            observations.extend(self.scan_fallbacks(newest));
        }

        let discovery = merge(observations);
        match discovery.newest {
            Some(token) => tracing::info!(
                "Detected {} Maya version(s), newest {}",
                discovery.candidates.len(),
                token
            ),
            None => tracing::info!("No Maya version detected"),
        }
        discovery
    }

    fn scan_fallbacks(&self, newest: Option<VersionToken>) -> Vec<Observation> {
        let mut found: Vec<Observation> =
            find_versioned_executables(&self.ctx.install_root, &self.ctx.layout)
                .into_iter()
                .map(|(path, token)| self.executable_observation(Tier::InstallSearch, path, token))
                .collect();

        let newest = newest_of(newest.into_iter().chain(found.iter().map(|o| o.token)));
        if newest.is_some_and(|n| found.iter().any(|o| o.token == n)) {
            return found;
        }

        if let Some(exe) = SearchPathLookup.locate(&self.ctx, newest) {
            match exe.token {
                Some(token) => {
                    found.push(self.executable_observation(exe.strategy.into(), exe.path, token))
                }
                None => tracing::debug!(
                    "{} is not inside a versioned folder, leaving it to the launcher",
                    exe.path.display()
                ),
            }
        }
        found
    }

    fn executable_observation(
        &self,
        tier: Tier,
        executable: PathBuf,
        token: VersionToken,
    ) -> Observation {
        let root_path = install_folder_of(&executable, token, &self.ctx.layout.product)
            .unwrap_or_else(|| executable.clone());
        Observation {
            tier,
            token,
            root_path,
            has_preference_dir: false,
            executable: Some(executable),
        }
    }
}

/// Fold observed tokens into their maximum.
pub fn newest_of<I>(tokens: I) -> Option<VersionToken>
where
    I: IntoIterator<Item = VersionToken>,
{
    tokens
        .into_iter()
        .fold(None, |newest, token| Some(newest.map_or(token, |n: VersionToken| n.max(token))))
}

/// Collapse observations into one candidate per token.
///
/// Higher-priority tiers win the executable path; any preference-root
/// observation makes the candidate deployable and supplies its root path.
pub fn merge(mut observations: Vec<Observation>) -> Discovery {
    observations.sort_by_key(|o| o.tier);
    let newest = newest_of(observations.iter().map(|o| o.token));

    let mut by_token: BTreeMap<VersionToken, InstallationCandidate> = BTreeMap::new();
    for obs in observations {
        let candidate = by_token
            .entry(obs.token)
            .or_insert_with(|| InstallationCandidate {
                token: obs.token,
                root_path: obs.root_path.clone(),
                has_preference_dir: false,
                executable: None,
            });

        if obs.has_preference_dir && !candidate.has_preference_dir {
            candidate.has_preference_dir = true;
            candidate.root_path = obs.root_path;
        }
        if candidate.executable.is_none() {
            candidate.executable = obs.executable;
        }
    }

    Discovery {
        newest,
        candidates: by_token.into_values().collect(),
    }
}

fn scan_preference_root(preference_root: &Path) -> Vec<Observation> {
    let entries = match fs::read_dir(preference_root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "Could not read Maya user directory {}: {}",
                preference_root.display(),
                e
            );
            return Vec::new();
        }
    };

    entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            match name.parse::<VersionToken>() {
                Ok(token) => Some(Observation {
                    tier: Tier::PreferenceRoot,
                    token,
                    root_path: entry.path(),
                    has_preference_dir: true,
                    executable: None,
                }),
                Err(_) => {
                    tracing::trace!("Skipping non-version folder '{}'", name);
                    None
                }
            }
        })
        .collect()
}

fn scan_install_root(ctx: &SearchContext) -> Vec<Observation> {
    let entries = match fs::read_dir(&ctx.install_root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(
                "Install root {} not readable: {}",
                ctx.install_root.display(),
                e
            );
            return Vec::new();
        }
    };

    entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name();
            let token = VersionToken::from_product_folder(name.to_str()?, &ctx.layout.product)?;
            let executable = entry.path().join(&ctx.layout.executable_rel_path);
            Some(Observation {
                tier: Tier::InstallRoot,
                token,
                root_path: entry.path(),
                has_preference_dir: false,
                executable: is_executable(&executable).then_some(executable),
            })
        })
        .collect()
}

fn install_folder_of(executable: &Path, token: VersionToken, product: &str) -> Option<PathBuf> {
    executable
        .ancestors()
        .find(|dir| {
            dir.file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| VersionToken::from_product_folder(n, product))
                == Some(token)
        })
        .map(Path::to_path_buf)
}
