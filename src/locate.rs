//! Executable resolution for the host application
//!
//! Locating Maya is an ordered chain of strategies evaluated until one
//! succeeds:
//! - the conventional `<installRoot>/<product><token>/<exe>` path
//! - a recursive search of the install root
//! - a lookup on the executable search path (`PATH`)
//!
//! The launcher runs the whole chain. The scanner reuses the recursive
//! search and the `PATH` lookup as its fallback discovery tiers.

use crate::types::HostLayout;
use crate::version::VersionToken;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How deep below the install root a versioned executable may sit
const MAX_SEARCH_DEPTH: usize = 6;

/// Inputs shared by every strategy.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub layout: HostLayout,
    pub install_root: PathBuf,
    pub search_path: Option<OsString>,
}

impl SearchContext {
    pub fn new(layout: HostLayout, install_root: PathBuf) -> Self {
        Self {
            layout,
            install_root,
            search_path: std::env::var_os("PATH"),
        }
    }

    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    ConventionalPath,
    InstallRootSearch,
    SearchPathLookup,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::ConventionalPath => "conventional path",
            StrategyKind::InstallRootSearch => "install root search",
            StrategyKind::SearchPathLookup => "PATH lookup",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedExecutable {
    pub path: PathBuf,
    /// Version folder the executable was found in, if any
    pub token: Option<VersionToken>,
    pub strategy: StrategyKind,
}

pub trait ExecutableStrategy {
    fn kind(&self) -> StrategyKind;

    fn locate(&self, ctx: &SearchContext, newest: Option<VersionToken>) -> Option<LocatedExecutable>;
}

pub struct ConventionalPath;

impl ExecutableStrategy for ConventionalPath {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ConventionalPath
    }

    fn locate(&self, ctx: &SearchContext, newest: Option<VersionToken>) -> Option<LocatedExecutable> {
        let token = newest?;
        let path = conventional_path(&ctx.install_root, &ctx.layout, token)?;
        Some(LocatedExecutable {
            path,
            token: Some(token),
            strategy: self.kind(),
        })
    }
}

pub struct InstallRootSearch;

impl ExecutableStrategy for InstallRootSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::InstallRootSearch
    }

    fn locate(&self, ctx: &SearchContext, _newest: Option<VersionToken>) -> Option<LocatedExecutable> {
        let (path, token) = search_install_root(&ctx.install_root, &ctx.layout)?;
        Some(LocatedExecutable {
            path,
            token: Some(token),
            strategy: self.kind(),
        })
    }
}

pub struct SearchPathLookup;

impl ExecutableStrategy for SearchPathLookup {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SearchPathLookup
    }

    fn locate(&self, ctx: &SearchContext, _newest: Option<VersionToken>) -> Option<LocatedExecutable> {
        let path = search_path(ctx.search_path.as_ref()?, &ctx.layout)?;
        let token = token_from_path(&path, &ctx.layout.product);
        Some(LocatedExecutable {
            path,
            token,
            strategy: self.kind(),
        })
    }
}

/// The launcher's resolution order.
pub fn default_chain() -> Vec<Box<dyn ExecutableStrategy>> {
    vec![
        Box::new(ConventionalPath),
        Box::new(InstallRootSearch),
        Box::new(SearchPathLookup),
    ]
}

/// Evaluate strategies in order and stop at the first hit.
pub fn resolve(
    strategies: &[Box<dyn ExecutableStrategy>],
    ctx: &SearchContext,
    newest: Option<VersionToken>,
) -> Option<LocatedExecutable> {
    strategies.iter().find_map(|strategy| {
        let found = strategy.locate(ctx, newest);
        match &found {
            Some(exe) => tracing::debug!("{} resolved {}", strategy.kind(), exe.path.display()),
            None => tracing::debug!("{} found nothing", strategy.kind()),
        }
        found
    })
}

/// `<installRoot>/<Product><token>/<exe>`, trying the capitalised folder name
/// first (Windows) and then the lowercase one (Linux, macOS).
pub fn conventional_path(
    install_root: &Path,
    layout: &HostLayout,
    token: VersionToken,
) -> Option<PathBuf> {
    product_folder_names(&layout.product, token)
        .into_iter()
        .map(|folder| install_root.join(folder).join(&layout.executable_rel_path))
        .find(|path| is_executable(path))
}

fn product_folder_names(product: &str, token: VersionToken) -> Vec<String> {
    let mut capitalised = product.to_string();
    if let Some(first) = capitalised.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    let lower = format!("{}{}", product.to_lowercase(), token);
    let upper = format!("{}{}", capitalised, token);
    if upper == lower {
        vec![lower]
    } else {
        vec![upper, lower]
    }
}

/// The executable with the highest version anywhere below the install root.
/// On a tie the first path in walk order wins.
pub fn search_install_root(
    install_root: &Path,
    layout: &HostLayout,
) -> Option<(PathBuf, VersionToken)> {
    find_versioned_executables(install_root, layout)
        .into_iter()
        .reduce(|best, next| if next.1 > best.1 { next } else { best })
}

/// Every product executable below the install root that sits inside a
/// `<product><token>` folder, in case-insensitive walk order.
pub fn find_versioned_executables(
    install_root: &Path,
    layout: &HostLayout,
) -> Vec<(PathBuf, VersionToken)> {
    let Some(exe_name) = layout.executable_name() else {
        return Vec::new();
    };
    if !install_root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(install_root)
        .max_depth(MAX_SEARCH_DEPTH)
        .sort_by(|a, b| {
            let a = a.file_name().to_string_lossy().to_lowercase();
            let b = b.file_name().to_string_lossy().to_lowercase();
            a.cmp(&b)
        })
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_string_lossy()
                    .eq_ignore_ascii_case(exe_name)
                && is_executable(entry.path())
        })
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(install_root).ok()?;
            let token = token_from_path(relative, &layout.product)?;
            Some((entry.path().to_path_buf(), token))
        })
        .collect()
}

/// First directory on the search path that contains the product executable.
pub fn search_path(search_path: &OsString, layout: &HostLayout) -> Option<PathBuf> {
    let exe_name = layout.executable_name()?;
    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(exe_name))
        .find(|candidate| is_executable(candidate))
}

/// The innermost `<product><token>` component of a path.
pub fn token_from_path(path: &Path, product: &str) -> Option<VersionToken> {
    path.components().rev().find_map(|component| {
        let name = component.as_os_str().to_str()?;
        VersionToken::from_product_folder(name, product)
    })
}

pub fn is_executable(path: &Path) -> bool {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return false,
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        let _ = metadata;
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        matches!(ext.to_lowercase().as_str(), "exe" | "cmd" | "bat")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::get_host_layout;
    use crate::test_fixtures::fake_executable;
    use tempfile::TempDir;

    fn token(s: &str) -> VersionToken {
        s.parse().unwrap()
    }

    #[test]
    fn test_conventional_path_requires_existing_executable() {
        let temp = TempDir::new().unwrap();
        let layout = get_host_layout();
        assert_eq!(conventional_path(temp.path(), &layout, token("2025")), None);

        let exe = fake_executable(
            &temp
                .path()
                .join("Maya2025")
                .join(&layout.executable_rel_path),
        );
        assert_eq!(
            conventional_path(temp.path(), &layout, token("2025")),
            Some(exe)
        );
    }

    #[test]
    fn test_install_root_search_prefers_highest_folder() {
        let temp = TempDir::new().unwrap();
        let layout = get_host_layout();
        let exe_name = layout.executable_name().unwrap();

        fake_executable(&temp.path().join("maya2022").join("x").join(exe_name));
        let newer = fake_executable(&temp.path().join("Maya2024").join("y").join(exe_name));
        // Not a versioned folder
        fake_executable(&temp.path().join("tools").join(exe_name));

        let (path, found) = search_install_root(temp.path(), &layout).unwrap();
        assert_eq!(path, newer);
        assert_eq!(found, token("2024"));
    }

    #[test]
    fn test_install_root_search_skips_older_nested_install() {
        let temp = TempDir::new().unwrap();
        let layout = get_host_layout();
        let exe_name = layout.executable_name().unwrap();

        let newest = fake_executable(&temp.path().join("Maya2025").join("bin").join(exe_name));
        let nested = fake_executable(
            &temp
                .path()
                .join("vendor")
                .join("Maya2020")
                .join("bin")
                .join(exe_name),
        );

        let (path, found) = search_install_root(temp.path(), &layout).unwrap();
        assert_eq!(path, newest);
        assert_eq!(found, token("2025"));

        let all = find_versioned_executables(temp.path(), &layout);
        assert_eq!(all, vec![(newest, token("2025")), (nested, token("2020"))]);
    }

    #[test]
    fn test_install_root_search_ignores_unversioned_executables() {
        let temp = TempDir::new().unwrap();
        let layout = get_host_layout();
        let exe_name = layout.executable_name().unwrap();
        fake_executable(&temp.path().join("Maya").join("bin").join(exe_name));

        assert_eq!(search_install_root(temp.path(), &layout), None);
        assert_eq!(search_install_root(&temp.path().join("missing"), &layout), None);
    }

    #[test]
    fn test_search_path_first_match_wins() {
        let temp = TempDir::new().unwrap();
        let layout = get_host_layout();
        let exe_name = layout.executable_name().unwrap();

        let first = fake_executable(&temp.path().join("maya2023").join("bin").join(exe_name));
        fake_executable(&temp.path().join("maya2026").join("bin").join(exe_name));

        let path_var = std::env::join_paths([
            temp.path().join("empty"),
            temp.path().join("maya2023").join("bin"),
            temp.path().join("maya2026").join("bin"),
        ])
        .unwrap();

        assert_eq!(search_path(&path_var, &layout), Some(first.clone()));
        assert_eq!(token_from_path(&first, "maya"), Some(token("2023")));
    }

    #[test]
    fn test_chain_stops_at_first_success() {
        let temp = TempDir::new().unwrap();
        let layout = get_host_layout();
        let exe_name = layout.executable_name().unwrap();

        let nested = fake_executable(
            &temp
                .path()
                .join("Autodesk")
                .join("maya2025")
                .join("bin")
                .join(exe_name),
        );
        let ctx = SearchContext::new(layout, temp.path().to_path_buf()).with_search_path(None);

        let found = resolve(&default_chain(), &ctx, Some(token("2025"))).unwrap();
        assert_eq!(found.path, nested);
        assert_eq!(found.strategy, StrategyKind::InstallRootSearch);

        let empty = TempDir::new().unwrap();
        let ctx = SearchContext {
            install_root: empty.path().to_path_buf(),
            ..ctx
        };
        assert_eq!(resolve(&default_chain(), &ctx, None), None);
    }

    #[test]
    fn test_product_folder_names() {
        assert_eq!(
            product_folder_names("maya", token("2025")),
            vec!["Maya2025".to_string(), "maya2025".to_string()]
        );
    }
}
