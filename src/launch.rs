use crate::error::DeployError;
use crate::locate::{default_chain, resolve, ExecutableStrategy, SearchContext};
use crate::version::VersionToken;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug)]
pub enum LaunchResult {
    /// Started, possibly without knowing which version it is
    Started {
        path: PathBuf,
        pid: u32,
        warnings: Vec<DeployError>,
    },
    /// Launch did not happen; carries the warnings that explain why
    Skipped(Vec<DeployError>),
}

impl LaunchResult {
    pub fn warnings(&self) -> &[DeployError] {
        match self {
            LaunchResult::Started { warnings, .. } | LaunchResult::Skipped(warnings) => warnings,
        }
    }
}

pub struct Launcher {
    ctx: SearchContext,
    strategies: Vec<Box<dyn ExecutableStrategy>>,
}

impl Launcher {
    pub fn new(ctx: SearchContext) -> Self {
        Self {
            ctx,
            strategies: default_chain(),
        }
    }

    /// Resolve the executable for `newest` without starting it.
    pub fn resolve(&self, newest: Option<VersionToken>) -> Option<PathBuf> {
        resolve(&self.strategies, &self.ctx, newest).map(|found| {
            tracing::info!(
                "Resolved Maya executable via {}: {}",
                found.strategy,
                found.path.display()
            );
            found.path
        })
    }

    /// Start the newest Maya as an independent process. The child is never
    /// waited on.
    pub fn launch(&self, newest: Option<VersionToken>) -> LaunchResult {
        let mut warnings = Vec::new();
        if newest.is_none() {
            warnings.push(DeployError::VersionNotDetected);
        }

        let Some(path) = self.resolve(newest) else {
            warnings.push(DeployError::ExecutableNotFound {
                product: self.ctx.layout.product.clone(),
            });
            return LaunchResult::Skipped(warnings);
        };

        match spawn_detached(&path) {
            Ok(pid) => {
                tracing::info!("Started {} (pid {})", path.display(), pid);
                LaunchResult::Started {
                    path,
                    pid,
                    warnings,
                }
            }
            Err(e) => {
                warnings.push(DeployError::LaunchFailed {
                    path,
                    reason: e.to_string(),
                });
                LaunchResult::Skipped(warnings)
            }
        }
    }
}

fn spawn_detached(path: &Path) -> std::io::Result<u32> {
    let mut cmd = Command::new(path);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if let Some(dir) = path.parent() {
        cmd.current_dir(dir);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    tracing::debug!("Executing: {:?}", path);
    let child = cmd.spawn()?;
    Ok(child.id())
}
