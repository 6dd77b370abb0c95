use clap::Parser;
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // A git tag at HEAD means a release build
    if let Some(tag) = option_env!("MAYA_DEPLOYER_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("MAYA_DEPLOYER_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("MAYA_DEPLOYER_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup for clap's &'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

/// Every argument is optional: double-clicking runs with none, dropping a
/// tool folder onto the executable passes it as ROOT.
#[derive(Parser)]
#[command(name = "maya-deployer")]
#[command(about = "Deploys a Maya tool bundle into every installed Maya version")]
#[command(version = get_version())]
pub struct Cli {
    /// Tool distribution root (defaults to the folder containing this executable)
    pub root: Option<PathBuf>,

    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce log output to errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit without waiting for a key press
    #[arg(long)]
    pub no_pause: bool,

    /// Deploy only; do not start Maya afterwards
    #[arg(long)]
    pub no_launch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["maya-deployer"]).unwrap();
        assert!(cli.root.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(!cli.no_pause);
        assert!(!cli.no_launch);
    }

    #[test]
    fn test_dropped_folder() {
        let cli = Cli::try_parse_from(["maya-deployer", "/tools/CV_Scaler", "-vv", "--no-pause"])
            .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tools/CV_Scaler")));
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_pause);
    }
}
