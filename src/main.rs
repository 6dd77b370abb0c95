mod cli;
mod config;
mod deploy;
mod error;
mod launch;
mod locate;
mod manifest;
mod platform;
mod scan;
mod shelf;
mod status;
mod types;
mod version;

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::{load_settings, locate_preference_root, resolve_paths};
use deploy::{bundles_for, icon_dir_name, BundleDeployer};
use launch::{LaunchResult, Launcher};
use locate::SearchContext;
use manifest::ManifestWriter;
use platform::get_host_layout;
use scan::{Discovery, VersionScanner};
use shelf::ShelfButton;
use std::process::ExitCode;
use types::{DeployPaths, DeployerSettings, HostLayout, ToolIdentity};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut settings = load_settings().unwrap_or_else(|e| {
        tracing::warn!("Ignoring settings file: {:#}", e);
        DeployerSettings::default()
    });
    if cli.no_pause {
        settings.pause_on_exit = false;
    }
    if cli.no_launch {
        settings.launch = false;
    }

    let layout = get_host_layout();

    status::step("Locating Maya user directory");
    let preference_root = match locate_preference_root() {
        Ok(path) => path,
        Err(e) => {
            debug_assert!(e.is_fatal());
            tracing::error!("{}", e);
            status::failure(&e);
            status::pause(settings.pause_on_exit);
            return Ok(ExitCode::FAILURE);
        }
    };
    status::done(&preference_root.display().to_string());

    let resolved = resolve_paths(cli.root.as_deref(), preference_root, &layout)
        .and_then(|paths| {
            let identity = ToolIdentity::from_distribution(&paths.distribution_root)?;
            Ok((paths, identity))
        });
    let (paths, identity) = match resolved {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("{:#}", e);
            status::error(&format!("{:#}", e));
            status::pause(settings.pause_on_exit);
            return Ok(ExitCode::FAILURE);
        }
    };

    let warnings = deploy_all(&paths, &identity, &settings, layout);

    status::success_banner(warnings);
    status::pause(settings.pause_on_exit);
    Ok(ExitCode::SUCCESS)
}

/// Scan, deploy, write the manifest and launch. Returns the number of
/// warnings; none of these steps can abort the run.
fn deploy_all(
    paths: &DeployPaths,
    identity: &ToolIdentity,
    settings: &DeployerSettings,
    layout: HostLayout,
) -> usize {
    let ctx = SearchContext::new(layout, paths.install_root.clone());
    let mut warnings = 0;

    status::step("Scanning for installed Maya versions");
    let discovery = VersionScanner::new(paths.preference_root.clone(), ctx.clone()).discover();
    report_discovery(&discovery);

    status::step(&format!(
        "Deploying {} {} from {}",
        identity.tool_name,
        identity.version,
        paths.distribution_root.display()
    ));
    warnings += deploy_versions(&discovery, paths, identity, settings);

    status::step("Writing module manifest");
    let manifest_writer = ManifestWriter::new(paths.modules_dir.clone());
    match manifest_writer.write(identity, &paths.distribution_root) {
        Ok(path) => status::done(&path.display().to_string()),
        Err(e) => {
            tracing::warn!("{}", e);
            status::skipped(&e);
            warnings += 1;
        }
    }

    let icon_dir = paths
        .distribution_root
        .join(icon_dir_name(&paths.distribution_root));
    let button = ShelfButton::for_tool(identity, &settings.shelf_tab_name, &icon_dir);
    tracing::debug!("Shelf registration call: {}", button.mel_invocation());
    status::done(&format!(
        "Shelf button '{}' (icon {}) will be registered on shelf '{}'",
        button.label, button.icon, button.shelf_tab_name
    ));

    status::step("Launching Maya");
    if !settings.launch {
        status::note("Launch disabled");
    } else {
        let result = Launcher::new(ctx).launch(discovery.newest);
        for reason in result.warnings() {
            tracing::warn!("{}", reason);
            status::skipped(reason);
        }
        warnings += result.warnings().len();
        if let LaunchResult::Started { path, pid, .. } = &result {
            status::done(&format!("Started {} (pid {})", path.display(), pid));
        }
    }

    warnings
}

fn report_discovery(discovery: &Discovery) {
    if discovery.candidates.is_empty() {
        status::note("No Maya version found");
        return;
    }
    for candidate in &discovery.candidates {
        let executable = candidate
            .executable
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no executable".to_string());
        let prefs = if candidate.has_preference_dir {
            "preferences"
        } else {
            "no preferences"
        };
        status::done(&format!("Maya {} ({}, {})", candidate.token, prefs, executable));
    }
    if let Some(newest) = discovery.newest {
        status::done(&format!("Newest version: {}", newest));
    }
}

fn deploy_versions(
    discovery: &Discovery,
    paths: &DeployPaths,
    identity: &ToolIdentity,
    settings: &DeployerSettings,
) -> usize {
    for candidate in discovery.candidates.iter().filter(|c| !c.has_preference_dir) {
        status::note(&format!(
            "Maya {}: preference directory not initialised",
            candidate.token
        ));
    }

    let targets: Vec<_> = discovery.deployable().collect();
    if targets.is_empty() {
        status::note("No Maya preference directory to deploy into");
        return 0;
    }

    let deployer = BundleDeployer::new(
        &identity.tool_name,
        bundles_for(&paths.distribution_root),
        &settings.icon_extensions,
    );

    let pb = status::deploy_progress(targets.len());
    let mut warnings = 0;
    for candidate in targets {
        pb.set_message(format!("Maya {}", candidate.token));
        let result = deployer.deploy(candidate);
        tracing::info!(
            "Maya {}: {} file(s) deployed",
            result.token,
            result.files_copied()
        );
        pb.suspend(|| status::deployed(&result));
        warnings += result.warnings().count();
        pb.inc(1);
    }
    pb.finish_and_clear();

    warnings
}
