//! User-facing status lines
//!
//! Every step prints one line to stdout whether it ran or was skipped.
//! Diagnostics go through `tracing` instead.

use crate::deploy::{DeployResult, GroupOutcome};
use crate::error::DeployError;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

pub fn step(message: &str) {
    println!("{} {}", style("==>").cyan().bold(), message);
}

pub fn done(message: &str) {
    println!("  {} {}", style("ok").green(), message);
}

pub fn note(message: &str) {
    println!("  {} {}", style("skip").yellow(), message);
}

pub fn skipped(warning: &DeployError) {
    println!("  {} {}", style("skip").yellow(), warning);
}

pub fn deployed(result: &DeployResult) {
    for (group, outcome) in &result.outcomes {
        match outcome {
            GroupOutcome::Copied { files } => {
                done(&format!("Maya {}: {} ({} file(s))", result.token, group, files))
            }
            GroupOutcome::MissingSource(e) | GroupOutcome::Failed(e) => {
                println!("  {} Maya {}: {}", style("skip").yellow(), result.token, e)
            }
        }
    }
}

/// Spinner shown while versions are deployed. Hidden when stderr is not a
/// terminal.
pub fn deploy_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(progress_style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{pos}/{len}] {msg}")
    {
        pb.set_style(progress_style);
    }
    pb
}

pub fn success_banner(warnings: usize) {
    println!();
    println!("{}", style("----------------------------------------").dim());
    if warnings == 0 {
        println!("{}", style("Installation completed successfully.").green().bold());
    } else {
        println!(
            "{} {}",
            style("Installation completed successfully.").green().bold(),
            style(format!("({} warning(s))", warnings)).yellow()
        );
    }
    println!("{}", style("----------------------------------------").dim());
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}

pub fn failure(error: &DeployError) {
    self::error(&error.to_string());
    eprintln!("Start Maya at least once so it creates its user directory, then run this again.");
}

/// Wait for a key press so a double-clicked console window stays open.
pub fn pause(enabled: bool) {
    let term = Term::stdout();
    if !enabled || !term.is_term() {
        return;
    }
    println!("Press any key to close...");
    if let Err(e) = term.read_key() {
        tracing::debug!("Could not read key: {}", e);
    }
}
