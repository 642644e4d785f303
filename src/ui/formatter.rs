//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;
use std::path::Path;

use crate::domain::{GateResult, TagRecovery};
use crate::error::ReleaseError;
use crate::warning::ReleaseWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a bold header announcing a pipeline stage.
pub fn display_stage(name: &str) {
    println!("\n{}", style(name).bold());
}

/// Display a release warning to the user.
pub fn display_warning(warning: &ReleaseWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Print the outcome of a single quality gate.
pub fn display_gate_result(result: &GateResult) {
    if result.passed {
        display_success(&format!("gate '{}' passed", result.name));
    } else {
        eprintln!(
            "{} gate '{}' failed",
            style("✗").red(),
            style(&result.name).bold()
        );
        for line in result.message.lines() {
            eprintln!("    {}", style(line).dim());
        }
    }
}

/// Report a terminal failure with its category label.
pub fn display_failure(error: &ReleaseError) {
    eprintln!(
        "\n{} {}",
        style(format!("[{}]", error.category())).red().bold(),
        error
    );
}

/// Show which tagging sub-steps are already done and what is left to run by hand.
///
/// Nothing is rolled back, so the operator must finish or undo these manually
/// before re-running the release.
pub fn display_tag_recovery(recovery: &TagRecovery) {
    if recovery.is_clean() {
        display_status("No tagging side effects were made; it is safe to re-run.");
        return;
    }

    if !recovery.completed.is_empty() {
        let done: Vec<&str> = recovery.completed.iter().map(|s| s.name()).collect();
        eprintln!(
            "{} already completed: {}",
            style("→").yellow(),
            done.join(", ")
        );
    }

    if let Some(restore) = recovery.restore_command() {
        eprintln!(
            "{} To abandon this release, restore the manifest:\n  {}",
            style("→").yellow(),
            style(restore).cyan()
        );
    }

    eprintln!("{} To finish this release by hand, run:", style("→").yellow());
    for command in recovery.remaining_commands() {
        eprintln!("  {}", style(command).cyan());
    }
}

/// Tell the operator exactly what to write into the manifest.
pub fn display_manual_version_edit(manifest: &Path, old: &str, new: &str) {
    println!(
        "\n{} Edit {} and change the package version:\n  From: {}\n  To:   {}",
        style("→").yellow(),
        style(manifest.display()).bold(),
        style(old).red(),
        style(new).green()
    );
}
