use std::process::ExitCode;

use clap::Parser;

use release_pipeline::cli::{run_release_workflow, ReleaseWorkflowArgs};
use release_pipeline::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-pipeline",
    version,
    about = "Validate, gate, bump, tag and publish a Rust crate release"
)]
struct Args {
    #[arg(
        value_name = "BUMP",
        help = "Version bump: major, minor or patch. Omit to publish the current version"
    )]
    bump: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let workflow_args = ReleaseWorkflowArgs {
        config_path: args.config,
        bump: args.bump,
    };

    match run_release_workflow(workflow_args) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}
