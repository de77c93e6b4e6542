pub mod bootstrap;
pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "warrantly",
    about = "Warrantly support agent CLI",
    long_about = "Run the interactive warranty support agent, one-shot queries, config \
inspection, and readiness checks.",
    after_help = "Examples:\n  warrantly repl\n  warrantly ask \"status for SN49812J\"\n  warrantly doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start the interactive warranty support session")]
    Repl,
    #[command(about = "Run one query through the turn pipeline and print the response")]
    Ask {
        #[arg(help = "Free-text customer query")]
        query: String,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, dataset, FAQ index, and LLM readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Repl => commands::repl::run(),
        Command::Ask { query } => commands::ask::run(&query),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}
