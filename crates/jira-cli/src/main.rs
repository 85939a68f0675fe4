// crates/jira-cli/src/main.rs - CLI Application Entry Point
//
// Parses arguments, builds the context, and dispatches to a command handler.
// Handlers return a `Flow`: `Done` exits 0, `Exit(code)` exits with that code
// after every temporary file has been dropped.
//
// ARCHITECTURE OVERVIEW:
// ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────────┐
// │   User Input    │───▶│   CLI Parser     │───▶│  Command Handlers   │
// │ (clap commands) │    │ (main function)  │    │ (commands/*.rs)     │
// └─────────────────┘    └──────────────────┘    └─────────────────────┘
//                                 │                        │
//                                 ▼                        ▼
//                        ┌──────────────────┐    ┌─────────────────────┐
//                        │     Context      │    │     Services        │
//                        │ (config, client) │    │ (prompts, login)    │
//                        └──────────────────┘    └─────────────────────┘
//
// EXAMPLE USAGE:
// ```bash
// jira --endpoint https://jira.example.com login
// jira view PROJ-12
// jira edit PROJ-12 --editor "code --wait"
// jira create -p PROJ -i Task -o summary="Flaky test"
// jira comment PROJ-12 -m "Fixed in 1.4.2" --noedit
// ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use console::style;
use jira_core::Flow;
use tracing_subscriber::EnvFilter;

mod cli; // Command-line interface definitions
mod commands; // Command implementations
mod context; // Configuration, client and templates for one invocation
mod services; // Terminal prompts and interactive login

use cli::{Cli, Commands};
use context::Context;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli) {
        Ok(Flow::Done) => ExitCode::SUCCESS,
        Ok(Flow::Exit(exit)) => ExitCode::from(exit.code),
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Flow> {
    let ctx = Context::new(&cli.global, &cli.command)?;

    match cli.command {
        Commands::Login => commands::login::handle_login(&ctx),
        Commands::Logout => commands::login::handle_logout(&ctx),
        Commands::View { issue, .. } => commands::view::handle(&ctx, &issue),
        Commands::Edit { issue, .. } => commands::edit::handle(&ctx, &issue),
        Commands::Create { overrides, .. } => commands::create::handle(&ctx, overrides),
        Commands::Comment { issue, comment, .. } => commands::comment::handle(&ctx, &issue, comment),
    }
}

/// Log to stderr; `JIRA_LOG` takes an `EnvFilter` directive
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,jira=debug,jira_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("JIRA_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
