use std::io::{self, BufRead, Write};

use warrantly_core::config::{AppConfig, LoadOptions};
use warrantly_core::session::TurnRequest;

use crate::bootstrap::{build_session_with_config, init_logging};
use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "repl",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config);

    let session = match build_session_with_config(config) {
        Ok(session) => session,
        Err(error) => return CommandResult::failure("repl", "bootstrap", error.to_string(), 3),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "repl",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    println!("Warranty agent ready. Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut chat_history: Vec<(String, String)> = Vec::new();

    loop {
        print!("You: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                eprintln!("input error: {error}");
                break;
            }
        }

        let user_input = line.trim();
        if user_input.is_empty() {
            continue;
        }
        if matches!(user_input.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let outcome = runtime.block_on(session.runner.run_turn(TurnRequest {
            user_query: user_input,
            chat_history: &chat_history,
        }));

        match outcome {
            Ok(outcome) => {
                println!("Agent: {}", outcome.response);
                chat_history.push((user_input.to_string(), outcome.response));
            }
            Err(error) => {
                // A failing collaborator ends the turn, not the session.
                println!("Agent: Sorry, I ran into an error: {error}");
            }
        }
    }

    CommandResult { exit_code: 0, output: "Goodbye!".to_string() }
}
