use warrantly_core::config::{AppConfig, LoadOptions};
use warrantly_core::session::TurnRequest;

use crate::bootstrap::{build_session_with_config, init_logging};
use crate::commands::CommandResult;

pub fn run(query: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config);

    let session = match build_session_with_config(config) {
        Ok(session) => session,
        Err(error) => return CommandResult::failure("ask", "bootstrap", error.to_string(), 3),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let outcome = runtime.block_on(
        session.runner.run_turn(TurnRequest { user_query: query, chat_history: &[] }),
    );

    match outcome {
        Ok(outcome) => CommandResult { exit_code: 0, output: outcome.response },
        Err(error) => CommandResult::failure("ask", "turn_failure", error.to_string(), 1),
    }
}
