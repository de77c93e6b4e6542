use std::process::ExitCode;

fn main() -> ExitCode {
    warrantly_cli::run()
}
