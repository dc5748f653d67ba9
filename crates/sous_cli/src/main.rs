use std::process::ExitCode;

fn main() -> ExitCode {
    sous_cli::run()
}
