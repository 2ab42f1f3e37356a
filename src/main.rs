//! Binary entrypoint for the `firehose` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; settings may come from flags instead.
    let _ = dotenvy::dotenv();
    match firehose::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
