//! xdupes - Fast concurrent duplicate file finder
//!
//! Entry point for the xdupes CLI application.

use clap::Parser;
use xdupes::{
    cli::Cli,
    config::DEFAULT_LOGLEVEL,
    error::{ExitCode, StructuredError},
    logging::init_logging,
};

fn report(err: &anyhow::Error, exit_code: ExitCode, json_errors: bool) {
    if json_errors {
        let structured = StructuredError::new(err, exit_code);
        match serde_json::to_string_pretty(&structured) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
        }
    } else {
        log::error!("{:#}", err);
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
        Err(err) => err.exit(),
    };
    let json_errors = cli.json_errors;

    let config = match xdupes::resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            init_logging(cli.requested_loglevel().unwrap_or(DEFAULT_LOGLEVEL));
            report(&anyhow::Error::from(err), ExitCode::GeneralError, json_errors);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };
    init_logging(config.loglevel);

    match xdupes::run_app(&cli, &config) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::for_error(&err);
            report(&err, exit_code, json_errors);
            std::process::exit(exit_code.as_i32());
        }
    }
}
