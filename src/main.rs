use log::error;
use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;
use tower_checkers::*;

const USAGE: &str = "\
Usage: tower-checkers [--json] [--board] [RECORD]

Replays a tower checkers game record (from RECORD or stdin) and prints the
surviving towers, or the first rule violation.

  --json    print the result as JSON
  --board   print the board to stderr after every turn

Set RUST_LOG=debug to trace every move.";

fn parse_args() -> Result<(SessionConfig, Option<String>), String> {
    let mut config = SessionConfig::default();
    let mut path = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => config.format = ReportFormat::Json,
            "--board" => config.show_board = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option `{}`\n\n{}", flag, USAGE));
            }
            _ if path.is_some() => return Err(format!("more than one record given\n\n{}", USAGE)),
            _ => path = Some(arg),
        }
    }

    Ok((config, path))
}

fn main() -> ExitCode {
    env_logger::init();

    let (config, path) = match parse_args() {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };
    let format = config.format;

    let result = match &path {
        Some(path) => match File::open(path) {
            Ok(file) => run(BufReader::new(file), config),
            Err(err) => {
                error!("cannot open {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => run(io::stdin().lock(), config),
    };

    match result {
        Ok(report) => match report.render(format) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("cannot render report: {}", err);
                ExitCode::FAILURE
            }
        },
        // A rule violation is a normal outcome of replaying a record
        Err(SessionError::Violation {
            turn,
            side,
            token,
            error,
        }) => {
            match format {
                ReportFormat::Text => println!("{}", error),
                ReportFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "violation": error.to_string(),
                        "turn": turn,
                        "side": side.name(),
                        "move": token,
                    })
                ),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
