use stat_miner::ops::telemetry;
use stat_miner::refinery::{extract_table, interpret, StatDocument};
use std::process::ExitCode;

const USAGE: &str = "usage:
  stat-miner table <file> <table-id> [--comments]
  stat-miner play \"<description>\" <surname>";

fn run(args: &[String]) -> Result<String, String> {
    match args {
        [command, file, table_id, rest @ ..] if command == "table" => {
            let markup = std::fs::read_to_string(file).map_err(|e| format!("{file}: {e}"))?;
            let doc = if rest.iter().any(|flag| flag == "--comments") {
                StatDocument::parse_with_comments(&markup)
            } else {
                StatDocument::parse(&markup)
            };
            let table = extract_table(&doc, table_id).map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&table.records).map_err(|e| e.to_string())
        }
        [command, description, surname] if command == "play" => {
            let outcome = interpret(description, surname);
            serde_json::to_string_pretty(&outcome).map_err(|e| e.to_string())
        }
        _ => Err(USAGE.to_string()),
    }
}

fn main() -> ExitCode {
    telemetry::init_tracing_with_level("warn");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            tracing::error!(error = %message, "Command failed");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
