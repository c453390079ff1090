//! Command-line entry point for the Bender blog store.
//!
//! # Responsibility
//! - Bootstrap the process: config, logging, store, service.
//! - Dispatch one blog command and print the response envelope as JSON.
//!
//! # Environment
//! - `BENDER_CONFIG`: connection config path (default `conn-config.json`).
//! - `BENDER_LOG_LEVEL`: `trace|debug|info|warn|error`.
//! - `BENDER_LOG_DIR`: absolute log directory; logging is off when unset.

use bender_api::{ApiResponse, BlogApi};
use bender_core::{
    core_version, default_log_level, init_logging, open_store, PostService, SqliteExecutor,
    StoreConfig,
};
use log::{error, info};
use std::process::ExitCode;

const DEFAULT_CONFIG_PATH: &str = "conn-config.json";

const USAGE: &str = "usage: bender <command> [args]

commands:
  hello
  version
  list [fields] [limit] [offset]
  get <id> [fields]
  create <json-body>
  update <id> <json-body>
  delete <id>";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match command {
        "hello" => {
            println!("{}", bender_api::GREETING);
            return ExitCode::SUCCESS;
        }
        "version" => {
            println!("bender_core version={}", core_version());
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    if let Err(message) = setup_logging() {
        eprintln!("logging disabled: {message}");
    }

    let api = match build_api() {
        Ok(api) => api,
        Err(message) => {
            error!("event=bootstrap module=cli status=error error={message}");
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let rest = &args[1..];
    let arg = |index: usize| rest.get(index).map(String::as_str);
    let response = match (command, arg(0), arg(1)) {
        ("list", fields, limit) => api.list(fields, limit, arg(2)),
        ("get", Some(id), fields) => api.get(id, fields),
        ("create", Some(body), None) => api.create(body),
        ("update", Some(id), Some(body)) => api.update(id, body),
        ("delete", Some(id), None) => api.delete(id),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    print_response(&response)
}

fn setup_logging() -> Result<(), String> {
    let Ok(log_dir) = std::env::var("BENDER_LOG_DIR") else {
        return Ok(());
    };
    let level =
        std::env::var("BENDER_LOG_LEVEL").unwrap_or_else(|_| default_log_level().to_string());
    init_logging(&level, &log_dir).map_err(|err| err.to_string())
}

fn build_api() -> Result<BlogApi<SqliteExecutor>, String> {
    let config_path =
        std::env::var("BENDER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = StoreConfig::load(&config_path).map_err(|err| err.to_string())?;
    let conn = open_store(&config).map_err(|err| err.to_string())?;
    info!(
        "event=bootstrap module=cli status=ok config={config_path} schema={} table={}",
        config.schema, config.table
    );

    let service = PostService::from_config(SqliteExecutor::new(conn), &config);
    Ok(BlogApi::new(service))
}

fn print_response(response: &ApiResponse) -> ExitCode {
    match serde_json::to_string_pretty(response) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("failed to render response: {err}");
            return ExitCode::FAILURE;
        }
    }

    if response.status < 400 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
