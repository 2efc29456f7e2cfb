use std::path::PathBuf;
use std::sync::Arc;

use studio_lib::config::StudioConfig;
use studio_lib::db::Database;
use studio_lib::settings::SettingsService;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Reveal(String),
    Set(Vec<(String, Option<String>)>),
    Unset(String),
    Init,
}

fn main() {
    studio_lib::init_tracing();
    if let Err(error) = run() {
        eprintln!("studio-config failed: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut config = StudioConfig::default();
    config.apply_env_overrides();
    let mut db_path: Option<PathBuf> = None;
    let mut env_file: Option<PathBuf> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            print_help();
            return Ok(());
        }

        if let Some(value) = arg.strip_prefix("--db=") {
            db_path = Some(PathBuf::from(value));
            continue;
        }
        if arg == "--db" {
            let value = args
                .next()
                .ok_or_else(|| "--db requires a value".to_string())?;
            db_path = Some(PathBuf::from(value));
            continue;
        }

        if let Some(value) = arg.strip_prefix("--env-file=") {
            env_file = Some(PathBuf::from(value));
            continue;
        }
        if arg == "--env-file" {
            let value = args
                .next()
                .ok_or_else(|| "--env-file requires a value".to_string())?;
            env_file = Some(PathBuf::from(value));
            continue;
        }

        if arg.starts_with("--") {
            return Err(format!("unknown argument: {arg}"));
        }
        positional.push(arg);
    }

    let command = parse_command(positional)?;
    let db_path = db_path.unwrap_or_else(|| config.db_path());
    let env_file = env_file.unwrap_or_else(|| config.env_file_path());

    let db = Database::open(&db_path)
        .map_err(|error| format!("failed to open '{}': {error}", db_path.display()))?;
    let service = SettingsService::new(Arc::new(db), env_file);

    match command {
        Command::List => {
            let entries = service.list_effective().map_err(|error| error.to_string())?;
            print_json(&entries)?;
        }
        Command::Reveal(key) => match service.reveal(&key).map_err(|error| error.to_string())? {
            Some(value) => println!("{value}"),
            None => return Err(format!("config item {key} not found")),
        },
        Command::Set(edits) => {
            let outcome = service.upsert(edits).map_err(|error| error.to_string())?;
            println!("{}", outcome.message());
        }
        Command::Unset(key) => {
            if service.remove(&key).map_err(|error| error.to_string())? {
                println!("removed {key}");
            } else {
                println!("{key} was not stored");
            }
        }
        Command::Init => {
            let imported = service
                .ensure_initialized()
                .map_err(|error| error.to_string())?;
            println!(
                "imported {imported} config item(s) from {}",
                service.env_file().display()
            );
        }
    }
    Ok(())
}

fn parse_command(positional: Vec<String>) -> Result<Command, String> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(Command::List);
    };
    let rest: Vec<String> = words.collect();

    match name.as_str() {
        "list" => expect_no_args("list", &rest).map(|_| Command::List),
        "init" => expect_no_args("init", &rest).map(|_| Command::Init),
        "reveal" => single_key("reveal", rest).map(Command::Reveal),
        "unset" => single_key("unset", rest).map(Command::Unset),
        "set" => {
            if rest.is_empty() {
                return Err("set expects at least one KEY=VALUE".to_string());
            }
            rest.iter()
                .map(|pair| parse_assignment(pair))
                .collect::<Result<Vec<_>, _>>()
                .map(Command::Set)
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn expect_no_args(command: &str, rest: &[String]) -> Result<(), String> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(format!("{command} takes no arguments"))
    }
}

fn single_key(command: &str, rest: Vec<String>) -> Result<String, String> {
    match rest.as_slice() {
        [key] => Ok(key.clone()),
        _ => Err(format!("{command} expects exactly one KEY")),
    }
}

fn parse_assignment(pair: &str) -> Result<(String, Option<String>), String> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{pair}'"))?;
    if key.trim().is_empty() {
        return Err(format!("missing key in '{pair}'"));
    }
    Ok((key.trim().to_string(), Some(value.to_string())))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to serialize output: {error}"))?;
    println!("{json}");
    Ok(())
}

fn print_help() {
    println!("Studio config items");
    println!();
    println!("Usage:");
    println!("  studio-config [options] <command>");
    println!();
    println!("Commands:");
    println!("  list                    Effective config items, sensitive values masked (default)");
    println!("  reveal <KEY>            Print the unmasked value of one item");
    println!("  set KEY=VALUE...        Store one or more items");
    println!("  unset <KEY>             Drop a stored item so the env file value applies");
    println!("  init                    Import env file items missing from the database");
    println!();
    println!("Options:");
    println!("  --db <path>             Database file (default: $STUDIO_DATA_DIR/studio.db)");
    println!("  --env-file <path>       Dotenv file (default: .env)");
}
