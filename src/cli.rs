use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::data::export_csv::{export_csv, export_file_name};
use crate::data::normalize::process_rows;
use crate::data::projections::{has_telefono, statistics};
use crate::refresh::{refresh_once, spawn_poller, AppContext, DEFAULT_REFRESH_SECS};
use crate::server;
use crate::source::{fetch_rows, SourceConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Fetch,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("fetch") => Some(Command::Fetch),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Fetch) => handle_fetch(),
        Some(Command::Export) => handle_export(args),
        None => {
            eprintln!("usage: padron <serve|fetch|export>");
            2
        }
    }
}

fn refresh_interval_from_env() -> Duration {
    let secs = env::var("PADRON_REFRESH_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_REFRESH_SECS);
    Duration::from_secs(secs)
}

/// Dashboard server: initial refresh, fixed-interval poller, HTTP loop.
/// A failed initial refresh is surfaced through the status and retried by
/// the poller; it does not stop the server from coming up.
fn handle_serve() -> i32 {
    let source = match SourceConfig::from_env() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };

    let ctx = Arc::new(AppContext::new(source));
    let _ = refresh_once(&ctx);

    if let Err(err) = spawn_poller(Arc::clone(&ctx), refresh_interval_from_env()) {
        eprintln!("failed to start poller: {err}");
        return 1;
    }

    let bind_addr = env::var("PADRON_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    if let Err(err) = server::run_server(ctx, &bind_addr) {
        eprintln!("server error: {err}");
        return 1;
    }
    0
}

/// One-shot fetch: pull all rows, normalize, print a summary.
fn handle_fetch() -> i32 {
    let source = match SourceConfig::from_env() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };

    let rows = match fetch_rows(&source) {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("fetch failed: {err}");
            return 1;
        }
    };

    let records = process_rows(&rows);
    let stats = statistics(&records);
    println!("filas recibidas:   {}", rows.len());
    println!("registros validos: {}", stats.total);
    println!("lideres:           {}", stats.lideres);
    println!("ciudades:          {}", stats.ciudades);
    println!("votos reportados:  {} ({}%)", stats.reportados, stats.porcentaje_reportado);
    0
}

/// One-shot export: fetch, normalize and write the CSV. The output path is
/// the optional third argument; default is the date-stamped download name.
fn handle_export(args: &[String]) -> i32 {
    let source = match SourceConfig::from_env() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };

    let rows = match fetch_rows(&source) {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("fetch failed: {err}");
            return 1;
        }
    };

    let records = process_rows(&rows);
    let csv = match export_csv(&records, has_telefono(&records)) {
        Ok(csv) => csv,
        Err(err) => {
            eprintln!("export failed: {err}");
            return 1;
        }
    };

    let default_name = export_file_name(Utc::now().date_naive());
    let path = args.get(2).map(String::as_str).unwrap_or(&default_name);
    if let Err(err) = fs::write(path, csv) {
        eprintln!("unable to write '{path}': {err}");
        return 1;
    }
    println!("{} registros exportados a {path}", records.len());
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_commands_parse() {
        assert_eq!(parse_command(&args(&["padron", "serve"])), Some(Command::Serve));
        assert_eq!(parse_command(&args(&["padron", "fetch"])), Some(Command::Fetch));
        assert_eq!(parse_command(&args(&["padron", "export"])), Some(Command::Export));
    }

    #[test]
    fn unknown_or_missing_commands_do_not_parse() {
        assert_eq!(parse_command(&args(&["padron"])), None);
        assert_eq!(parse_command(&args(&["padron", "simulate"])), None);
    }
}
