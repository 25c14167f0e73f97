//! Gridcalc - command-mode front end for the spreadsheet engine

mod command;
mod config;
mod error;

use anyhow::Context;
use command::Session;
use gridcalc_core::Sheet;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS]");
    eprintln!();
    eprintln!("Runs sheet commands from -c arguments, or from stdin when none are given.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run a command (can be repeated)");
    eprintln!("  --config <FILE>           Load sheet limits from a TOML file");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  set <CELL> <TEXT>   clear <CELL>   get <CELL>   text <CELL>");
    eprintln!("  deps <CELL>         size           values       texts");
}

fn run(session: &mut Session, commands: &[String]) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if commands.is_empty() {
        let stdin = io::stdin();
        for (idx, line) in stdin.lock().lines().enumerate() {
            let line = line.context("failed to read stdin")?;
            session.run_line(idx + 1, &line, &mut out)?;
        }
    } else {
        for (idx, line) in commands.iter().enumerate() {
            session.run_line(idx + 1, line, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut commands: Vec<String> = Vec::new();
    let mut config_file: Option<PathBuf> = None;
    let mut no_config = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a value");
                    std::process::exit(1);
                }
                commands.push(args[i].to_string());
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            "--no-config" => {
                no_config = true;
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (limits, warnings) = config::load_limits(config_file.as_ref(), no_config);
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    log::debug!("sheet limits: {:?}", limits);

    let mut session = Session::new(Sheet::with_limits(limits));
    if let Err(e) = run(&mut session, &commands) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
