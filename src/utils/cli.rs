//! Command-line argument parsing and help for ncview.
//!
//! Subcommands (`pin`, `unpin`, `info`) are recognized first, then flags, then a single
//! positional path. When invoked with no arguments ncview browses the current directory.

use crate::config::Config;
use crate::session::SessionStore;
use crate::utils::{config_dir, shorten_home_path};

use std::path::Path;

/// What `main` should do after argument handling.
#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    RunApp,
    RunAppAtPath(String),
    Exit,
    ExitFailure,
}

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    Browse(Option<String>),
    Pin { path: String, name: Option<String> },
    Unpin { path: String },
    Info,
    Init,
    Help,
    Version,
    Invalid(String),
}

/// Parses the arguments following the program name.
pub fn parse_args(args: &[String]) -> CliCommand {
    let Some(first) = args.first() else {
        return CliCommand::Browse(None);
    };

    match first.as_str() {
        "pin" => parse_pin(&args[1..]),
        "unpin" => match &args[1..] {
            [path] => CliCommand::Unpin { path: path.clone() },
            _ => CliCommand::Invalid("usage: ncview unpin <path>".into()),
        },
        "info" if args.len() == 1 => CliCommand::Info,
        _ if args.len() > 1 => {
            CliCommand::Invalid("ncview accepts only one path or option at a time".into())
        }
        "-v" | "--version" => CliCommand::Version,
        "-h" | "--help" => CliCommand::Help,
        "--init" => CliCommand::Init,
        arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
            CliCommand::Browse(Some(arg.to_string()))
        }
        arg => CliCommand::Invalid(format!("unknown argument: {arg}")),
    }
}

fn parse_pin(rest: &[String]) -> CliCommand {
    let mut path = None;
    let mut name = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-n" | "--name" => match iter.next() {
                Some(n) => name = Some(n.clone()),
                None => return CliCommand::Invalid("missing value for --name".into()),
            },
            other if path.is_none() && !other.starts_with('-') => path = Some(other.to_string()),
            other => return CliCommand::Invalid(format!("unexpected argument: {other}")),
        }
    }
    match path {
        Some(path) => CliCommand::Pin { path, name },
        None => CliCommand::Invalid("usage: ncview pin <path> [-n NAME]".into()),
    }
}

/// Reads `std::env::args`, runs one-shot commands and tells `main` what to do next.
pub fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();
    run_command(parse_args(&args), &SessionStore::open_default())
}

pub fn run_command(command: CliCommand, store: &SessionStore) -> CliAction {
    match command {
        CliCommand::Browse(None) => CliAction::RunApp,
        CliCommand::Browse(Some(path)) => CliAction::RunAppAtPath(path),
        CliCommand::Version => {
            println!("ncview {}", env!("CARGO_PKG_VERSION"));
            CliAction::Exit
        }
        CliCommand::Help => {
            print_help();
            CliAction::Exit
        }
        CliCommand::Init => {
            let path = Config::default_path();
            match Config::generate_default(&path) {
                Ok(()) => {
                    println!("Default config generated at {}", path.display());
                    CliAction::Exit
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    CliAction::ExitFailure
                }
            }
        }
        CliCommand::Pin { path, name } => {
            let target = Path::new(&path);
            if !target.is_dir() {
                eprintln!("Error: '{path}' is not a directory");
                return CliAction::ExitFailure;
            }
            match store.add_pin(target, name) {
                Ok(true) => println!("Updated pin: {path}"),
                Ok(false) => println!("Pinned: {path}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return CliAction::ExitFailure;
                }
            }
            CliAction::Exit
        }
        CliCommand::Unpin { path } => match store.remove_pin(Path::new(&path)) {
            Ok(true) => {
                println!("Unpinned: {path}");
                CliAction::Exit
            }
            Ok(false) => {
                eprintln!("Not pinned: {path}");
                CliAction::ExitFailure
            }
            Err(e) => {
                eprintln!("Error: {e}");
                CliAction::ExitFailure
            }
        },
        CliCommand::Info => {
            print_info(store);
            CliAction::Exit
        }
        CliCommand::Invalid(msg) => {
            eprintln!("Error: {msg}");
            eprintln!("Try --help for available options");
            CliAction::ExitFailure
        }
    }
}

fn print_info(store: &SessionStore) {
    println!("ncview {}", env!("CARGO_PKG_VERSION"));
    println!("Config dir : {}", shorten_home_path(config_dir()));
    println!("Config file: {}", shorten_home_path(Config::default_path()));
    let last = store
        .load_last_dir()
        .map(shorten_home_path)
        .unwrap_or_else(|| "-".into());
    println!("Last dir   : {last}");
    println!("Pins       : {}", store.load_pins().len());
    println!("History    : {}", store.load_history().len());
}

fn print_help() {
    println!(
        r#"ncview - browse directories and preview tabular, structured and text files

USAGE:
  ncview [PATH]
  ncview pin <PATH> [-n NAME]
  ncview unpin <PATH>
  ncview info

PATH:
  Directory to open (defaults to the current directory)

OPTIONS:
      --init              Generate the default configuration file
  -h, --help              Print help information
  -v, --version           Print the installed version

ENVIRONMENT:
  NCVIEW_CONFIG           Override the config file path
  NCVIEW_CONFIG_DIR       Override the config directory (pins, history, log)
  NCVIEW_LOG              Log filter, e.g. "debug" (default: warn)
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_browses_cwd() {
        assert_eq!(parse_args(&[]), CliCommand::Browse(None));
        assert_eq!(
            parse_args(&args(&["/tmp"])),
            CliCommand::Browse(Some("/tmp".into()))
        );
    }

    #[test]
    fn subcommands_win_over_paths() {
        assert_eq!(
            parse_args(&args(&["pin", "/data", "-n", "Data"])),
            CliCommand::Pin {
                path: "/data".into(),
                name: Some("Data".into())
            }
        );
        assert_eq!(
            parse_args(&args(&["unpin", "/data"])),
            CliCommand::Unpin {
                path: "/data".into()
            }
        );
        assert_eq!(parse_args(&args(&["info"])), CliCommand::Info);
    }

    #[test]
    fn invalid_arguments() {
        assert!(matches!(
            parse_args(&args(&["pin"])),
            CliCommand::Invalid(_)
        ));
        assert!(matches!(
            parse_args(&args(&["pin", "/a", "-n"])),
            CliCommand::Invalid(_)
        ));
        assert!(matches!(
            parse_args(&args(&["/a", "/b"])),
            CliCommand::Invalid(_)
        ));
        assert!(matches!(
            parse_args(&args(&["--bogus"])),
            CliCommand::Invalid(_)
        ));
    }

    #[test]
    fn flags() {
        assert_eq!(parse_args(&args(&["--version"])), CliCommand::Version);
        assert_eq!(parse_args(&args(&["-h"])), CliCommand::Help);
        assert_eq!(parse_args(&args(&["--init"])), CliCommand::Init);
    }

    #[test]
    fn pin_and_unpin_commands_update_store() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = SessionStore::new(dir.path().join("cfg"));
        let target = dir.path().to_string_lossy().into_owned();

        let action = run_command(
            CliCommand::Pin {
                path: target.clone(),
                name: None,
            },
            &store,
        );
        assert_eq!(action, CliAction::Exit);
        assert_eq!(store.load_pins().len(), 1);

        let action = run_command(CliCommand::Unpin { path: target.clone() }, &store);
        assert_eq!(action, CliAction::Exit);
        let action = run_command(CliCommand::Unpin { path: target }, &store);
        assert_eq!(action, CliAction::ExitFailure);
        Ok(())
    }

    #[test]
    fn pin_rejects_non_directories() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = SessionStore::new(dir.path().join("cfg"));
        let action = run_command(
            CliCommand::Pin {
                path: dir.path().join("missing").to_string_lossy().into_owned(),
                name: None,
            },
            &store,
        );
        assert_eq!(action, CliAction::ExitFailure);
        assert!(store.load_pins().is_empty());
        Ok(())
    }
}
