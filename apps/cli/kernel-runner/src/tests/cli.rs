// Unit tests for command-line parsing

use crate::cli::{Cli, Command, DEFAULT_CODE};

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

/// **VALUE**: Verifies the clap definition is internally consistent.
#[test]
fn given_cli_definition_when_debug_asserted_then_valid() {
    Cli::command().debug_assert();
}

/// **VALUE**: Verifies `run` with no flags uses the default code and no kernel override.
#[test]
fn given_bare_run_when_parsed_then_defaults_applied() {
    // WHEN: Parsing `kernel-runner run`
    let cli = Cli::try_parse_from(["kernel-runner", "run"]).unwrap();

    // THEN: Default code, no overrides
    match cli.command {
        Command::Run(args) => {
            assert_eq!(args.code, DEFAULT_CODE);
            assert!(args.kernel_dir.is_none());
        }
        Command::List => panic!("expected run"),
    }
    assert!(cli.config_dir.is_none());
}

/// **VALUE**: Verifies global directory flags are accepted after the subcommand.
#[test]
fn given_run_with_all_flags_when_parsed_then_values_captured() {
    let cli = Cli::try_parse_from([
        "kernel-runner",
        "run",
        "--kernel-dir",
        "/k",
        "--code",
        "1 + 1",
        "--config-dir",
        "/c",
        "--log-dir",
        "/l",
    ])
    .unwrap();

    assert_eq!(cli.config_dir(), PathBuf::from("/c"));
    assert_eq!(cli.log_dir(), PathBuf::from("/l"));
    match cli.command {
        Command::Run(args) => {
            assert_eq!(args.kernel_dir, Some(PathBuf::from("/k")));
            assert_eq!(args.code, "1 + 1");
        }
        Command::List => panic!("expected run"),
    }
}

/// **VALUE**: Verifies a missing subcommand is a usage error.
#[test]
fn given_no_subcommand_when_parsed_then_error() {
    assert!(Cli::try_parse_from(["kernel-runner"]).is_err());
}
