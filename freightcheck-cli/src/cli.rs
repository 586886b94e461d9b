//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use freightcheck_core::role::Role;

use crate::scenarios::ScenarioName;

/// freightcheck -- end-to-end workflow checks for the logistics REST API.
///
/// Use `freightcheck <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "freightcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the freightcheck.toml configuration file.
    #[arg(short, long, default_value = "freightcheck.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in as a role and print its role id.
    Login(LoginArgs),

    /// Run one end-to-end scenario.
    Scenario(ScenarioArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

/// Role keys accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Customer account.
    Lkz,
    /// Forwarder account.
    Lke,
    /// Carrier account.
    Lkp,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Lkz => Role::Customer,
            RoleArg::Lke => Role::Expeditor,
            RoleArg::Lkp => Role::Carrier,
        }
    }
}

// ---- login ----

/// Obtain a credential for one role.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Role to log in as.
    #[arg(long, value_enum)]
    pub role: RoleArg,
}

// ---- scenario ----

/// Run one scenario against the configured API.
#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Scenario to run.
    #[arg(value_enum)]
    pub name: ScenarioName,

    /// Role to run as (default depends on the scenario).
    #[arg(long, value_enum)]
    pub role: Option<RoleArg>,

    /// Number of cargo places to create (mass-orders only).
    #[arg(long)]
    pub count: Option<usize>,
}

// ---- config ----

/// Manage freightcheck configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, api, poll, roles).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_login_role() {
        let cli = Cli::try_parse_from(["freightcheck", "login", "--role", "lkp"])
            .expect("should parse 'login --role lkp'");
        match cli.command {
            Commands::Login(args) => assert_eq!(Role::from(args.role), Role::Carrier),
            _ => panic!("expected Login command"),
        }
    }

    #[test]
    fn test_cli_parse_login_requires_role() {
        let args = Cli::try_parse_from(["freightcheck", "login"]);
        assert!(args.is_err(), "login without --role should fail");
    }

    #[test]
    fn test_cli_parse_login_unknown_role_fails() {
        let args = Cli::try_parse_from(["freightcheck", "login", "--role", "admin"]);
        assert!(args.is_err(), "unknown role should fail");
    }

    #[test]
    fn test_cli_parse_scenario_defaults() {
        let cli = Cli::try_parse_from(["freightcheck", "scenario", "ftl-take"])
            .expect("should parse 'scenario ftl-take'");
        match cli.command {
            Commands::Scenario(args) => {
                assert_eq!(args.name, ScenarioName::FtlTake);
                assert!(args.role.is_none(), "role should default to None");
                assert!(args.count.is_none(), "count should default to None");
            }
            _ => panic!("expected Scenario command"),
        }
    }

    #[test]
    fn test_cli_parse_scenario_with_role_and_count() {
        let cli = Cli::try_parse_from([
            "freightcheck",
            "scenario",
            "mass-orders",
            "--role",
            "lke",
            "--count",
            "8",
        ])
        .expect("should parse scenario with options");
        match cli.command {
            Commands::Scenario(args) => {
                assert_eq!(args.name, ScenarioName::MassOrders);
                assert_eq!(args.role, Some(RoleArg::Lke));
                assert_eq!(args.count, Some(8));
            }
            _ => panic!("expected Scenario command"),
        }
    }

    #[test]
    fn test_cli_parse_unknown_scenario_fails() {
        let args = Cli::try_parse_from(["freightcheck", "scenario", "teleport"]);
        assert!(args.is_err(), "unknown scenario should fail");
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["freightcheck", "config", "show", "--section", "poll"])
            .expect("should parse config show with section");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => assert_eq!(section, Some("poll".to_owned())),
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_validate() {
        let cli = Cli::try_parse_from(["freightcheck", "config", "validate"])
            .expect("should parse 'config validate'");
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs {
                action: ConfigAction::Validate
            })
        ));
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "freightcheck",
            "-c",
            "/custom/freightcheck.toml",
            "--log-level",
            "debug",
            "--output",
            "json",
            "config",
            "validate",
        ])
        .expect("should parse global flags");
        assert_eq!(cli.config, PathBuf::from("/custom/freightcheck.toml"));
        assert_eq!(cli.log_level, Some("debug".to_owned()));
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        let args = Cli::try_parse_from(["freightcheck"]);
        assert!(args.is_err(), "should fail when no command provided");
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "freightcheck");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for expected in ["login", "scenario", "config"] {
            assert!(
                subcommands.contains(&expected),
                "should have '{expected}' subcommand"
            );
        }
    }
}
