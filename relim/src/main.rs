//! Relim - Release Limits Calculator
//!
//! Commands:
//! - calc: Compute the release limits of a declared content for every shown rule
//! - rules: List loaded rules, their visibility and skipped records
//! - info: Print the usage note and the info text of every shown rule
//! - settings: Show or change precision and hidden rules
//!
//! The rule file is a JSON array of rule records. A malformed record is
//! reported and skipped; an unreadable or malformed file aborts the command.

mod error;
mod input;
mod render;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use relim_core::Unit;
use relim_rules::{LoadReport, RuleRegistry};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::render::Renderer;
use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "relim", version, about = "Release limits calculator for declared batch content")]
struct Cli {
    /// Rule file (default: $RELIM_RULES or ./rules.json)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Settings file (default: $RELIM_SETTINGS or ./relim-settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute release limits for a declared content
    Calc(CalcArgs),
    /// List loaded rules
    Rules {
        #[arg(long)]
        json: bool,
    },
    /// Show the info text of the shown rules
    Info,
    /// Show or change settings
    Settings(SettingsArgs),
}

#[derive(Debug, Args)]
struct CalcArgs {
    /// Declared content; point or comma as decimal separator
    declared: String,

    /// Unit of the declared content: "g/l" or "%w/w"
    #[arg(long, default_value = "g/l", value_parser = parse_unit)]
    unit: Unit,

    /// Density of the product in g/ml (default 1.0)
    #[arg(long)]
    density: Option<String>,

    /// The batch content is not uniformly distributed
    #[arg(long)]
    heterogeneous: bool,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    /// Decimal places of rendered values
    #[arg(long)]
    precision: Option<u32>,

    /// Hide a rule by name
    #[arg(long, value_name = "NAME")]
    hide: Vec<String>,

    /// Show a previously hidden rule
    #[arg(long, value_name = "NAME")]
    show: Vec<String>,
}

fn parse_unit(s: &str) -> Result<Unit, String> {
    s.parse::<Unit>().map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let rules_path = settings::rules_path(cli.rules);
    let settings_path = settings::settings_path(cli.settings);

    let (registry, skipped) = load_rules(&rules_path)?.into_parts();
    let mut settings = Settings::load(&settings_path)?;
    let hidden = settings.hidden_set();

    match cli.command {
        Command::Calc(args) => {
            let declared = input::parse_declared(&args.declared, args.unit)?;
            let density = input::parse_density(args.density.as_deref())?;
            input::check_declared(declared, density)?;
            let homogeneous = !args.heterogeneous;

            let results = registry.evaluate_visible(&hidden, declared, density, homogeneous);
            if let Some(bad) = results.iter().find(|e| !e.is_representable(density)) {
                return Err(AppError::OutOfRange { rule: bad.rule.name.clone() });
            }

            let renderer = Renderer::new(settings.precision);
            if args.json {
                let json = renderer.render_json(declared, density, homogeneous, &results);
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                print!("{}", renderer.render(declared, density, homogeneous, &results));
            }
        }
        Command::Rules { json } => {
            let is_hidden = |rule: &relim_rules::Rule| hidden.contains(&rule.name);
            if json {
                let value = render::render_rules_json(registry.iter(), is_hidden, &skipped);
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print!("{}", render::render_rules(registry.iter(), is_hidden, &skipped));
            }
        }
        Command::Info => {
            println!("{}", render::render_info(registry.visible(&hidden)));
        }
        Command::Settings(args) => {
            let before = settings.clone();
            if let Some(precision) = args.precision {
                settings.set_precision(precision)?;
            }
            for name in &args.hide {
                if registry.get(name).is_none() {
                    warn!(rule = %name, "hiding a rule that is not loaded");
                }
                settings.hide(name);
            }
            for name in &args.show {
                settings.show(name);
            }
            if settings != before {
                settings.save(&settings_path)?;
                info!(path = %settings_path.display(), "settings saved");
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Read and parse the rule file; skipped records are logged by the registry
fn load_rules(path: &Path) -> Result<LoadReport, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::RulesFile {
        path: path.to_path_buf(),
        source,
    })?;
    RuleRegistry::load_document(&text).map_err(|source| AppError::Document {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_calc_arguments() {
        let cli = Cli::parse_from([
            "relim", "calc", "12,5", "--unit", "%w/w", "--density", "1,1", "--heterogeneous",
        ]);
        match cli.command {
            Command::Calc(args) => {
                assert_eq!(args.declared, "12,5");
                assert_eq!(args.unit, Unit::MassFraction);
                assert_eq!(args.density.as_deref(), Some("1,1"));
                assert!(args.heterogeneous);
                assert!(!args.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unit_defaults_to_mass_concentration() {
        let cli = Cli::parse_from(["relim", "calc", "100"]);
        match cli.command {
            Command::Calc(args) => assert_eq!(args.unit, Unit::MassConcentration),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_unit_is_rejected() {
        assert!(Cli::try_parse_from(["relim", "calc", "100", "--unit", "mg/l"]).is_err());
    }

    #[test]
    fn test_missing_rule_file() {
        let err = load_rules(Path::new("/nonexistent/relim/rules.json")).unwrap_err();
        assert!(matches!(err, AppError::RulesFile { .. }));
    }

    #[test]
    fn test_load_sample_rule_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/rules.json");
        let report = load_rules(&path).unwrap();
        assert_eq!(report.registry.len(), 3);
        assert!(report.skipped.is_empty());
    }
}
