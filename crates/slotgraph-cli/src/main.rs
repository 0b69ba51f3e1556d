//! `slotgraph` command line
//!
//! Loads a seed set into an in-memory store and runs one engine operation
//! against it, printing pretty JSON on stdout. Logs go to stderr.

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

fn cli() -> Command {
    Command::new("slotgraph")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Audit, repair and explore a slotgraph document set")
        .subcommand_required(true)
        .arg(
            Arg::new("seed")
                .long("seed")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON seed file loaded into the store"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML engine configuration"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Log per-document work"),
        )
        .subcommand(Command::new("validate").about("Validate every instance and its parent link"))
        .subcommand(
            Command::new("repair")
                .about("Rebuild parent links from slot references, then re-audit")
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the repaired document set to this file"),
                ),
        )
        .subcommand(
            Command::new("chain")
                .about("Print the type chain, base first")
                .arg(Arg::new("type").required(true).help("Type id")),
        )
        .subcommand(
            Command::new("slots")
                .about("Print the effective slots of a type")
                .arg(Arg::new("type").required(true).help("Type id")),
        )
        .subcommand(
            Command::new("instantiate")
                .about("Create an instance of a type")
                .arg(Arg::new("type").required(true).help("Type id"))
                .arg(Arg::new("id").required(true).help("New instance id"))
                .arg(
                    Arg::new("preview")
                        .long("preview")
                        .action(ArgAction::SetTrue)
                        .help("Build transient documents only"),
                ),
        )
        .subcommand(
            Command::new("model")
                .about("Print the effective model of a document")
                .arg(Arg::new("id").required(true).help("Type or instance id")),
        )
        .subcommand(
            Command::new("expand")
                .about("Flatten a composite into leaf placements")
                .arg(Arg::new("id").required(true).help("Type or instance id"))
                .arg(
                    Arg::new("location")
                        .long("location")
                        .allow_hyphen_values(true)
                        .help("Starting location, \"x y z rx ry rz\""),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let seed = matches
        .get_one::<PathBuf>("seed")
        .context("--seed is required")?;
    let config = matches.get_one::<PathBuf>("config");
    let session = commands::Session::open(seed, config.map(PathBuf::as_path)).await?;

    let outcome = session.execute(matches).await?;
    let rendered = serde_json::to_string_pretty(&outcome.output)?;
    println!("{rendered}");
    Ok(outcome.success)
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match run(&matches).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(2)
        }
    }
}
