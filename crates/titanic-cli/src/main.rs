use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::path::{Path, PathBuf};

use titanic_cli::logging::init_logging;
use titanic_cli::serve::{run_server, ServeConfig};
use titanic_cli::train::input::TrainConfig;
use titanic_cli::train::trainer;

fn main() -> Result<()> {
    let matches = Command::new("titanic")
        .version(clap::crate_version!())
        .about("\u{1F6A2} Titanic survival classifiers: train models and serve predictions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train the random forest and SVC models and write their artifacts")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON training configuration file. Defaults are used when omitted.")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the passenger CSV. Overrides the training data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_prefix")
                        .short('p')
                        .long("model_prefix")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Prefix for the saved model and scaler files, e.g. models/titanic \
                             gives models/titanic_rf.bin and models/titanic_scaler_rf.bin.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("metrics_file")
                        .short('o')
                        .long("metrics_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("CSV file the held-out metrics table is written to.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("log_file")
                        .long("log_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("File that receives a copy of the log output.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("models")
                        .short('m')
                        .long("models")
                        .help("Comma-separated model types to train.")
                        .value_parser(["rf", "svc"])
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve predictions over HTTP from previously trained artifacts")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Address to listen on. Overrides TITANIC_HOST.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Hostname),
                )
                .arg(
                    Arg::new("port")
                        .long("port")
                        .help("Port to listen on. Overrides TITANIC_PORT.")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("model_prefix")
                        .short('p')
                        .long("model_prefix")
                        .help("Prefix the artifacts were saved under. Overrides TITANIC_MODEL_PREFIX.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("no_auth")
                        .long("no-auth")
                        .help("Disable the X-API-Key check (local use only).")
                        .action(ArgAction::SetTrue),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("serve", sub_m)) => handle_serve(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let params = TrainConfig::from_arguments(config_path, matches)?;
    init_logging(params.log_file.as_deref().map(Path::new))?;

    match config_path {
        Some(path) => log::info!("[Titanic::Train] Training from config: {:?}", path),
        None => log::info!("[Titanic::Train] No config provided; using defaults."),
    }

    match trainer::run_training(&params) {
        Ok(summary) => {
            for report in &summary.models {
                log::info!(
                    "[Titanic::Train] {} | best {} | {}",
                    report.model_type.display_name(),
                    report.search.best_params,
                    report.metrics
                );
            }
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    init_logging(None)?;
    let config = ServeConfig::from_arguments(matches)?;
    log::info!(
        "[Titanic::Serve] Loading models from prefix {:?}",
        config.model_prefix
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    match runtime.block_on(run_server(config)) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Server failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
