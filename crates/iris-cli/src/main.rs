use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use iris_classifiers::training::run_training;
use iris_classifiers::IrisFeatures;
use iris_cli::client::{BackendClient, ClientError};
use iris_cli::config::{train_config_from_arguments, DashboardConfig, ServiceConfig};
use iris_cli::{dashboard, service};

fn config_arg(help: &'static str) -> Arg {
    Arg::new("config")
        .help(help)
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn host_arg() -> Arg {
    Arg::new("host")
        .long("host")
        .help("Interface to bind. Overrides the host in the configuration file.")
        .value_parser(clap::builder::NonEmptyStringValueParser::new())
        .value_hint(ValueHint::Hostname)
}

fn port_arg() -> Arg {
    Arg::new("port")
        .short('p')
        .long("port")
        .help("Port to listen on. Overrides the port in the configuration file.")
        .value_parser(clap::value_parser!(u16))
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or(
            "IRIS_LOG",
            "error,iris=info,iris_cli=info,iris_classifiers=info",
        ))
        .init();

    let matches = Command::new("iris")
        .version(clap::crate_version!())
        .about("\u{1FABB} Iris CLI - train, serve and query an Iris species classifier")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train the SVM classifier and write the model bundle")
                .arg(config_arg("Path to training configuration file"))
                .arg(
                    Arg::new("data_path")
                        .short('d')
                        .long("data")
                        .help(
                            "Path to the labeled CSV. Overrides the data file \
                             specified in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help(
                            "File path that the trained model bundle will be written to. \
                             Overrides the model path specified in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("kernel")
                        .short('k')
                        .long("kernel")
                        .help("SVM kernel. Overrides the kernel in the configuration file.")
                        .value_parser(["gauss", "rbf", "linear", "poly"]),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP prediction service (POST /predict, GET /health)")
                .arg(config_arg("Path to service configuration file"))
                .arg(host_arg())
                .arg(port_arg())
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the model bundle. Trained on first use if missing.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data_path")
                        .short('d')
                        .long("data")
                        .help("Training CSV used when the model bundle has to be trained.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("preload")
                        .long("preload")
                        .help("Load (or train) the model before accepting requests.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Run the browser dashboard in front of a prediction service")
                .arg(config_arg("Path to dashboard configuration file"))
                .arg(host_arg())
                .arg(port_arg())
                .arg(
                    Arg::new("backend_url")
                        .short('b')
                        .long("backend-url")
                        .help("Base URL of the prediction service.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Url),
                )
                .arg(
                    Arg::new("assets_dir")
                        .short('a')
                        .long("assets")
                        .help("Directory holding the species illustrations.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Send one prediction request to a running service")
                .arg(
                    Arg::new("url")
                        .short('u')
                        .long("url")
                        .help("Base URL of the prediction service.")
                        .default_value("http://127.0.0.1:8080")
                        .value_hint(ValueHint::Url),
                )
                .arg(
                    Arg::new("features")
                        .help("sepal_length sepal_width petal_length petal_width (cm). \
                               Defaults to 5.1 3.5 1.4 0.2.")
                        .num_args(4)
                        .value_names(["SL", "SW", "PL", "PW"])
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(f64)),
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
        Some(("dashboard", sub_m)) => handle_dashboard(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if let Some(path) = config_path {
        log::info!("[Iris::Train] Training from config: {:?}", path);
    }

    let config = train_config_from_arguments(config_path, matches)?;
    match run_training(&config) {
        Ok(bundle) => {
            println!(
                "Model written to {} (train accuracy {:.4}, test accuracy {:.4})",
                config.model_path.display(),
                bundle.metrics.train_accuracy,
                bundle.metrics.test_accuracy
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    let config = ServiceConfig::from_arguments(matches.get_one("config"), matches)?;
    log::info!(
        "[Iris::Serve] Model {} (data {})",
        config.model.model_path.display(),
        config.model.data_path.display()
    );
    runtime()?.block_on(service::serve(config))
}

fn handle_dashboard(matches: &ArgMatches) -> Result<()> {
    let config = DashboardConfig::from_arguments(matches.get_one("config"), matches)?;
    runtime()?.block_on(dashboard::serve(config))
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let url: &String = matches
        .get_one("url")
        .context("--url has a default value")?;
    let features = match matches.get_many::<f64>("features") {
        Some(values) => match values.copied().collect::<Vec<f64>>().as_slice() {
            [sl, sw, pl, pw] => IrisFeatures::new(*sl, *sw, *pl, *pw),
            other => anyhow::bail!("Expected 4 feature values, got {}", other.len()),
        },
        None => IrisFeatures::canonical_sample(),
    };

    let client = BackendClient::new(url, None)?;
    match client.predict(&features.to_map()) {
        Ok(result) => {
            println!("Prediction Results:");
            println!("Species: {}", result.prediction);
            println!("Status: {}", result.status);
            Ok(())
        }
        Err(e @ ClientError::Status { .. }) => {
            println!("{}", e);
            std::process::exit(1)
        }
        Err(e) => Err(e.into()),
    }
}
