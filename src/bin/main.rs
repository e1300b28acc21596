use std::process::ExitCode;

use clap::Parser;
use deploy_annotator::commands::annotate::AnnotateCommand;
use deploy_annotator::commands::check_credentials::CheckCredentialsCommand;
use deploy_annotator::config::{self, RunConfig};
use deploy_annotator::git;
use deploy_annotator::http::client::HttpClient;
use deploy_annotator::orchestrator::exit_code;
use deploy_annotator::parameters::{Commands, LogLevel};
use deploy_annotator::AnnotatorError;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "deploy-annotator", version, about)]
struct Cli {
    /// Maximum level of the logs written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::from(cli.log_level))
        .init();

    let http_client = match HttpClient::new() {
        Ok(client) => client,
        Err(e) => {
            error!("error creating http client: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Annotate {
            dry_run,
            color,
            api_base_url,
        } => {
            let config = RunConfig::from_env().map(|config| {
                let config = config
                    .with_commit_message(git::last_commit_message())
                    .with_color(color.into());
                match api_base_url {
                    Some(url) => config.with_api_base_url(url),
                    None => config,
                }
            });
            let result = AnnotateCommand::new(http_client)
                .with_dry_run(dry_run)
                .annotate(config);
            ExitCode::from(exit_code(&result))
        }
        Commands::CheckCredentials => {
            let result = config::credential_from_env()
                .map_err(AnnotatorError::from)
                .and_then(|credential| CheckCredentialsCommand::new(http_client).check(&credential));
            match result {
                Ok(check) => {
                    info!("{check}");
                    println!("{check}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("error checking credentials: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
