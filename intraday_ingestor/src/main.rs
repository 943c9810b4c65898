use anyhow::{Context, Result};
use clap::Parser;
use intraday_ingestor::{
    cli::{
        commands::{Cli, Commands},
        interactive::{confirm_again, prompt_request},
        params::{resolve_config, resolve_request},
    },
    config::AppConfig,
    io::sink::{SinkTarget, write_matrix},
    models::request_params::IntradayRequest,
    pipeline::{
        FetchOutcome, PipelineOptions, fetch_and_reshape,
        report::{ConsoleReporter, Reporter},
    },
    providers::{DataProvider, build_provider},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,intraday_ingestor=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_request(
    provider: &dyn DataProvider,
    request: &IntradayRequest,
    config: &AppConfig,
    cli: &Cli,
    reporter: &dyn Reporter,
) -> Result<()> {
    let options = PipelineOptions {
        on_duplicate: config.pivot.on_duplicate,
    };
    match fetch_and_reshape(provider, request, &options, reporter).await {
        FetchOutcome::Matrix(matrix) => {
            let target = SinkTarget::from_path(cli.output.output.clone());
            write_matrix(cli.output.format, target, request, &matrix)
                .await
                .with_context(|| format!("writing {} output", cli.output.format))?;
        }
        FetchOutcome::Empty(_) => println!("No data available for {}", request.symbol),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = resolve_config(&cli).context("loading configuration")?;
    debug!(?config, "resolved configuration");
    let provider = build_provider(&config)?;
    let reporter = ConsoleReporter;

    match &cli.command {
        Commands::Fetch {
            symbol,
            duration,
            interval,
        } => {
            let request = resolve_request(symbol.as_deref(), *duration, *interval, &config.defaults)?;
            run_request(provider.as_ref(), &request, &config, &cli, &reporter).await?;
        }

        Commands::Interactive => loop {
            let defaults = config.defaults.clone();
            let request = tokio::task::spawn_blocking(move || prompt_request(&defaults))
                .await
                .context("prompt task panicked")??;
            info!(%request, "fetch requested");

            // A failed write is reported, the loop carries on.
            if let Err(e) = run_request(provider.as_ref(), &request, &config, &cli, &reporter).await {
                eprintln!("error: {e:#}");
            }

            let again = tokio::task::spawn_blocking(confirm_again)
                .await
                .context("prompt task panicked")??;
            if !again {
                break;
            }
        },
    }

    Ok(())
}
