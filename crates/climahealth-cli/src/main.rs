mod form;
mod render;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use climahealth_core::{AppError, Config};
use climahealth_pipeline::{AppContext, Pipeline};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::form::Submission;

/// ClimaHealth: climate-based disease predictor
#[derive(Parser, Debug)]
#[command(name = "climahealth", version, about)]
struct Cli {
    /// Run once for this city instead of showing the prompt
    #[arg(long)]
    city: Option<String>,

    /// Configuration file (default: <config dir>/climahealth/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Model artifact to load instead of the configured one
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,
}

/// Everything that has to succeed before the first submission is accepted.
fn startup(cli: &Cli) -> Result<AppContext, AppError> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(model) = &cli.model {
        config.model.path = model.clone();
    }

    climahealth_core::init(&config.logging.level)?;
    config.ensure_valid()?;

    AppContext::initialize(config)
}

async fn submit(pipeline: &Pipeline, city: &str) -> bool {
    println!("⏳ Fetching weather data...");
    match pipeline.run(city).await {
        Ok(report) => {
            println!("{}", render::report(&report));
            true
        }
        Err(e) => {
            println!("{}", render::failure(&e));
            false
        }
    }
}

async fn interactive(pipeline: &Pipeline, default_city: &str) -> Result<()> {
    println!("🌍 ClimaHealth – Climate-Based Disease Predictor");
    println!("Enter a city and get health insights based on weather conditions. Type 'quit' to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", form::prompt(default_city));
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            println!();
            break;
        };

        match form::parse(&line, default_city) {
            Submission::Quit => break,
            Submission::City(city) => {
                submit(pipeline, &city).await;
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match startup(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            eprintln!("❌ {}", e.user_message());
            eprintln!("   {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline::from_context(&ctx);

    if let Some(city) = &cli.city {
        return if submit(&pipeline, city).await {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    match interactive(&pipeline, &ctx.config().ui.default_city).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
