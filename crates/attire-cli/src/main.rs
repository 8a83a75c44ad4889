//! Interactive chat loop: reads user input, runs the pipeline, renders the
//! conversation. Errors become failed bot turns, never a crashed session.

mod cli;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use attire_chat::{ChatPipeline, ChatSession, InfoMode};
use attire_core::{AppConfig, Credential, ForecastParams};
use attire_recommend::{HostedModel, PromptTemplate};
use attire_weather::{ResponseCache, RetryConfig, WeatherClient, WeatherQuery};

use crate::cli::Args;

fn build_query(params: &ForecastParams) -> WeatherQuery {
    WeatherQuery {
        latitude: params.latitude,
        longitude: params.longitude,
        current: params.current.clone(),
        hourly: params.hourly.clone(),
        timezone: params.timezone.clone(),
        forecast_days: params.forecast_days,
        forecast_hours: params.forecast_hours,
    }
}

fn cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("attire")
        .join("forecast_cache.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    attire_core::init()?;

    let args = Args::parse();
    let (config, _) = AppConfig::load_validated(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let cache = if args.no_cache_file {
        ResponseCache::in_memory(config.cache.expire_after)
    } else {
        ResponseCache::open(cache_path(), config.cache.expire_after)
    };
    let retry = RetryConfig::new(config.cache.n_retries, config.cache.backoff_factor);
    let weather = WeatherClient::new(cache, retry).context("building weather client")?;

    let credential = Credential::load(&config.recommender.credential_file)
        .context("loading model credential")?;
    let template = PromptTemplate::load(&config.recommender.template_file)
        .context("loading prompt template")?;
    let mut model = HostedModel::new(
        &credential.key,
        &config.recommender.model,
        config.recommender.max_new_tokens,
        std::time::Duration::from_secs(config.recommender.timeout_secs),
    )
    .context("building generator")?;
    if let Some(api_url) = &config.recommender.api_url {
        model = model.with_api_url(api_url);
    }

    let pipeline = ChatPipeline::new(
        weather,
        build_query(&config.params),
        template,
        Arc::new(model),
    );

    run_chat(&pipeline, args.mode).await
}

async fn run_chat(pipeline: &ChatPipeline, initial_mode: InfoMode) -> Result<()> {
    let mut session = ChatSession::new();
    let mut mode = initial_mode;

    println!("Weather Attire Assistant");
    println!("Mode: {}. Type a message, or /help for commands.", mode.as_str());

    let stdin = io::stdin();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" => break,
            "/help" => {
                println!("/new  /mode  /save <path>  /sessions  /clear-all  /quit");
            }
            "/new" => {
                session.new_chat();
                println!("Started a new chat. {} archived session(s).", session.archived().len());
            }
            "/mode" => {
                mode = match mode {
                    InfoMode::Attire => InfoMode::Weather,
                    InfoMode::Weather => InfoMode::Attire,
                };
                println!("Mode: {}", mode.as_str());
            }
            "/sessions" => {
                for (i, archived) in session.archived().iter().enumerate() {
                    println!("Conversation-Session:{i} ({} lines)", archived.len());
                }
            }
            "/clear-all" => {
                session.clear_archived();
                println!("Cleared archived sessions.");
            }
            _ if input.starts_with("/save") => {
                let path = input.strip_prefix("/save").map(str::trim).unwrap_or_default();
                if path.is_empty() {
                    println!("Usage: /save <path>");
                } else {
                    std::fs::write(path, session.transcript())
                        .with_context(|| format!("writing transcript to {path}"))?;
                    println!("Saved transcript to {path}");
                }
            }
            _ => {
                let response = match pipeline.respond(mode).await {
                    Ok(text) => format!("Bot: {text}"),
                    Err(e) => {
                        tracing::error!("interaction failed: {e}");
                        format!("Bot: {}", e.user_message())
                    }
                };
                println!("{response}");
                session.record_turn(input, response);
            }
        }
    }

    Ok(())
}
