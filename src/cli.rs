// src/cli.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::gateway::{merge_keywords, PromptGateway};
use crate::types::FilterState;
use crate::url_builder::{build_search_url, parse_search_url};
use crate::web::{gateway_from_config, start_web_server};

#[derive(Parser)]
#[command(name = "jobquery")]
#[command(about = "Build LinkedIn job search URLs, optionally with help from a language model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Build a search URL from filters
    Url {
        #[command(flatten)]
        filters: FilterArgs,
        /// Boolean query for the keywords parameter
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Print the filters and query encoded in a search URL
    Parse { url: String },
    /// Turn a description of the ideal job into filters
    Fill { prompt: String },
    /// Generate a boolean query and search URL for filters
    Query {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Suggest extra keywords and print the merged keyword list
    Suggest {
        prompt: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Filter flags. Values from `--filters <file.json>` are loaded first, flags override them.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// JSON file holding a filter state
    #[arg(long = "filters")]
    pub filters_file: Option<PathBuf>,
    #[arg(long)]
    pub keywords: Option<String>,
    #[arg(long = "exclude")]
    pub exclude_keywords: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub distance: Option<String>,
    #[arg(long = "job-type", value_delimiter = ',')]
    pub job_types: Vec<String>,
    #[arg(long = "experience", value_delimiter = ',')]
    pub experience_levels: Vec<String>,
    #[arg(long)]
    pub time_posted: Option<String>,
    #[arg(long = "workplace", value_delimiter = ',')]
    pub workplace_types: Vec<String>,
    #[arg(long = "company-type", value_delimiter = ',')]
    pub company_types: Vec<String>,
    #[arg(long)]
    pub sort_by: Option<String>,
}

impl FilterArgs {
    pub async fn resolve(self) -> Result<FilterState> {
        let base = match &self.filters_file {
            Some(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read filters file: {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse filters file: {}", path.display()))?
            }
            None => FilterState::default(),
        };
        Ok(self.apply(base))
    }

    fn apply(self, mut filters: FilterState) -> FilterState {
        set_if_some(&mut filters.keywords, self.keywords);
        set_if_some(&mut filters.exclude_keywords, self.exclude_keywords);
        set_if_some(&mut filters.location, self.location);
        set_if_some(&mut filters.distance, self.distance);
        set_if_some(&mut filters.time_posted, self.time_posted);
        set_if_some(&mut filters.sort_by, self.sort_by);
        set_if_non_empty(&mut filters.job_types, self.job_types);
        set_if_non_empty(&mut filters.experience_levels, self.experience_levels);
        set_if_non_empty(&mut filters.workplace_types, self.workplace_types);
        set_if_non_empty(&mut filters.company_types, self.company_types);
        filters
    }
}

fn set_if_some(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn set_if_non_empty(field: &mut Vec<String>, values: Vec<String>) {
    if !values.is_empty() {
        *field = values;
    }
}

pub async fn handle_command(cli: Cli, mut config: AppConfig) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            start_web_server(config).await?;
        }

        Command::Url { filters, query } => {
            let filters = filters.resolve().await?;
            println!("{}", build_search_url(&filters, &query));
        }

        Command::Parse { url } => {
            let parsed = parse_search_url(&url)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }

        Command::Fill { prompt } => {
            require_prompt(&prompt)?;
            let gateway = require_gateway(&config)?;
            let filters = gateway.extract_filters(&prompt).await?;
            println!("{}", serde_json::to_string_pretty(&filters)?);
        }

        Command::Query { filters } => {
            let gateway = require_gateway(&config)?;
            let filters = filters.resolve().await?;
            let query = gateway.synthesize_query(&filters).await?;
            info!("Generated boolean query: {}", query);
            println!("Query: {}", query);
            println!("URL:   {}", build_search_url(&filters, &query));
        }

        Command::Suggest { prompt, filters } => {
            require_prompt(&prompt)?;
            let gateway = require_gateway(&config)?;
            let filters = filters.resolve().await?;
            let suggested = gateway.suggest_keywords(&prompt, &filters).await?;
            println!("Suggested: {}", suggested);
            println!("Keywords:  {}", merge_keywords(&filters.keywords, &suggested));
        }
    }

    Ok(())
}

fn require_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        anyhow::bail!("Prompt must not be empty");
    }
    Ok(())
}

fn require_gateway(config: &AppConfig) -> Result<PromptGateway> {
    gateway_from_config(config)?
        .context("GEMINI_API_KEY (or API_KEY) must be set for AI commands")
}
