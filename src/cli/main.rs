use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use content_index_manager::search::{FilterHandlerRegistry, SearchRequest, SortHandlerRegistry};
use reqwest::{Client, Response, Url};
use serde_json::json;

#[derive(Parser)]
#[command(name = "cim-cli")]
#[command(about = "Content index manager CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CIM_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse filter and sort tokens locally and print the resulting request
    Parse {
        #[arg(short, long, default_value = "")]
        term: String,

        /// Filter token, e.g. `contentType:blogPost` (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Sort token, e.g. `updateDate:desc` (repeatable)
        #[arg(short, long = "sort")]
        sorts: Vec<String>,
    },

    /// Check server health
    Health,

    /// List indexes
    Indexes {
        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(long, default_value = "20")]
        take: usize,
    },

    /// Get index details
    Index {
        #[arg(value_name = "INDEX")]
        name: String,
    },

    /// Start a rebuild of an index
    Rebuild {
        #[arg(value_name = "INDEX")]
        name: String,
    },

    /// Show the rebuild state of an index
    Status {
        #[arg(value_name = "INDEX")]
        name: String,
    },

    /// Search an index
    Search {
        #[arg(value_name = "INDEX")]
        index: String,

        #[arg(short, long)]
        term: Option<String>,

        /// Filter token (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Sort token (repeatable)
        #[arg(short, long = "sort")]
        sorts: Vec<String>,

        #[arg(long)]
        skip: Option<usize>,

        #[arg(long)]
        take: Option<usize>,

        /// Include unpublished content
        #[arg(long)]
        preview: bool,

        /// Combine top-level filters with OR instead of AND
        #[arg(long)]
        any: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Parse { term, filters, sorts } => {
            let compiled = SearchRequest::from_tokens(
                term,
                &filters,
                &sorts,
                &FilterHandlerRegistry::default(),
                &SortHandlerRegistry::default(),
            );

            let output = json!({
                "request": compiled.request,
                "unrecognized_filters": compiled.unrecognized_filters,
                "unrecognized_sorts": compiled.unrecognized_sorts,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Health => {
            let response = client
                .get(api_url(&cli.endpoint, &["health"])?)
                .send()
                .await
                .context("Failed to reach server")?;

            print_body(response).await?;
        }

        Commands::Indexes { skip, take } => {
            let response = client
                .get(api_url(&cli.endpoint, &["v1", "indexes"])?)
                .query(&[("skip", skip), ("take", take)])
                .send()
                .await
                .context("Failed to reach server")?;

            print_body(response).await?;
        }

        Commands::Index { name } => {
            let response = client
                .get(api_url(&cli.endpoint, &["v1", "indexes", name.as_str()])?)
                .send()
                .await
                .context("Failed to reach server")?;

            print_body(response).await?;
        }

        Commands::Rebuild { name } => {
            let response = client
                .post(api_url(&cli.endpoint, &["v1", "indexes", name.as_str(), "rebuild"])?)
                .send()
                .await
                .context("Failed to reach server")?;

            print_body(response).await?;
        }

        Commands::Status { name } => {
            let response = client
                .get(api_url(&cli.endpoint, &["v1", "indexes", name.as_str(), "rebuild"])?)
                .send()
                .await
                .context("Failed to reach server")?;

            print_body(response).await?;
        }

        Commands::Search {
            index,
            term,
            filters,
            sorts,
            skip,
            take,
            preview,
            any,
        } => {
            let response = client
                .post(api_url(&cli.endpoint, &["v1", "indexes", index.as_str(), "search"])?)
                .json(&json!({
                    "term": term,
                    "filter": filters,
                    "sort": sorts,
                    "skip": skip,
                    "take": take,
                    "preview": preview,
                    "filters_logic_operator": if any { "or" } else { "and" },
                }))
                .send()
                .await
                .context("Failed to reach server")?;

            print_body(response).await?;
        }
    }

    Ok(())
}

/// Pretty-print a JSON response, failing on error statuses after printing the body
async fn print_body(response: Response) -> Result<()> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Server returned a non-JSON body")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("Request failed with status {}", status);
    }
    Ok(())
}

/// Join path segments onto the endpoint, percent-encoding each one
fn api_url(endpoint: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(endpoint).with_context(|| format!("Invalid endpoint {}", endpoint))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Endpoint {} cannot carry a path", endpoint))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
