use crate::chart::ChartCanvas;
use crate::results::ResultsPanel;
use crate::server;
use crate::submit::{SearchForm, SubmitOutcome};
use anyhow::{bail, Context};
use application::search_service::{IndexSource, SearchService};
use clap::{Parser, Subcommand};
use colored::Colorize;
use infrastructure::config::Config;
use infrastructure::search_client::SearchClient;
use shared::types::Result;
use std::path::PathBuf;
use std::sync::Arc;

const PREVIEW_CHARS: usize = 400;

#[derive(Parser)]
#[command(name = "lsa_search")]
#[command(about = "Latent semantic search over a text corpus")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the index and serve the search page and POST /search
    Serve {
        /// Listen address, overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
        /// Corpus directory, overrides CORPUS_DIR
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Refit even if a stored index matches the corpus
        #[arg(long)]
        retrain: bool,
    },
    /// Fit (or verify) the stored index without serving
    Index {
        #[arg(long)]
        corpus: Option<PathBuf>,
        #[arg(long)]
        retrain: bool,
    },
    /// Query a running service; prompts interactively when no text is given
    Query {
        /// Base URL, overrides SEARCH_ENDPOINT
        #[arg(long)]
        endpoint: Option<String>,
        /// Print whole documents instead of previews
        #[arg(long)]
        full: bool,
        /// No colours
        #[arg(long)]
        plain: bool,
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
}

pub struct CliApp {
    config: Config,
}

impl CliApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&mut self, cli: Cli) -> Result<()> {
        match cli.command {
            Command::Serve {
                bind,
                corpus,
                retrain,
            } => {
                if let Some(corpus) = corpus {
                    self.config.corpus_dir = corpus;
                }
                let bind = bind.unwrap_or_else(|| self.config.bind_addr.clone());
                self.handle_serve(&bind, retrain).await
            }
            Command::Index { corpus, retrain } => {
                if let Some(corpus) = corpus {
                    self.config.corpus_dir = corpus;
                }
                self.build_service(retrain).await.map(|_| ())
            }
            Command::Query {
                endpoint,
                full,
                plain,
                text,
            } => {
                let endpoint = endpoint.unwrap_or_else(|| self.config.search_endpoint.clone());
                let mut form = search_form(&endpoint, full);
                let query = text.join(" ");
                if query.trim().is_empty() {
                    handle_interactive(&mut form, !plain).await
                } else {
                    handle_query(&mut form, &query, !plain).await
                }
            }
        }
    }

    async fn handle_serve(&self, bind: &str, retrain: bool) -> Result<()> {
        let service = self.build_service(retrain).await?;
        println!("{}", format!("Serving on http://{bind}").green());
        server::serve(Arc::new(service), bind).await
    }

    /// Corpus loading and fitting are CPU-bound; keep them off the runtime.
    async fn build_service(&self, retrain: bool) -> Result<SearchService> {
        let config = self.config.clone();
        let (service, source) = tokio::task::spawn_blocking(move || -> Result<_> {
            let mut service = SearchService::new(&config)?;
            let source = service.build_index(retrain)?;
            Ok((service, source))
        })
        .await
        .context("index build task failed")??;

        let how = match source {
            IndexSource::Stored => "loaded from store",
            IndexSource::Fitted => "fitted",
        };
        println!(
            "{}",
            format!("Index {how}: {} documents", service.corpus().len()).cyan()
        );
        Ok(service)
    }
}

fn search_form(endpoint: &str, full: bool) -> SearchForm {
    let results = if full {
        ResultsPanel::new()
    } else {
        ResultsPanel::new().with_preview(PREVIEW_CHARS)
    };
    SearchForm::with_views(SearchClient::new(endpoint), results, ChartCanvas::default())
}

async fn handle_query(form: &mut SearchForm, query: &str, styled: bool) -> Result<()> {
    let outcome = form.submit(query).await;
    println!("{}", form.render(styled));
    match outcome {
        SubmitOutcome::Rendered(_) => Ok(()),
        // the reason is already in the rendered panel
        SubmitOutcome::Failed(_) => bail!("query was not answered"),
    }
}

async fn handle_interactive(form: &mut SearchForm, styled: bool) -> Result<()> {
    use dialoguer::{theme::ColorfulTheme, Input};
    println!("Search mode. Type 'exit' to quit.");
    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Query")
            .allow_empty(true)
            .interact_text()?;
        if matches!(input.trim().to_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        // failures are already on screen; keep prompting
        form.submit(&input).await;
        println!("{}", form.render(styled));
    }
    Ok(())
}
