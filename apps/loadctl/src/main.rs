use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dom::{Document, Node};
use loader::{load_settings, HttpFetcher, LoadState, Loader, LoaderOptions, LoaderSettings};
use tracing::info;
use url::Url;

#[derive(Parser, Debug)]
#[command(about = "Load remote fragments into an in-memory loader widget")]
struct Cli {
    /// Settings file; defaults to ./loader.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load one URL and print the lifecycle.
    Fetch {
        url: String,
        #[arg(long)]
        base_url: Option<Url>,
        #[arg(long)]
        plain_text: bool,
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long)]
        instant_load_ms: Option<u64>,
    },
    /// Print the effective settings as JSON.
    Settings,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Settings => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Fetch {
            url,
            base_url,
            plain_text,
            timeout_ms,
            instant_load_ms,
        } => {
            if let Some(v) = timeout_ms {
                settings.request_timeout_ms = v;
            }
            if let Some(v) = instant_load_ms {
                settings.instant_load_timeout_ms = v;
            }
            settings.plain_text |= plain_text;
            fetch(&settings, &url, base_url).await?;
        }
    }

    Ok(())
}

/// Builds `<div class=ROOT data-load=URL>` with error and content targets.
fn build_widget(doc: &Document, settings: &LoaderSettings, url: &str) -> Result<Node> {
    let root_class = class_of(&settings.root_selector).context("root_selector must be a class")?;
    let mut root = doc
        .create_element("div")
        .with_class(root_class)
        .with_attr(&settings.url_attr, url);
    if let Some(class) = class_of(&settings.error_selector) {
        root = root.with_child(doc.create_element("div").with_class(class));
    }
    if let Some(class) = class_of(&settings.content_selector) {
        root = root.with_child(doc.create_element("div").with_class(class));
    }
    doc.body().append_child(&root);
    Ok(root)
}

fn class_of(selector: &str) -> Option<&str> {
    selector
        .strip_prefix('.')
        .filter(|c| !c.is_empty() && !c.contains(['.', '#', '[', ' ', ',']))
}

async fn fetch(settings: &LoaderSettings, url: &str, base_url: Option<Url>) -> Result<()> {
    let doc = Document::new();
    let root = build_widget(&doc, settings, url)?;

    let mut fetcher = HttpFetcher::new(Duration::from_millis(settings.request_timeout_ms));
    if let Some(base_url) = base_url {
        fetcher = fetcher.with_base_url(base_url);
    }
    let mut options = LoaderOptions::from_settings(settings);
    options.fetcher = Some(Arc::new(fetcher));

    if let Some(event) = options.load_state_changed_event.as_deref() {
        doc.body().add_event_listener(event, |e| {
            if let Some(detail) = e.event.state_change() {
                println!("event: {}", detail.new_state);
            }
        });
    }

    let mut loader = Loader::new(root, options)?;
    let state = loader.load().await?;
    info!(url, state = %state, "loadctl: done");

    println!("state: {state}");
    match state {
        LoadState::LoadError => {
            let message = loader
                .last_error()
                .map(ToString::to_string)
                .unwrap_or_default();
            bail!("load failed: {message}");
        }
        _ => println!("{}", loader.content_element().inner_html()),
    }
    Ok(())
}
