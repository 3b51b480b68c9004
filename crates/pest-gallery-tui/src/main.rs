//! Terminal gallery for browsing and managing pest records.

use anyhow::Context;
use clap::Parser;
use log::{LevelFilter, debug, info};
use pest_gallery_config::{LayeredConfigOptions, PestGalleryConfig};
use pest_gallery_core::{
    CloudinaryHost, GalleryActions, HttpPestApi, ImageHost, PestApi, RecordStore, Route,
};
use pest_gallery_tui::TuiConfig;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the pest gallery.
#[derive(Parser)]
#[command(name = "pest-gallery", version)]
struct Cli {
    /// Extra pest-gallery.json5 layer applied over the discovered ones
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend base URL, e.g. http://localhost:8080
    #[arg(long)]
    api_url: Option<String>,
    /// Image host upload endpoint
    #[arg(long)]
    upload_url: Option<String>,
    /// Unsigned upload preset for the image host
    #[arg(long)]
    upload_preset: Option<String>,
    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Path to open on launch: /, /pests/{id}, /about, /contact
    #[arg(long, default_value = "/")]
    route: String,
}

/// Entry point for the pest gallery TUI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    info!(
        "starting pest gallery (config_set={}, api_url_set={}, upload_url_set={})",
        cli.config.is_some(),
        cli.api_url.is_some(),
        cli.upload_url.is_some()
    );

    let cwd = std::env::current_dir().context("cwd")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        info!("adding runtime config layer: {}", path.display());
        options = options.with_runtime_path(path);
    }
    info!("loading layered config from cwd: {}", cwd.display());
    let layered = PestGalleryConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let mut config = layered.config;
    apply_overrides(&mut config, &cli);
    config.validate().context("invalid configuration")?;

    let api: Arc<dyn PestApi> =
        Arc::new(HttpPestApi::new(&config.backend).context("failed to build backend client")?);
    let host: Arc<dyn ImageHost> = Arc::new(
        CloudinaryHost::new(&config.image_host).context("failed to build image host client")?,
    );
    let store = RecordStore::new(api, config.cache.revalidate_on_read);
    let actions = GalleryActions::new(store, host);

    let tui_config = TuiConfig {
        default_filter: config.gallery.default_filter,
        description_limit: config.gallery.description_limit,
        start_route: Route::parse(&cli.route),
    };
    pest_gallery_tui::run(actions, tui_config).await
}

/// Command-line flags take precedence over every config layer.
fn apply_overrides(config: &mut PestGalleryConfig, cli: &Cli) {
    if let Some(url) = cli.api_url.as_ref() {
        config.backend.base_url.clone_from(url);
    }
    if let Some(url) = cli.upload_url.as_ref() {
        config.image_host.upload_url.clone_from(url);
    }
    if let Some(preset) = cli.upload_preset.as_ref() {
        config.image_host.upload_preset.clone_from(preset);
    }
}

/// Stderr is owned by the terminal UI, so logs go to a file when requested
/// and stay off otherwise unless `RUST_LOG` says so.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let mut builder = env_logger::builder();
    builder.format_timestamp_millis();
    match cli.log_file.as_ref() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .filter_level(LevelFilter::Info)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(LevelFilter::Off);
        }
    }
    let _ = builder.parse_default_env().try_init();
    Ok(())
}
