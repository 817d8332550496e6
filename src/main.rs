//! `BestPhoto` - best-photo selection CLI and API server.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

use bestphoto::api::{self, AppState};
use bestphoto::category::Category;
use bestphoto::cli::{Cli, Command, Source};
use bestphoto::config::{self, Config};
use bestphoto::context::ServiceContext;
use bestphoto::encoder::encode_files;
use bestphoto::error::PhotoError;
use bestphoto::model::{resolve_model, validate_model};
use bestphoto::ports::AssetUpload;
use bestphoto::processing::{Processor, UpscaleFactor};
use bestphoto::selection::Selector;
use bestphoto::session::{PhotoSession, SelectionResult};
use bestphoto::telemetry;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), PhotoError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(PhotoError::Config)?;

    let requested = cli.model.clone().unwrap_or_else(|| config.selection.model.clone());
    let model = resolve_model(&requested);
    validate_model(&model).map_err(PhotoError::InvalidArgument)?;
    debug!(%model, requested = %requested, config = %config_path.display(), "configuration loaded");

    // Live, recording or replaying, depending on the environment.
    let (ctx, recording_session) = ServiceContext::from_env(&config)?;

    let result = dispatch(cli.command, ctx, &config, &model).await;

    // The context is gone by now, so the recorder can be reclaimed.
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    result
}

async fn dispatch(
    command: Command,
    ctx: ServiceContext,
    config: &Config,
    model: &str,
) -> Result<(), PhotoError> {
    match command {
        Command::Serve { host, port } => serve(ctx, config, model, host, port).await,
        Command::Select { category, feedback, files } => {
            let selector = Selector::new(ctx.vision, model)
                .with_transport_retries(config.selection.transport_retries);
            select(&selector, category, feedback.as_deref(), &files).await
        }
        Command::Upscale { source, factor } => {
            let factor = UpscaleFactor::try_from(factor)?;
            let processor = Processor::new(ctx.cdn, config.cloud_name());
            let public_id = resolve_source(&processor, source).await?;
            println!("{}", processor.upscale(&public_id, factor).await?);
            Ok(())
        }
        Command::RemoveBg { source } => {
            let processor = Processor::new(ctx.cdn, config.cloud_name());
            let public_id = resolve_source(&processor, source).await?;
            println!("{}", processor.remove_background(&public_id)?);
            Ok(())
        }
        Command::Upload { file } => {
            let processor = Processor::new(ctx.cdn, config.cloud_name());
            let asset = processor.upload(&read_upload(&file).await?).await?;
            println!("{}", asset.public_id);
            eprintln!("Uploaded: {}", asset.secure_url);
            Ok(())
        }
    }
}

async fn serve(
    ctx: ServiceContext,
    config: &Config,
    model: &str,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), PhotoError> {
    let state = AppState::new(&ctx, config, model);
    drop(ctx);

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let app = api::router(state, &config.server);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(addr = %listener.local_addr()?, %model, "server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// What `select` prints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectReport<'a> {
    category: Category,
    best_photo: Option<&'a str>,
    best_photo_index: Option<usize>,
    reason: &'a str,
    reply: &'a str,
}

impl<'a> SelectReport<'a> {
    fn new(session: &'a PhotoSession, result: &'a SelectionResult) -> Self {
        let best_photo = result
            .best_photo_id
            .and_then(|id| session.files().iter().find(|f| f.id == id))
            .map(|f| f.preview.as_str());
        Self {
            category: session.category(),
            best_photo,
            best_photo_index: result.best_photo_index,
            reason: &result.reason,
            reply: &result.reply,
        }
    }
}

async fn select(
    selector: &Selector,
    category: Category,
    feedback: Option<&str>,
    files: &[PathBuf],
) -> Result<(), PhotoError> {
    if files.is_empty() {
        return Err(PhotoError::EmptyBatch);
    }

    let images = encode_files(files).await?;
    let mut session = PhotoSession::new(category);
    for (image, path) in images.into_iter().zip(files) {
        let id = session.add_encoded(image, path.display().to_string())?;
        session.mark_uploading(id)?;
        session.complete(id)?;
    }

    session.analyze(selector).await?;
    if let Some(feedback) = feedback {
        if let Some(first) = session.result() {
            eprintln!("First pick: {}", first.best_photo_name.as_deref().unwrap_or("none"));
        }
        session.refine(selector, feedback).await?;
    }

    let Some(result) = session.result() else {
        return Ok(());
    };
    let report = SelectReport::new(&session, result);
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| PhotoError::InvalidArgument(format!("Failed to render result: {e}")))?;
    println!("{json}");
    Ok(())
}

/// The CDN public ID for `source`, uploading a local file first when needed.
async fn resolve_source(processor: &Processor, source: Source) -> Result<String, PhotoError> {
    match (source.public_id, source.file) {
        (Some(public_id), _) => Ok(public_id),
        (None, Some(file)) => {
            let asset = processor.upload(&read_upload(&file).await?).await?;
            eprintln!("Uploaded: {}", asset.public_id);
            Ok(asset.public_id)
        }
        (None, None) => {
            Err(PhotoError::InvalidArgument("Provide --public-id or --file".to_string()))
        }
    }
}

async fn read_upload(path: &Path) -> Result<AssetUpload, PhotoError> {
    let data = tokio::fs::read(path).await?;
    Ok(AssetUpload { file_name: file_name(path), data })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
