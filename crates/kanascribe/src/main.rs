//! # kanascribe
//!
//! Server binary: loads settings, the recognition model and the kana
//! dictionary, then serves `GET /transcribe` until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use kanascribe_kana::load_converter;
use kanascribe_server::metrics::install_recorder;
use kanascribe_server::pipeline::prepare_scratch_dir;
use kanascribe_server::{KanascribeServer, Pipeline, PipelineOptions, ServerConfig};
use kanascribe_settings::loader::{load_settings_from_path, settings_path};
use kanascribe_settings::{KanascribeSettings, RecognitionSettings};
use kanascribe_transcription::{FfmpegTranscoder, RecognizerConfig, load_recognizer};

/// Transcription server returning kana readings.
#[derive(Parser, Debug)]
#[command(name = "kanascribe", about = "Speech to text with kana readings over HTTP")]
struct Cli {
    /// Settings file (default: `$KANASCRIBE_CONFIG`, else `./kanascribe.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides settings and environment).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings and environment).
    #[arg(long)]
    port: Option<u16>,
}

impl Cli {
    /// Apply flags on top of loaded settings.
    fn apply(&self, settings: &mut KanascribeSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
    }
}

fn recognizer_config(settings: &RecognitionSettings) -> RecognizerConfig {
    RecognizerConfig {
        model_dir: settings.model_dir.clone(),
        model_file: settings.model_file.clone(),
        sample_rate: settings.sample_rate,
        language: settings.language.clone(),
        threads: settings.threads,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config_path = args.config.clone().unwrap_or_else(settings_path);
    let mut settings = kanascribe_logging::with_bootstrap_logging(|| {
        load_settings_from_path(&config_path)
    })
    .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    args.apply(&mut settings);

    kanascribe_logging::init_subscriber(&settings.logging);

    let scratch_dir = settings.server.scratch_dir();
    prepare_scratch_dir(&scratch_dir)
        .await
        .with_context(|| format!("Failed to create scratch directory: {}", scratch_dir.display()))?;

    // Both resources are required; fail before binding rather than on the first request.
    let recognizer = load_recognizer(recognizer_config(&settings.recognition))
        .await
        .context("Failed to load recognition model")?;
    let converter = load_converter(&settings.kana)
        .await
        .context("Failed to load kana dictionary")?;
    let transcoder =
        FfmpegTranscoder::new(&settings.transcode.ffmpeg_path, recognizer.sample_rate());

    let metrics_handle = install_recorder().context("Failed to install metrics recorder")?;

    let pipeline = Pipeline::new(
        Arc::new(transcoder),
        recognizer,
        Arc::new(converter),
        PipelineOptions::from_settings(&settings),
    );
    let server = KanascribeServer::new(
        ServerConfig::from(&settings.server),
        pipeline,
        metrics_handle,
    );

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    info!("kanascribe listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("Shutting down...");
    let report = server.shutdown().drain(handle, None).await;

    info!(
        in_flight = report.in_flight_at_start,
        abandoned = report.abandoned,
        "Shutdown complete"
    );
    Ok(())
}
