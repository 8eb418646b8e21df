//! # Saorsa Light-Box Desktop
//!
//! Headless overlay host: acquires the camera, replays gestures, renders and
//! captures the overlay to a PNG file.

use anyhow::Context;
use clap::Parser;
use lightbox_core::CameraState;
use lightbox_desktop::{CliArgs, HostConfig, OverlaySession, RunReport, SyntheticCamera};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Saorsa Light-Box");

    let args = CliArgs::parse();
    let config = HostConfig::from(args);

    tracing::info!(
        "Surface config: {}x{} at {} Hz, camera {:?}",
        config.width,
        config.height,
        config.refresh_rate_hz,
        config.camera_failure
    );

    let (capture_tx, mut capture_rx) = mpsc::unbounded_channel();
    let mut session = OverlaySession::new(
        config.session_config()?,
        SyntheticCamera::new(config.camera_failure),
    )
    .on_capture(move |image| {
        let _ = capture_tx.send(image);
    })
    .on_close(|| tracing::info!("Overlay closed"));

    let state = session.start().await?;
    if let CameraState::Error(err) = &state {
        tracing::error!("{} ({})", err.message, err.kind);
        print_report(&session, None)?;
        session.close().await?;
        anyhow::bail!("camera unavailable: {}", err.message);
    }

    let center = (f64::from(config.width) / 2.0, f64::from(config.height) / 2.0);
    let transform = config.script.replay(&mut session, center);
    tracing::debug!(?transform, "Gesture script applied");

    wait_for_frames(&session, &config).await?;

    let mut written = None;
    if session.capture().await? {
        if let Some(image) = capture_rx.recv().await {
            tokio::fs::write(&config.output, &image.data)
                .await
                .with_context(|| format!("writing {}", config.output.display()))?;
            tracing::info!(
                "Wrote {}x{} capture to {}",
                image.width,
                image.height,
                config.output.display()
            );
            written = Some(config.output.clone());
        }
    }

    print_report(&session, written)?;
    session.close().await?;

    tracing::info!("Saorsa Light-Box exited");
    Ok(())
}

/// Initialize tracing. `RUST_LOG` overrides the default filter and
/// `RUST_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "lightbox_desktop=debug,lightbox_renderer=debug,lightbox_core=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("RUST_LOG_FORMAT").is_ok_and(|f| f == "json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Let the loop draw the requested number of frames after the gesture
/// script, so the capture shows the final controls.
async fn wait_for_frames(
    session: &OverlaySession<SyntheticCamera>,
    config: &HostConfig,
) -> anyhow::Result<()> {
    let period = config.frame_period();
    let target = session.frames_rendered() + u64::from(config.frames.max(1));

    tokio::time::timeout(config.frame_budget(), async {
        while session.frames_rendered() < target {
            tokio::time::sleep(period / 2).await;
        }
    })
    .await
    .with_context(|| format!("render loop did not reach {target} frames"))?;

    tracing::debug!(frames = session.frames_rendered(), "Frames rendered");
    Ok(())
}

fn print_report(
    session: &OverlaySession<SyntheticCamera>,
    capture: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
    let report = RunReport {
        session_id: session.id(),
        camera: session.camera_state().clone(),
        controls: session.controls(),
        frames_rendered: session.frames_rendered(),
        opacity_percent: session.controls().opacity_percent(),
        capture,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
