//! `wavetap`: capture waveform sessions from the board's serial console.
//!
//! Console text is echoed to stdout as it arrives. Every session ends up in
//! a timestamped file in the output directory. Ctrl+C stops the capture
//! after saving whatever is still pending.

mod args;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wavetap_core::CaptureConfig;
use wavetap_serial::{ConsoleCommand, ProgressReporter, Receiver, SerialByteSource, StdoutText};
use wavetap_storage::{CaptureWriter, CaptureWriterConfig};

use crate::args::{Args, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = args.capture_config()?;
    capture(config).await
}

async fn capture(config: CaptureConfig) -> Result<()> {
    info!(
        "Starting wavetap {} on {} at {} baud",
        wavetap_core::VERSION,
        config.port,
        config.baud_rate
    );

    let writer = CaptureWriter::new(CaptureWriterConfig::from(&config))
        .context("Failed to prepare output directory")?;
    info!("Saving captures to {}", writer.output_dir().display());

    let mut source = SerialByteSource::open(&config)?;
    source.discard_input()?;
    arm(&mut source, &config).await?;

    let mut receiver = Receiver::with_config(source, &config)?;
    let cancel = CancellationToken::new();

    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C received, stopping capture"),
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
        signal_token.cancel();
    });

    info!("Press Ctrl+C to exit");
    let (summary, files) = tokio::task::spawn_blocking(move || {
        let mut text = StdoutText::stdout();
        let mut sink = ProgressReporter::new(writer);
        let summary = receiver.run(&mut text, &mut sink, &cancel)?;
        Ok::<_, wavetap_serial::TransportError>((summary, sink.into_inner().files_written()))
    })
    .await
    .context("Receive task panicked")??;

    info!(
        "Capture stopped ({:?}): {} frames in {} sessions, {} files written",
        summary.stop, summary.stats.frames, summary.stats.sessions, files
    );
    if summary.sink_errors > 0 {
        warn!("{} sessions could not be saved", summary.sink_errors);
    }

    Ok(())
}

/// Switch the board into waveform printing, then request a feedback message.
async fn arm(source: &mut SerialByteSource, config: &CaptureConfig) -> Result<()> {
    if !config.arm_device {
        return Ok(());
    }

    let mut commands = vec![ConsoleCommand::ToggleWaveformPrint];
    if let Some(text) = &config.feedback_text {
        commands.push(ConsoleCommand::FeedbackMessage(text.clone()));
    }

    // Keystroke gaps block; keep them off the runtime threads.
    tokio::task::block_in_place(|| {
        commands
            .iter()
            .try_for_each(|command| command.send(&mut *source))
    })?;

    Ok(())
}
