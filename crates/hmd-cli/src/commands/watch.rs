//! Watch command handler

use std::sync::Arc;

use anyhow::{Context, Result};
use hmd_core::sync::{HttpTransport, SyncClient};
use hmd_core::Config;
use tracing::info;

use super::SessionArgs;
use crate::editor::{FileEditor, FileWatcher};
use crate::output::Output;
use crate::reporter::TerminalReporter;

/// Keep the file synchronized until interrupted
pub async fn watch(args: SessionArgs, config: &Config, output: &Output) -> Result<()> {
    let editor = Arc::new(FileEditor::open(&args.file)?);
    let transport =
        HttpTransport::new(config.request_timeout()).context("Failed to create HTTP client")?;
    let reporter = TerminalReporter::new(*output, &args.location());
    let params = args.session_params(config);

    let client = SyncClient::new(params, editor.clone(), Arc::new(transport), reporter)
        .with_quiet_period(config.quiet_period());

    output.message(&format!(
        "Watching {} as buffer {} -> {}",
        args.file.display(),
        client.buffer().buffer_id(),
        client.buffer().update_url()
    ));
    output.message("Press Ctrl-C to stop.");

    let session = client.spawn();
    let watcher = match FileWatcher::spawn(editor, session.notifier()) {
        Ok(watcher) => watcher,
        Err(e) => {
            let _ = session.shutdown().await;
            return Err(e);
        }
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Interrupted, stopping watcher");
    watcher.stop();

    output.message("Stopping (waiting for any in-flight update)...");
    let buffer = session.shutdown().await.context("Sync session failed")?;
    output.print_buffer(&buffer);

    Ok(())
}
