//! Push command handler

use std::sync::Arc;

use anyhow::{Context, Result};
use hmd_core::sync::{HttpTransport, SyncClient};
use hmd_core::{Config, TracingReporter};

use super::SessionArgs;
use crate::editor::FileEditor;
use crate::output::Output;

/// Send the file's content once, claiming `--hash` as the current version
pub async fn push(args: SessionArgs, config: &Config, output: &Output) -> Result<()> {
    let editor = Arc::new(FileEditor::open(&args.file)?);
    let transport =
        HttpTransport::new(config.request_timeout()).context("Failed to create HTTP client")?;

    let mut client = SyncClient::new(
        args.session_params(config),
        editor,
        Arc::new(transport),
        TracingReporter,
    );

    let buffer_hash = client
        .sync_once()
        .await
        .with_context(|| format!("Failed to update buffer {}", args.buffer_id))?;

    output.print_saved(&args.buffer_id, &buffer_hash);
    Ok(())
}
