//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use hmd_core::{Buffer, BufferId};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print the result of an accepted update
    pub fn print_saved(&self, buffer_id: &BufferId, buffer_hash: &str) {
        match self.format {
            OutputFormat::Human => {
                println!("✓ Buffer {} saved", buffer_id);
                println!("  Hash: {}", buffer_hash);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"bufferId": buffer_id, "bufferHash": buffer_hash})
                );
            }
            OutputFormat::Quiet => {
                println!("{}", buffer_hash);
            }
        }
    }

    /// Print the final state of a session's buffer
    pub fn print_buffer(&self, buffer: &Buffer) {
        match self.format {
            OutputFormat::Human => {
                println!("Buffer:   {}", buffer.buffer_id());
                println!("Hash:     {}", display_or_unset(buffer.buffer_hash()));
                println!("Endpoint: {}", display_or_unset(buffer.api_endpoint()));
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "bufferId": buffer.buffer_id(),
                        "bufferHash": buffer.buffer_hash(),
                        "apiUri": buffer.api_endpoint()
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", buffer.buffer_hash());
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an error notice (always shown, on stderr)
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({"status": "error", "message": message})
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => eprintln!("✗ {}", message),
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
