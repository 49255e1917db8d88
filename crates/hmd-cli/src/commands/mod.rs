//! Command handlers

pub mod config;
pub mod push;
pub mod watch;

use std::path::PathBuf;

use clap::Args;
use hmd_core::{BufferId, Config, SessionParams};

/// Arguments identifying the buffer a command works on
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// File holding the buffer content
    pub file: PathBuf,

    /// Buffer identifier on the server (integers are sent as numbers)
    #[arg(short, long)]
    pub buffer_id: BufferId,

    /// Version token of the file's current content
    #[arg(long, default_value = "")]
    pub hash: String,

    /// API base URL (overrides config)
    #[arg(long)]
    pub api_uri: Option<String>,

    /// Auth token (overrides config)
    #[arg(long)]
    pub token: Option<String>,
}

impl SessionArgs {
    /// Session parameters, with flags taking precedence over config
    pub fn session_params(&self, config: &Config) -> SessionParams {
        let mut params = config
            .session_params(self.buffer_id.clone())
            .with_hash(self.hash.clone());
        if let Some(ref api_uri) = self.api_uri {
            params = params.with_api_uri(api_uri.clone());
        }
        if let Some(ref token) = self.token {
            params = params.with_token(token.clone());
        }
        params
    }

    /// Location used to title the buffer
    pub fn location(&self) -> String {
        self.file.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SessionArgs {
        SessionArgs {
            file: PathBuf::from("/tmp/notes.md"),
            buffer_id: "4".parse().unwrap(),
            hash: "h0".to_string(),
            api_uri: None,
            token: None,
        }
    }

    #[test]
    fn test_params_fall_back_to_config() {
        let config = Config {
            api_uri: "http://config/".to_string(),
            token: "cfg".to_string(),
            ..Default::default()
        };

        let params = args().session_params(&config);
        assert_eq!(params.buffer_id, BufferId::Number(4));
        assert_eq!(params.buffer_hash, "h0");
        assert_eq!(params.api_uri, "http://config/");
        assert_eq!(params.token, "cfg");
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            api_uri: "http://config".to_string(),
            token: "cfg".to_string(),
            ..Default::default()
        };
        let mut args = args();
        args.api_uri = Some("http://flag".to_string());
        args.token = Some("flag".to_string());

        let params = args.session_params(&config);
        assert_eq!(params.api_uri, "http://flag");
        assert_eq!(params.token, "flag");
    }
}
