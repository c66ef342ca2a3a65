use serde::{Deserialize, Serialize};

use crate::cli::ClientArgs;

pub const CLIENT_SECTION: &str = "client";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub log_requests: bool,
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:28183/api/v1/".to_string(),
            timeout_secs: 30,
            max_retries: 0,
            log_requests: false,
            token: None,
        }
    }
}

impl ClientConfig {
    /// Applies command line overrides on top of file and environment values.
    pub fn apply_args(&mut self, args: &ClientArgs) {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if args.log_requests {
            self.log_requests = true;
        }
    }
}
