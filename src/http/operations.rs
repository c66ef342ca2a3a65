//! Operation table of the wallet RPC API: method and path template per call.

use reqwest::Method;
use url::Url;

use super::error::ClientError;

/// One server operation.
///
/// `path` is relative to the client's base URL (which normally ends in
/// `/api/v1/`). Segments written as `{name}` are path parameters.
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
}

pub const GET_INFO: Operation = Operation {
    name: "getinfo",
    method: Method::GET,
    path: "getinfo",
};

pub const SESSION: Operation = Operation {
    name: "session",
    method: Method::GET,
    path: "session",
};

pub const LIST_WALLETS: Operation = Operation {
    name: "listwallets",
    method: Method::GET,
    path: "wallet/all",
};

pub const CREATE_WALLET: Operation = Operation {
    name: "createwallet",
    method: Method::POST,
    path: "wallet/create",
};

pub const UNLOCK_WALLET: Operation = Operation {
    name: "unlockwallet",
    method: Method::POST,
    path: "wallet/{walletname}/unlock",
};

pub const LOCK_WALLET: Operation = Operation {
    name: "lockwallet",
    method: Method::GET,
    path: "wallet/{walletname}/lock",
};

pub const DISPLAY_WALLET: Operation = Operation {
    name: "displaywallet",
    method: Method::GET,
    path: "wallet/{walletname}/display",
};

pub const DIRECT_SEND: Operation = Operation {
    name: "directsend",
    method: Method::POST,
    path: "wallet/{walletname}/taker/direct-send",
};

impl Operation {
    /// Builds the absolute URL for this operation.
    ///
    /// Path parameters are looked up in `params` and percent-encoded as a
    /// single path segment each, so values can never introduce extra
    /// segments or a query string.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidPath`] if a parameter is missing or the base URL
    /// cannot carry a path.
    pub fn url(&self, base_url: &Url, params: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidPath(base_url.to_string()))?;
            segments.pop_if_empty();
            for segment in self.path.split('/') {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(param) => {
                        let value = params
                            .iter()
                            .find(|(name, _)| *name == param)
                            .map(|(_, value)| *value)
                            .ok_or_else(|| {
                                ClientError::InvalidPath(format!("missing path parameter '{param}' for {}", self.name))
                            })?;
                        segments.push(value);
                    },
                    None => {
                        segments.push(segment);
                    },
                }
            }
        }
        Ok(url)
    }
}
