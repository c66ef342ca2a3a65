//! HTTP client module for the JoinMarket wallet RPC service.
//!
//! This module provides a typed client for `jmwalletd`, a middleware pipeline
//! for cross-cutting request/response logic, and an error resolution layer
//! that turns JSON or HTML error payloads into readable failures.
//!
//! # Architecture
//!
//! The module is organized into several components, leaves first:
//!
//! - [`Transport`] / [`ReqwestTransport`] - performs the actual network I/O
//!   and honours cancellation tokens
//! - [`Middleware`] / [`MiddlewareRegistry`] - ordered request/response
//!   interceptors such as [`BearerAuth`] and [`RequestLogger`]
//! - [`run_pipeline`] - applies a middleware snapshot around one transport call
//! - [`extract_error_message`] / [`resolve_failure`] - error resolution
//! - [`WalletRpcClient`] - typed operations returning data or [`ClientError`]
//!
//! # Example
//!
//! ```rust,no_run
//! use url::Url;
//! use jm_wallet_client::http::{RequestLogger, WalletRpcClient};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = WalletRpcClient::new(Url::parse("https://localhost:28183/api/v1/")?)?
//!     .with_middleware(RequestLogger::new());
//!
//! let wallets = client.list_wallets(None).await?;
//! for wallet in wallets.wallets {
//!     println!("{wallet}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result`] types. [`ClientError`] separates:
//!
//! - Transport failures (connection refused, timeouts, cancellation)
//! - Resolved server errors (4xx/5xx responses with a contextual message)
//! - Contract violations (2xx responses without the promised body)
//! - Middleware, URL and serialization errors

mod auth;
mod envelope;
mod error;
mod logging;
mod middleware;
pub mod operations;
mod pipeline;
mod request;
mod resolve;
mod transport;
mod types;
mod wallet_name;
mod wallet_rpc_client;

pub use auth::BearerAuth;
pub use envelope::Envelope;
pub use error::{ClientError, ResolvedError, TransportError};
pub use logging::RequestLogger;
pub use middleware::{Middleware, MiddlewareHandle, MiddlewareRegistry};
pub use operations::Operation;
pub use pipeline::run_pipeline;
pub use request::{ApiRequest, ApiResponse};
pub use resolve::{HTML_ERROR_PREFIX, ResolverPolicy, extract_error_message, resolve, resolve_failure};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    AccountInfo, CreateWalletRequest, CreateWalletResponse, DirectSendRequest, DirectSendResponse, ErrorMessage,
    GetInfoResponse, ListWalletsResponse, LockWalletResponse, SessionResponse, TxInfo, TxInput, TxOutput,
    UnlockWalletRequest, UnlockWalletResponse, WalletDisplayResponse, WalletInfo, WalletType,
};
pub use wallet_name::{WALLET_FILE_SUFFIX, display_wallet_name, normalize_wallet_name};
pub use wallet_rpc_client::WalletRpcClient;
