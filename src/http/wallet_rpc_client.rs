//! High-level typed client for the JoinMarket wallet RPC service.
//!
//! This module provides the [`WalletRpcClient`] struct, the primary
//! interface for talking to a `jmwalletd` instance over HTTP.
//!
//! # Overview
//!
//! Every operation follows the same path:
//!
//! 1. Build the request URL from the operation's path template, substituting
//!    (and normalizing) the wallet file name where needed.
//! 2. Run the request through the client's middleware pipeline and the
//!    transport adapter.
//! 3. Classify the response into an [`Envelope`].
//! 4. Return the typed data, or resolve the failure into a
//!    [`ClientError::Resolved`] with an operation-specific message.
//!
//! # Example
//!
//! ```rust,no_run
//! use url::Url;
//! use jm_wallet_client::http::WalletRpcClient;
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = WalletRpcClient::new(Url::parse("https://localhost:28183/api/v1/")?)?;
//!
//! if client.is_online().await {
//!     let info = client.get_info(None).await?;
//!     println!("jmwalletd version {}", info.version);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ClientConfig;
use crate::log::{mask_amount, mask_string};

use super::auth::BearerAuth;
use super::envelope::Envelope;
use super::error::ClientError;
use super::logging::RequestLogger;
use super::middleware::{Middleware, MiddlewareHandle, MiddlewareRegistry};
use super::operations::{self, Operation};
use super::pipeline::run_pipeline;
use super::request::ApiRequest;
use super::resolve::{ResolverPolicy, resolve_failure};
use super::transport::{ReqwestTransport, Transport};
use super::types::{
    CreateWalletRequest, CreateWalletResponse, DirectSendRequest, DirectSendResponse, GetInfoResponse,
    ListWalletsResponse, LockWalletResponse, SessionResponse, UnlockWalletRequest, UnlockWalletResponse,
    WalletDisplayResponse,
};
use super::wallet_name::{display_wallet_name, normalize_wallet_name};

const WALLET_NAME_PARAM: &str = "walletname";

/// Typed client for a JoinMarket wallet daemon.
///
/// The client owns its [`MiddlewareRegistry`]; independently configured
/// clients never share middleware.
///
/// # Thread Safety
///
/// `WalletRpcClient` is safe to share across threads and can be used from
/// multiple async tasks concurrently. Middleware may be registered or removed
/// while calls are in flight; each call uses the middleware that was
/// registered when it started.
///
/// # Cancellation
///
/// Every operation accepts an optional [`CancellationToken`]. Cancelling it
/// aborts the in-flight request and the call fails with
/// [`TransportError::Cancelled`](super::TransportError::Cancelled). Other calls
/// are unaffected.
///
/// # Example
///
/// ```rust,no_run
/// use url::Url;
/// use jm_wallet_client::http::{CreateWalletRequest, WalletRpcClient, WalletType};
///
/// # async fn example() -> Result<(), anyhow::Error> {
/// let client = WalletRpcClient::new(Url::parse("https://localhost:28183/api/v1/")?)?;
///
/// let created = client
///     .create_wallet(
///         CreateWalletRequest {
///             walletname: "alice".to_string(),
///             password: "hunter2".to_string(),
///             wallettype: WalletType::SegWit,
///         },
///         None,
///     )
///     .await?;
///
/// // Later calls carry the session token.
/// let auth = client.authenticate(&created.token);
/// let session = client.session(None).await?;
/// println!("maker running: {}", session.maker_running);
/// client.remove_middleware(auth);
/// # Ok(())
/// # }
/// ```
pub struct WalletRpcClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    middleware: MiddlewareRegistry,
}

impl WalletRpcClient {
    /// Creates a client using a [`ReqwestTransport`] with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized (e.g. TLS
    /// backend initialization failure).
    pub fn new(base_url: Url) -> Result<Self, anyhow::Error> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(base_url, Arc::new(transport)))
    }

    /// Creates a client on top of an arbitrary transport adapter.
    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
            middleware: MiddlewareRegistry::new(),
        }
    }

    /// Creates a client from loaded configuration.
    ///
    /// The initial middleware set is derived from the configuration:
    /// a [`RequestLogger`] when `log_requests` is enabled, followed by
    /// [`BearerAuth`] when a token is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be initialized.
    pub fn from_config(config: &ClientConfig) -> Result<Self, anyhow::Error> {
        let base_url = Url::parse(&config.base_url)?;
        let transport = ReqwestTransport::with_config(config.max_retries, Duration::from_secs(config.timeout_secs))?;
        let mut client = Self::with_transport(base_url, Arc::new(transport));

        if config.log_requests {
            client = client.with_middleware(RequestLogger::new());
        }
        if let Some(token) = &config.token {
            client = client.with_middleware(BearerAuth::new(token.clone()));
        }
        Ok(client)
    }

    /// Registers `middleware` at construction time.
    #[must_use]
    pub fn with_middleware(self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.register(Arc::new(middleware));
        self
    }

    /// Appends `middleware` to the pipeline and returns its handle.
    pub fn register_middleware(&self, middleware: Arc<dyn Middleware>) -> MiddlewareHandle {
        self.middleware.register(middleware)
    }

    /// Removes a middleware. Unknown or already removed handles are ignored.
    pub fn remove_middleware(&self, handle: MiddlewareHandle) -> bool {
        self.middleware.remove(handle)
    }

    /// Installs a [`BearerAuth`] middleware for `token`.
    ///
    /// Remove the returned handle to drop the credentials again, e.g. after
    /// locking the wallet.
    pub fn authenticate(&self, token: &str) -> MiddlewareHandle {
        self.middleware.register(Arc::new(BearerAuth::new(token)))
    }

    pub fn middleware(&self) -> &MiddlewareRegistry {
        &self.middleware
    }

    /// Returns the daemon base URL as a string.
    pub fn get_address(&self) -> String {
        self.base_url.to_string()
    }

    /// Sends one operation through the pipeline and classifies the response.
    ///
    /// This is the envelope-level entry point; the typed operations below are
    /// built on it. Non-success statuses are returned as
    /// [`Envelope::Failure`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built, a middleware hook fails,
    /// the transport fails (including cancellation), or a success body cannot
    /// be decoded.
    pub async fn send<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        path_params: &[(&str, &str)],
        body: Option<serde_json::Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Envelope<T>, ClientError> {
        let url = operation.url(&self.base_url, path_params)?;
        let mut request = ApiRequest::new(operation.method.clone(), url).with_cancel(cancel.cloned());
        if let Some(body) = body {
            request = request.with_json(&body)?;
        }

        let middleware = self.middleware.snapshot();
        let response = run_pipeline(&middleware, request, self.transport.as_ref()).await?;

        Envelope::from_response(response)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        path_params: &[(&str, &str)],
        body: Option<serde_json::Value>,
        cancel: Option<&CancellationToken>,
        policy: ResolverPolicy,
    ) -> Result<T, ClientError> {
        match self.send::<T>(operation, path_params, body, cancel).await? {
            Envelope::Success { data: Some(data), .. } => Ok(data),
            Envelope::Success { data: None, response } => {
                warn!(
                    operation = operation.name,
                    status = response.status().as_u16();
                    "HTTP: Success response without body"
                );
                Err(ClientError::ContractViolation {
                    operation: operation.name,
                })
            },
            Envelope::Failure { response, .. } => resolve_failure(response, &policy),
        }
    }

    /// Retrieves the daemon version.
    ///
    /// Queries the `getinfo` endpoint, which requires no authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled
    /// or the daemon answers with a non-success status.
    pub async fn get_info(&self, cancel: Option<&CancellationToken>) -> Result<GetInfoResponse, ClientError> {
        debug!("HTTP: Requesting server info");
        let policy =
            ResolverPolicy::new().with_resolver(|_, reason| format!("Failed to load the server info: {reason}"));
        self.call(&operations::GET_INFO, &[], None, cancel, policy).await
    }

    /// Checks if the daemon is online and reachable.
    ///
    /// Convenience wrapper around [`get_info`](Self::get_info) that returns
    /// `true` on success and `false` for any failure.
    pub async fn is_online(&self) -> bool {
        match self.get_info(None).await {
            Ok(_) => {
                debug!("Wallet daemon is online");
                true
            },
            Err(e) => {
                warn!(
                    error:% = e;
                    "Wallet daemon is offline"
                );
                false
            },
        }
    }

    /// Retrieves the current session state: whether a wallet is loaded and
    /// whether a maker or coinjoin is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled
    /// or the daemon answers with a non-success status.
    pub async fn session(&self, cancel: Option<&CancellationToken>) -> Result<SessionResponse, ClientError> {
        debug!("HTTP: Requesting session");
        let policy = ResolverPolicy::new().with_resolver(|_, reason| format!("Failed to load the session: {reason}"));
        self.call(&operations::SESSION, &[], None, cancel, policy).await
    }

    /// Lists the wallet files known to the daemon.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled
    /// or the daemon answers with a non-success status.
    pub async fn list_wallets(&self, cancel: Option<&CancellationToken>) -> Result<ListWalletsResponse, ClientError> {
        debug!("HTTP: Requesting wallet list");
        let policy = ResolverPolicy::new().with_resolver(|_, reason| format!("Failed to load wallets: {reason}"));
        self.call(&operations::LIST_WALLETS, &[], None, cancel, policy).await
    }

    /// Creates a new wallet and loads it.
    ///
    /// The wallet name is normalized to carry the `.jmdat` suffix before it is
    /// sent. The response contains the session token and the seed phrase.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled,
    /// or the daemon rejects the request (e.g. `409 Conflict` when a wallet
    /// with that name exists).
    pub async fn create_wallet(
        &self,
        request: CreateWalletRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<CreateWalletResponse, ClientError> {
        let request = CreateWalletRequest {
            walletname: normalize_wallet_name(&request.walletname),
            ..request
        };
        info!(
            target: "audit",
            wallet:% = mask_string(&request.walletname),
            wallet_type:% = request.wallettype;
            "HTTP: Creating wallet"
        );

        let name = display_wallet_name(&request.walletname).to_string();
        let policy = ResolverPolicy::new().with_resolver(move |response, reason| {
            if response.status() == StatusCode::CONFLICT {
                format!("Wallet {name} already exists: {reason}")
            } else {
                format!("Failed to create wallet {name}: {reason}")
            }
        });
        let body = serde_json::to_value(&request)?;
        self.call(&operations::CREATE_WALLET, &[], Some(body), cancel, policy)
            .await
    }

    /// Unlocks (loads) an existing wallet and returns a fresh session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled,
    /// the password is wrong or another wallet is already loaded.
    pub async fn unlock_wallet(
        &self,
        wallet: &str,
        request: UnlockWalletRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<UnlockWalletResponse, ClientError> {
        let wallet = normalize_wallet_name(wallet);
        info!(target: "audit", wallet:% = mask_string(&wallet); "HTTP: Unlocking wallet");

        let name = display_wallet_name(&wallet).to_string();
        let policy =
            ResolverPolicy::new().with_resolver(move |_, reason| format!("Failed to unlock wallet {name}: {reason}"));
        let body = serde_json::to_value(&request)?;
        self.call(
            &operations::UNLOCK_WALLET,
            &[(WALLET_NAME_PARAM, wallet.as_str())],
            Some(body),
            cancel,
            policy,
        )
        .await
    }

    /// Locks (unloads) a wallet. Requires a valid session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled or
    /// the token is not accepted.
    pub async fn lock_wallet(
        &self,
        wallet: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<LockWalletResponse, ClientError> {
        let wallet = normalize_wallet_name(wallet);
        info!(target: "audit", wallet:% = mask_string(&wallet); "HTTP: Locking wallet");

        let name = display_wallet_name(&wallet).to_string();
        let policy =
            ResolverPolicy::new().with_resolver(move |_, reason| format!("Failed to lock wallet {name}: {reason}"));
        self.call(&operations::LOCK_WALLET, &[(WALLET_NAME_PARAM, wallet.as_str())], None, cancel, policy)
            .await
    }

    /// Retrieves balances and accounts of a loaded wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled or
    /// the token is not accepted.
    pub async fn display_wallet(
        &self,
        wallet: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<WalletDisplayResponse, ClientError> {
        let wallet = normalize_wallet_name(wallet);
        debug!(wallet:% = mask_string(&wallet); "HTTP: Requesting wallet display");

        let name = display_wallet_name(&wallet).to_string();
        let policy =
            ResolverPolicy::new().with_resolver(move |_, reason| format!("Failed to load wallet {name}: {reason}"));
        self.call(&operations::DISPLAY_WALLET, &[(WALLET_NAME_PARAM, wallet.as_str())], None, cancel, policy)
            .await
    }

    /// Sends funds from a mixdepth of `wallet` to an address without a
    /// coinjoin.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, the call is cancelled,
    /// the token is not accepted, or the daemon refuses to send (e.g.
    /// `503 Service Unavailable` while a maker or coinjoin is running).
    pub async fn direct_send(
        &self,
        wallet: &str,
        request: DirectSendRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<DirectSendResponse, ClientError> {
        let wallet = normalize_wallet_name(wallet);
        info!(
            target: "audit",
            wallet:% = mask_string(&wallet),
            mixdepth = request.mixdepth,
            amount:% = mask_amount(request.amount_sats);
            "HTTP: Submitting direct send"
        );

        let name = display_wallet_name(&wallet).to_string();
        let policy = ResolverPolicy::new().with_resolver(move |response, reason| {
            if response.status() == StatusCode::SERVICE_UNAVAILABLE {
                format!("Cannot send from wallet {name} while a maker or coinjoin is running: {reason}")
            } else {
                format!("Failed to send from wallet {name}: {reason}")
            }
        });
        let body = serde_json::to_value(&request)?;
        let response: DirectSendResponse = self
            .call(
                &operations::DIRECT_SEND,
                &[(WALLET_NAME_PARAM, wallet.as_str())],
                Some(body),
                cancel,
                policy,
            )
            .await?;

        info!(target: "audit", txid:% = response.txinfo.txid; "HTTP: Direct send broadcast");
        Ok(response)
    }
}

impl std::fmt::Debug for WalletRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRpcClient")
            .field("base_url", &self.base_url.as_str())
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}
