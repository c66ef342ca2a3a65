//! Runs one request/response cycle through a middleware snapshot.

use std::sync::Arc;

use log::trace;

use super::error::ClientError;
use super::middleware::Middleware;
use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;

/// Applies `middleware` around a single call to `transport`.
///
/// Request hooks run in order, each seeing the latest request. The transport
/// receives the final request. Response hooks then run in the *same* order
/// with that final request and the latest response.
///
/// A failing request hook aborts before the transport is invoked; a failing
/// response hook aborts before later response hooks run.
pub async fn run_pipeline(
    middleware: &[Arc<dyn Middleware>],
    mut request: ApiRequest,
    transport: &dyn Transport,
) -> Result<ApiResponse, ClientError> {
    for (index, mw) in middleware.iter().enumerate() {
        if let Some(replacement) = mw.on_request(&request).await.map_err(ClientError::Middleware)? {
            trace!(index = index; "Request replaced by middleware");
            request = replacement;
        }
    }

    let mut response = transport.send(request.clone()).await?;

    for (index, mw) in middleware.iter().enumerate() {
        if let Some(replacement) = mw
            .on_response(&request, &response)
            .await
            .map_err(ClientError::Middleware)?
        {
            trace!(index = index; "Response replaced by middleware");
            response = replacement;
        }
    }

    Ok(response)
}
