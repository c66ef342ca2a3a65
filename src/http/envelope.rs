//! Discriminated success/failure result of one typed call.

use serde::de::DeserializeOwned;

use super::error::ClientError;
use super::request::ApiResponse;
use super::types::ErrorMessage;

/// The outcome of a call, discriminated by the response status class.
///
/// 2xx responses become [`Success`](Envelope::Success), everything else
/// [`Failure`](Envelope::Failure). Both arms keep the raw response.
#[derive(Debug, Clone)]
pub enum Envelope<T, E = ErrorMessage> {
    Success {
        /// `None` when the body was empty or JSON `null`.
        data: Option<T>,
        response: ApiResponse,
    },
    Failure {
        /// The parsed error body, if it had the expected shape.
        error: Option<E>,
        response: ApiResponse,
    },
}

impl<T, E> Envelope<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    /// Classifies `response`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Json`] if a 2xx body is present but does not
    /// decode into `T`. Failure bodies never cause an error.
    pub fn from_response(response: ApiResponse) -> Result<Self, ClientError> {
        if response.is_success() {
            let data = if response.body().iter().all(u8::is_ascii_whitespace) {
                None
            } else {
                response.json::<Option<T>>()?
            };
            Ok(Envelope::Success { data, response })
        } else {
            let error = response.json::<E>().ok();
            Ok(Envelope::Failure { error, response })
        }
    }
}

impl<T, E> Envelope<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn response(&self) -> &ApiResponse {
        match self {
            Envelope::Success { response, .. } | Envelope::Failure { response, .. } => response,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success { data, .. } => data.as_ref(),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Envelope::Failure { error, .. } => error.as_ref(),
            Envelope::Success { .. } => None,
        }
    }
}
