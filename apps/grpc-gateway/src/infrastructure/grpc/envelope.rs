//! Response Envelope
//!
//! Failures travel on two channels:
//!
//! | Channel | Used for | Wire effect |
//! |---------|----------|-------------|
//! | transport | missing principal, principal/body mismatch | RPC fails with a status |
//! | envelope | validation, credentials, lookup, use-case errors | RPC succeeds, `success = false` |
//!
//! Handlers resolve each call to a [`CallOutcome`] and [`respond`] maps it to
//! the wire at the boundary.

use chrono::Utc;
use tonic::{Code, Response, Status};

use super::proto::hub::v1 as proto;
use crate::application::errors::UseCaseError;

/// Build an envelope stamped with the current unix time.
#[must_use]
pub fn api_response(success: bool, code: Code, message: impl Into<String>) -> proto::ApiResponse {
    proto::ApiResponse {
        success,
        message: message.into(),
        code: code as i32,
        timestamp: Utc::now().timestamp(),
    }
}

/// Success envelope.
#[must_use]
pub fn ok(message: impl Into<String>) -> proto::ApiResponse {
    api_response(true, Code::Ok, message)
}

/// Status code an application error is reported under.
#[must_use]
pub const fn code_for(error: &UseCaseError) -> Code {
    match error {
        UseCaseError::InvalidInput(_) => Code::InvalidArgument,
        UseCaseError::InvalidCredentials => Code::Unauthenticated,
        UseCaseError::NotFound { .. } => Code::NotFound,
        UseCaseError::PermissionDenied(_) => Code::PermissionDenied,
        UseCaseError::FailedPrecondition(_) => Code::FailedPrecondition,
        UseCaseError::Internal(_) => Code::Internal,
    }
}

/// Failure reported inside the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeError {
    /// Status code written to `ApiResponse.code`.
    pub code: Code,
    /// Human readable message.
    pub message: String,
}

impl EnvelopeError {
    /// Create an envelope error.
    #[must_use]
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Validation failure.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// Feature not available yet.
    #[must_use]
    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(Code::Unimplemented, message)
    }

    /// Map a use-case error, prefixing its text with `context`.
    #[must_use]
    pub fn from_use_case(context: &str, error: &UseCaseError) -> Self {
        Self::new(code_for(error), format!("{context}: {error}"))
    }

    fn into_api_response(self) -> proto::ApiResponse {
        api_response(false, self.code, self.message)
    }
}

/// Result of resolving a single call.
#[derive(Debug)]
pub enum CallOutcome<T> {
    /// The call succeeded; `body` is returned with an OK envelope.
    Success {
        /// Envelope message.
        message: String,
        /// Response body (its envelope is overwritten).
        body: T,
    },
    /// Domain or validation failure, reported with `success = false`.
    Failure(EnvelopeError),
    /// Authentication or authorization failure, reported as a transport status.
    Rejected(Status),
}

impl<T> CallOutcome<T> {
    /// Successful outcome.
    pub fn success(message: impl Into<String>, body: T) -> Self {
        Self::Success {
            message: message.into(),
            body,
        }
    }
}

impl<T> From<EnvelopeError> for CallOutcome<T> {
    fn from(error: EnvelopeError) -> Self {
        Self::Failure(error)
    }
}

impl<T> From<Status> for CallOutcome<T> {
    fn from(status: Status) -> Self {
        Self::Rejected(status)
    }
}

/// Response messages that embed an `ApiResponse`.
pub trait Enveloped: Default {
    /// Replace the embedded envelope.
    fn set_api_response(&mut self, api_response: proto::ApiResponse);
}

macro_rules! impl_enveloped {
    ($($message:ty),+ $(,)?) => {
        $(
            impl Enveloped for $message {
                fn set_api_response(&mut self, api_response: proto::ApiResponse) {
                    self.api_response = Some(api_response);
                }
            }
        )+
    };
}

impl_enveloped!(
    proto::LoginResponse,
    proto::ValidateTokenResponse,
    proto::SubmitOrderResponse,
    proto::GetOrderDetailsResponse,
    proto::GetOrderStatusResponse,
    proto::CancelOrderResponse,
    proto::GetPositionsResponse,
    proto::GetPositionAggregationResponse,
    proto::CreatePositionResponse,
    proto::UpdatePositionResponse,
    proto::GetMarketDataResponse,
);

/// Map an outcome to the wire.
///
/// `Failure` yields a default body carrying only the failed envelope.
///
/// # Errors
///
/// Returns the status of a `Rejected` outcome.
pub fn respond<T: Enveloped>(outcome: CallOutcome<T>) -> Result<Response<T>, Status> {
    match outcome {
        CallOutcome::Success { message, mut body } => {
            body.set_api_response(ok(message));
            Ok(Response::new(body))
        }
        CallOutcome::Failure(error) => {
            tracing::debug!(code = ?error.code, message = %error.message, "Call failed in envelope");
            let mut body = T::default();
            body.set_api_response(error.into_api_response());
            Ok(Response::new(body))
        }
        CallOutcome::Rejected(status) => Err(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(UseCaseError::InvalidInput("x".into()), Code::InvalidArgument)]
    #[test_case(UseCaseError::InvalidCredentials, Code::Unauthenticated)]
    #[test_case(UseCaseError::not_found("order", "o-1"), Code::NotFound)]
    #[test_case(UseCaseError::PermissionDenied("x".into()), Code::PermissionDenied)]
    #[test_case(UseCaseError::FailedPrecondition("x".into()), Code::FailedPrecondition)]
    #[test_case(UseCaseError::Internal("x".into()), Code::Internal)]
    fn use_case_errors_map_to_codes(error: UseCaseError, expected: Code) {
        assert_eq!(code_for(&error), expected);
    }

    #[test]
    fn from_use_case_appends_error_text() {
        let error = EnvelopeError::from_use_case(
            "Failed to cancel order",
            &UseCaseError::not_found("order", "o-1"),
        );
        assert_eq!(error.code, Code::NotFound);
        assert_eq!(error.message, "Failed to cancel order: order not found: o-1");
    }

    #[test]
    fn success_envelope_is_populated() {
        let response = respond(CallOutcome::success(
            "done",
            proto::CancelOrderResponse {
                order_id: "o-1".into(),
                ..Default::default()
            },
        ))
        .unwrap()
        .into_inner();

        let envelope = response.api_response.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.message, "done");
        assert!(envelope.timestamp > 0);
        assert_eq!(response.order_id, "o-1");
    }

    #[test]
    fn failure_keeps_transport_ok() {
        let outcome: CallOutcome<proto::GetOrderStatusResponse> =
            EnvelopeError::invalid_argument("Order ID is required").into();
        let response = respond(outcome).unwrap().into_inner();

        let envelope = response.api_response.unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.code, Code::InvalidArgument as i32);
        assert_eq!(envelope.message, "Order ID is required");
        assert!(envelope.timestamp > 0);
        assert!(response.order_id.is_empty());
    }

    #[test]
    fn rejection_is_a_transport_error() {
        let outcome: CallOutcome<proto::GetPositionsResponse> =
            Status::permission_denied("nope").into();
        let status = respond(outcome).unwrap_err();
        assert_eq!(status.code(), Code::PermissionDenied);
    }
}
