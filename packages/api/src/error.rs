use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{billing::BillingError, token::TokenError};

/// Error half of the API envelope.
///
/// Domain rejections travel as HTTP 200 with `status: 0` and a user-readable
/// `msg`; the frontend switches on the envelope, not the HTTP code.
/// Authentication failures add `kick_out: true` under HTTP 401, and internal
/// faults collapse to a generic 500 with the detail kept in the logs.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    msg: String,
    kick_out: bool,
}

impl ApiError {
    /// Business rejection the caller is expected to show to the user.
    pub fn rejected(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Rejected: {}", msg);
        Self {
            status: StatusCode::OK,
            msg,
            kick_out: false,
        }
    }

    /// Authentication failure; the frontend drops the stored token and returns
    /// to the login screen.
    pub fn kick_out(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Kicked out: {}", msg);
        Self {
            status: StatusCode::UNAUTHORIZED,
            msg,
            kick_out: true,
        }
    }

    /// Unexpected fault. The detail goes to the log, the response stays generic.
    pub fn internal(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::error!("Internal error: {}", msg);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            msg: "Internal server error".to_string(),
            kick_out: false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "status": 0,
            "msg": self.msg,
        });
        if self.kick_out {
            body["kick_out"] = json!(true);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::internal(format!("Database error: {:?}", err))
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        if err.is_expired() {
            Self::kick_out("Your session has expired. Please log in again")
        } else {
            Self::kick_out("Invalid authentication token")
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::internal(format!("Password hashing error: {:?}", err))
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::NotEligible => {
                Self::rejected("This restaurant is not eligible for a free trial")
            }
            BillingError::NotFound => {
                Self::rejected("No matching transaction was found for this restaurant")
            }
            BillingError::AlreadyReconciled => {
                Self::rejected("This payment has already been processed")
            }
            BillingError::NoPriorSubscription => {
                Self::rejected("No prior subscription was found for this restaurant")
            }
            BillingError::UpdateFailed(what) => {
                Self::internal(format!("{what} did not affect exactly one row"))
            }
            BillingError::Db(e) => e.into(),
        }
    }
}

impl std::error::Error for ApiError {}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.msg)
    }
}

// Convenience macros for quick error creation
#[macro_export]
macro_rules! rejected {
    ($($arg:tt)*) => { $crate::error::ApiError::rejected(format!($($arg)*)) };
}

#[macro_export]
macro_rules! internal {
    ($($arg:tt)*) => { $crate::error::ApiError::internal(format!($($arg)*)) };
}
