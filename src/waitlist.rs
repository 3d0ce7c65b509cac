//! Page-facing contract of the waitlist signup endpoint.
//!
//! Only the request/response shapes and input validation live here. Storage,
//! confirmation mail, geolocation and rate limiting belong to the service.

use serde::{Deserialize, Serialize};

/// `POST /api/waitlist` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistRequest {
    /// Address to register.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Newsletter opt-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsletter: Option<bool>,
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WaitlistResponse {
    /// `{ "success": true }`.
    Success {
        /// Always `true`.
        success: bool,
    },
    /// `{ "error": "..." }`.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

impl WaitlistResponse {
    /// Successful signup body.
    pub fn success() -> Self {
        Self::Success { success: true }
    }

    /// Error body.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { error: msg.into() }
    }
}

/// HTTP statuses the endpoint answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WaitlistStatus {
    /// 200: signed up.
    Ok,
    /// 400: missing or malformed email.
    BadRequest,
    /// 409: already on the list.
    Conflict,
    /// 429: rate limited.
    TooManyRequests,
    /// 500: anything else.
    ServerError,
}

impl WaitlistStatus {
    /// Numeric status code.
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Conflict => 409,
            Self::TooManyRequests => 429,
            Self::ServerError => 500,
        }
    }

    /// Status for a numeric code, if it is part of the contract.
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            200 => Self::Ok,
            400 => Self::BadRequest,
            409 => Self::Conflict,
            429 => Self::TooManyRequests,
            500 => Self::ServerError,
            _ => return None,
        })
    }

    /// Canonical body for this status.
    pub fn response(self) -> WaitlistResponse {
        match self {
            Self::Ok => WaitlistResponse::success(),
            Self::BadRequest => WaitlistResponse::error("Invalid email address"),
            Self::Conflict => WaitlistResponse::error("This email is already on the waitlist"),
            Self::TooManyRequests => {
                WaitlistResponse::error("Too many requests. Please try again later.")
            }
            Self::ServerError => WaitlistResponse::error("Something went wrong. Please try again."),
        }
    }
}

/// A validated, normalized signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signup {
    /// Trimmed, lower-cased address.
    pub email: String,
    /// Trimmed name, if non-empty.
    pub name: Option<String>,
    /// Newsletter opt-in (defaults to `false`).
    pub newsletter: bool,
}

/// A request rejected before reaching the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status:?}: {message}")]
pub struct Rejection {
    /// Status to answer with.
    pub status: WaitlistStatus,
    /// Error message for the body.
    pub message: String,
}

impl Rejection {
    fn bad_request(message: &str) -> Self {
        Self {
            status: WaitlistStatus::BadRequest,
            message: message.to_owned(),
        }
    }

    /// Response body for this rejection.
    pub fn response(&self) -> WaitlistResponse {
        WaitlistResponse::error(self.message.clone())
    }
}

impl WaitlistRequest {
    /// Validate and normalize.
    pub fn validate(&self) -> Result<Signup, Rejection> {
        let email = self
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Rejection::bad_request("Email is required"))?;
        if !is_plausible_email(email) {
            return Err(Rejection::bad_request("Invalid email address"));
        }
        Ok(Signup {
            email: email.trim().to_lowercase(),
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_owned),
            newsletter: self.newsletter.unwrap_or(false),
        })
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_plausible_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
#[path = "../tests/unit/waitlist.rs"]
mod tests;
