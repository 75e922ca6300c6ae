//! HTTP routes
//!
//! Handlers take the already-collected request body and the caller identity
//! forwarded by the upstream auth gateway, and return complete responses.

pub mod admin;
pub mod health;
pub mod listings;
pub mod moderation;

use bson::DateTime;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::error;

use crate::db::schemas::{ListingDoc, ModerationStatus, ReportEntry};
use crate::types::ModerationError;

pub use admin::{handle_moderate_listing, handle_moderation_queue, match_moderation_route};
pub use health::health_check;
pub use listings::{
    handle_create_listing, handle_get_listing, handle_submit_report, handle_update_listing,
    match_listing_route, ListingRoute,
};
pub use moderation::handle_check_text;

pub type FullBody = Full<Bytes>;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user role
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Caller identity as forwarded by the auth gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: String,
}

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        let role = headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "user".to_string());

        Some(Self {
            user_id: user_id.to_string(),
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Report as returned to API clients
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub reporter_id: String,
    pub reason: String,
    pub created_at: Option<String>,
}

impl From<&ReportEntry> for ReportView {
    fn from(entry: &ReportEntry) -> Self {
        Self {
            reporter_id: entry.reporter_id.clone(),
            reason: entry.reason.clone(),
            created_at: rfc3339(Some(entry.created_at)),
        }
    }
}

/// Listing as returned to API clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub moderation_status: ModerationStatus,
    pub report_count: i32,
    /// Only included for admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<Vec<ReportView>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ListingView {
    pub fn public(listing: &ListingDoc) -> Self {
        Self {
            id: listing.id_hex().unwrap_or_default(),
            owner_id: listing.owner_id.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            moderation_status: listing.moderation_status,
            report_count: listing.report_count,
            reports: None,
            created_at: rfc3339(listing.metadata.created_at),
            updated_at: rfc3339(listing.metadata.updated_at),
        }
    }

    pub fn with_reports(listing: &ListingDoc) -> Self {
        Self {
            reports: Some(listing.reports.iter().map(ReportView::from).collect()),
            ..Self::public(listing)
        }
    }
}

fn rfc3339(dt: Option<DateTime>) -> Option<String> {
    dt.and_then(|d| d.try_to_rfc3339_string().ok())
}

// =============================================================================
// Response Helpers
// =============================================================================

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub fn error_response(status: StatusCode, error: &str, code: Option<&str>) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
            code: code.map(|c| c.to_string()),
        },
    )
}

/// Map a service error onto an HTTP response
pub fn service_error_response(err: &ModerationError) -> Response<FullBody> {
    let status = match err {
        ModerationError::NotFound(_) => StatusCode::NOT_FOUND,
        ModerationError::Validation(_) | ModerationError::Serialization(_) => {
            StatusCode::BAD_REQUEST
        }
        ModerationError::Conflict(_) => StatusCode::CONFLICT,
        ModerationError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ModerationError::Forbidden(_) => StatusCode::FORBIDDEN,
        ModerationError::Database(_)
        | ModerationError::Nats(_)
        | ModerationError::Config(_)
        | ModerationError::Io(_) => {
            error!("Request failed: {}", err);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(err.code()),
            );
        }
    };

    error_response(status, &err.to_string(), Some(err.code()))
}

pub fn not_found_response(path: &str) -> Response<FullBody> {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("No route for {}", path),
        Some("NOT_FOUND"),
    )
}

/// Decode a JSON request body
#[allow(clippy::result_large_err)]
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response<FullBody>> {
    serde_json::from_slice(body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid JSON: {}", e),
            Some("INVALID_JSON"),
        )
    })
}

#[allow(clippy::result_large_err)]
pub fn require_caller(caller: Option<&Caller>) -> Result<&Caller, Response<FullBody>> {
    caller.ok_or_else(|| {
        error_response(
            StatusCode::UNAUTHORIZED,
            "Missing caller identity",
            Some("UNAUTHORIZED"),
        )
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(Caller::from_headers(&headers).is_none());

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u1"));
        let caller = Caller::from_headers(&headers).unwrap();
        assert_eq!(caller.user_id, "u1");
        assert!(!caller.is_admin());

        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("Admin"));
        assert!(Caller::from_headers(&headers).unwrap().is_admin());
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ModerationError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ModerationError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ModerationError::Conflict("x".into()), StatusCode::CONFLICT),
            (ModerationError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ModerationError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                ModerationError::Database("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_response(&err).status(), status);
        }
    }
}
