//! Moderator endpoints
//!
//! - `GET /admin/moderation/queue` - Listings currently flagged
//! - `PUT /admin/listings/{id}/moderation` - Set a listing's status
//!
//! Both require the `admin` role.

use bytes::Bytes;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    error_response, json_response, parse_json, require_caller, service_error_response, Caller,
    FullBody, ListingView,
};
use crate::db::schemas::ModerationStatus;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub status: ModerationStatus,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub listings: Vec<ListingView>,
    pub total: usize,
}

/// Extract `{id}` from `/admin/listings/{id}/moderation`
pub fn match_moderation_route(path: &str) -> Option<&str> {
    path.strip_prefix("/admin/listings/")?
        .strip_suffix("/moderation")
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

#[allow(clippy::result_large_err)]
fn require_admin(caller: Option<&Caller>) -> Result<&Caller, Response<FullBody>> {
    let caller = require_caller(caller)?;
    if caller.is_admin() {
        Ok(caller)
    } else {
        Err(error_response(
            StatusCode::FORBIDDEN,
            "Admin role required",
            Some("FORBIDDEN"),
        ))
    }
}

pub async fn handle_moderation_queue(
    state: Arc<AppState>,
    caller: Option<&Caller>,
) -> Response<FullBody> {
    if let Err(resp) = require_admin(caller) {
        return resp;
    }

    match state.listings.moderation_queue().await {
        Ok(listings) => {
            let listings: Vec<ListingView> =
                listings.iter().map(ListingView::with_reports).collect();
            json_response(
                StatusCode::OK,
                &QueueResponse {
                    total: listings.len(),
                    listings,
                },
            )
        }
        Err(e) => service_error_response(&e),
    }
}

pub async fn handle_moderate_listing(
    state: Arc<AppState>,
    caller: Option<&Caller>,
    id: &str,
    body: &Bytes,
) -> Response<FullBody> {
    if let Err(resp) = require_admin(caller) {
        return resp;
    }
    let request: ModerateRequest = match parse_json(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match state.listings.moderate(id, request.status).await {
        Ok(listing) => json_response(StatusCode::OK, &ListingView::with_reports(&listing)),
        Err(e) => service_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{self, admin, body_json, user};
    use crate::routes::{handle_create_listing, handle_submit_report};

    #[test]
    fn test_match_moderation_route() {
        assert_eq!(match_moderation_route("/admin/listings/abc/moderation"), Some("abc"));
        assert_eq!(match_moderation_route("/admin/listings//moderation"), None);
        assert_eq!(match_moderation_route("/admin/listings/a/b/moderation"), None);
        assert_eq!(match_moderation_route("/admin/listings/abc"), None);
    }

    #[tokio::test]
    async fn test_queue_requires_admin() {
        let state = test_support::state();
        assert_eq!(
            handle_moderation_queue(state.clone(), None).await.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            handle_moderation_queue(state, Some(&user("u1"))).await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_escalated_listing_enters_queue_and_leaves_on_approval() {
        let state = test_support::state();
        let created = handle_create_listing(
            state.clone(),
            Some(&user("owner")),
            &Bytes::from(r#"{"title":"Loft"}"#),
        )
        .await;
        let id = body_json(created).await["listing"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        for reporter in ["u1", "u2", "u3"] {
            let response = handle_submit_report(
                state.clone(),
                Some(&user(reporter)),
                &id,
                &Bytes::from(r#"{"reason":"scam"}"#),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let queue = body_json(handle_moderation_queue(state.clone(), Some(&admin())).await).await;
        assert_eq!(queue["total"], 1);
        assert_eq!(queue["listings"][0]["moderationStatus"], "flagged");
        assert_eq!(queue["listings"][0]["reports"].as_array().unwrap().len(), 3);

        let moderated = handle_moderate_listing(
            state.clone(),
            Some(&admin()),
            &id,
            &Bytes::from(r#"{"status":"approved"}"#),
        )
        .await;
        assert_eq!(moderated.status(), StatusCode::OK);
        assert_eq!(body_json(moderated).await["moderationStatus"], "approved");

        let queue = body_json(handle_moderation_queue(state, Some(&admin())).await).await;
        assert_eq!(queue["total"], 0);
    }

    #[tokio::test]
    async fn test_moderate_rejects_unknown_status() {
        let response = handle_moderate_listing(
            test_support::state(),
            Some(&admin()),
            "65a1f0c2e4b0a1b2c3d4e5f6",
            &Bytes::from(r#"{"status":"hidden"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
