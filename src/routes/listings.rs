//! Listing endpoints
//!
//! ## Endpoints
//!
//! - `POST /api/listings` - Create a listing, returns the advisory verdict
//! - `GET /api/listings/{id}` - Fetch a listing
//! - `PUT /api/listings/{id}` - Edit title/description (owner only)
//! - `POST /api/listings/{id}/reports` - Report a listing

use bytes::Bytes;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    json_response, parse_json, require_caller, service_error_response, Caller, FullBody,
    ListingView, ReportView,
};
use crate::moderation::{CombinedVerdict, ListingText};
use crate::server::AppState;

/// Sub-resource addressed under `/api/listings/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingRoute<'a> {
    Listing(&'a str),
    Reports(&'a str),
}

/// Split `/api/listings/{id}[/reports]`
pub fn match_listing_route(path: &str) -> Option<ListingRoute<'_>> {
    let rest = path.strip_prefix("/api/listings/")?;
    let mut parts = rest.trim_end_matches('/').splitn(2, '/');
    let id = parts.next().filter(|id| !id.is_empty())?;

    match parts.next() {
        None => Some(ListingRoute::Listing(id)),
        Some("reports") => Some(ListingRoute::Reports(id)),
        Some(_) => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingWriteResponse {
    pub listing: ListingView,
    /// Advisory only; the listing is saved regardless
    pub moderation: CombinedVerdict,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub reason: String,
}

pub async fn handle_create_listing(
    state: Arc<AppState>,
    caller: Option<&Caller>,
    body: &Bytes,
) -> Response<FullBody> {
    let caller = match require_caller(caller) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let text: ListingText = match parse_json(body) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match state.listings.create_listing(&caller.user_id, text).await {
        Ok((listing, moderation)) => json_response(
            StatusCode::CREATED,
            &ListingWriteResponse {
                listing: ListingView::public(&listing),
                moderation,
            },
        ),
        Err(e) => service_error_response(&e),
    }
}

pub async fn handle_get_listing(
    state: Arc<AppState>,
    caller: Option<&Caller>,
    id: &str,
) -> Response<FullBody> {
    match state.listings.get_listing(id).await {
        Ok(listing) => {
            let view = if caller.is_some_and(Caller::is_admin) {
                ListingView::with_reports(&listing)
            } else {
                ListingView::public(&listing)
            };
            json_response(StatusCode::OK, &view)
        }
        Err(e) => service_error_response(&e),
    }
}

pub async fn handle_update_listing(
    state: Arc<AppState>,
    caller: Option<&Caller>,
    id: &str,
    body: &Bytes,
) -> Response<FullBody> {
    let caller = match require_caller(caller) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let text: ListingText = match parse_json(body) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match state.listings.update_listing(id, &caller.user_id, text).await {
        Ok((listing, moderation)) => json_response(
            StatusCode::OK,
            &ListingWriteResponse {
                listing: ListingView::public(&listing),
                moderation,
            },
        ),
        Err(e) => service_error_response(&e),
    }
}

pub async fn handle_submit_report(
    state: Arc<AppState>,
    caller: Option<&Caller>,
    id: &str,
    body: &Bytes,
) -> Response<FullBody> {
    let caller = match require_caller(caller) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let request: ReportRequest = match parse_json(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match state
        .reports
        .submit_report(id, &caller.user_id, &request.reason)
        .await
    {
        Ok(entry) => json_response(StatusCode::CREATED, &ReportView::from(&entry)),
        Err(e) => service_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{self, admin, body_json, user};

    async fn create(state: &Arc<AppState>, owner: &str, body: &str) -> String {
        let response =
            handle_create_listing(state.clone(), Some(&user(owner)), &Bytes::from(body.to_string()))
                .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["listing"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_match_listing_route() {
        assert_eq!(
            match_listing_route("/api/listings/abc"),
            Some(ListingRoute::Listing("abc"))
        );
        assert_eq!(
            match_listing_route("/api/listings/abc/reports"),
            Some(ListingRoute::Reports("abc"))
        );
        assert_eq!(
            match_listing_route("/api/listings/abc/reports/"),
            Some(ListingRoute::Reports("abc"))
        );
        assert_eq!(match_listing_route("/api/listings/"), None);
        assert_eq!(match_listing_route("/api/listings/abc/photos"), None);
        assert_eq!(match_listing_route("/api/other/abc"), None);
    }

    #[tokio::test]
    async fn test_create_returns_advisory_verdict() {
        let state = test_support::state();
        let response = handle_create_listing(
            state,
            Some(&user("owner")),
            &Bytes::from(r#"{"title":"Adults only loft","description":"Quiet"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(response).await;
        assert_eq!(json["listing"]["moderationStatus"], "pending");
        assert_eq!(json["moderation"]["flagged"], true);
        assert_eq!(json["moderation"]["title"]["moderationScore"], 35);
    }

    #[tokio::test]
    async fn test_create_requires_caller() {
        let response = handle_create_listing(
            test_support::state(),
            None,
            &Bytes::from(r#"{"title":"Loft"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_report_flow_status_codes() {
        let state = test_support::state();
        let id = create(&state, "owner", r#"{"title":"Loft"}"#).await;
        let body = Bytes::from(r#"{"reason":"fake photos"}"#);

        let first = handle_submit_report(state.clone(), Some(&user("u1")), &id, &body).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let json = body_json(first).await;
        assert_eq!(json["reporterId"], "u1");
        assert_eq!(json["reason"], "fake photos");

        let dup = handle_submit_report(state.clone(), Some(&user("u1")), &id, &body).await;
        assert_eq!(dup.status(), StatusCode::CONFLICT);

        let blank = handle_submit_report(
            state.clone(),
            Some(&user("u2")),
            &id,
            &Bytes::from(r#"{"reason":""}"#),
        )
        .await;
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

        let missing = handle_submit_report(
            state.clone(),
            Some(&user("u2")),
            "65a1f0c2e4b0a1b2c3d4e5f6",
            &body,
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let view = body_json(handle_get_listing(state, None, &id).await).await;
        assert_eq!(view["reportCount"], 1);
        assert!(view.get("reports").is_none());
    }

    #[tokio::test]
    async fn test_admin_sees_reports() {
        let state = test_support::state();
        let id = create(&state, "owner", r#"{"title":"Loft"}"#).await;
        handle_submit_report(
            state.clone(),
            Some(&user("u1")),
            &id,
            &Bytes::from(r#"{"reason":"spam"}"#),
        )
        .await;

        let view = body_json(handle_get_listing(state, Some(&admin()), &id).await).await;
        assert_eq!(view["reports"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_other_user_forbidden() {
        let state = test_support::state();
        let id = create(&state, "owner", r#"{"title":"Loft"}"#).await;

        let response = handle_update_listing(
            state,
            Some(&user("someone-else")),
            &id,
            &Bytes::from(r#"{"title":"Mine now"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
