//! `POST /api/moderation/check` - score listing text without saving it

use bytes::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use super::{json_response, parse_json, FullBody};
use crate::moderation::ListingText;
use crate::server::AppState;

pub fn handle_check_text(state: Arc<AppState>, body: &Bytes) -> Response<FullBody> {
    let text: ListingText = match parse_json(body) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    json_response(StatusCode::OK, &state.listings.check_text(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;

    #[tokio::test]
    async fn test_check_flags_prohibited_description() {
        let body = Bytes::from(
            r#"{"title":"Cozy home","description":"This is a grow house with guaranteed return"}"#,
        );
        let response = handle_check_text(test_support::state(), &body);
        assert_eq!(response.status(), StatusCode::OK);

        let json = test_support::body_json(response).await;
        assert_eq!(json["moderationScore"], 50);
        assert_eq!(json["flagged"], true);
        assert_eq!(json["isApproved"], false);
        assert_eq!(json["title"]["moderationScore"], 0);
        assert_eq!(json["prohibitedTerms"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_check_empty_body_is_clean() {
        let response = handle_check_text(test_support::state(), &Bytes::from("{}"));
        let json = test_support::body_json(response).await;
        assert_eq!(json["isApproved"], true);
        assert_eq!(json["moderationScore"], 0);
    }

    #[tokio::test]
    async fn test_check_invalid_json() {
        let response = handle_check_text(test_support::state(), &Bytes::from("nope"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
