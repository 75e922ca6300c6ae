//! HTTP server implementation
//!
//! hyper http1, one task per accepted connection. Request bodies are
//! collected before dispatch so route handlers work on plain bytes.

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::listings::ListingService;
use crate::reports::ReportService;
use crate::routes::{self, error_response, Caller, FullBody, ListingRoute};
use crate::types::Result;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state
pub struct AppState {
    pub listings: ListingService,
    pub reports: ReportService,
    /// Name of the active admin notifier
    pub notifier: &'static str,
    /// Size of the loaded prohibited term list
    pub term_count: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(listings: ListingService, reports: ReportService, notifier: &'static str) -> Self {
        let term_count = listings.scorer().terms().len();
        Self {
            listings,
            reports,
            notifier,
            term_count,
            started_at: Instant::now(),
        }
    }
}

/// Accept connections until the process is stopped
pub async fn run(state: Arc<AppState>, listen: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;

    info!(
        "Listening on {} (store: {}, notifier: {})",
        listen,
        state.listings.store().backend(),
        state.notifier
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<FullBody>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let caller = Caller::from_headers(req.headers());

    debug!("[{}] {} {}", addr, method, path);

    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(resp) => return Ok(resp),
    };

    let mut response = dispatch(state, &method, &path, caller.as_ref(), &body).await;
    response
        .headers_mut()
        .insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));

    info!("[{}] {} {} -> {}", addr, method, path, response.status().as_u16());
    Ok(response)
}

async fn collect_body(req: Request<Incoming>) -> std::result::Result<Bytes, Response<FullBody>> {
    let limited = http_body_util::Limited::new(req.into_body(), MAX_BODY_BYTES);
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(_) => Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large or unreadable",
            Some("INVALID_BODY"),
        )),
    }
}

/// Pick the handler for a method and path
pub async fn dispatch(
    state: Arc<AppState>,
    method: &Method,
    path: &str,
    caller: Option<&Caller>,
    body: &Bytes,
) -> Response<FullBody> {
    match (method, path) {
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => routes::health_check(state),

        (&Method::POST, "/api/moderation/check") => routes::handle_check_text(state, body),

        (&Method::POST, "/api/listings") => {
            routes::handle_create_listing(state, caller, body).await
        }

        (&Method::GET, "/admin/moderation/queue") => {
            routes::handle_moderation_queue(state, caller).await
        }

        (m, p) => match (
            m,
            routes::match_moderation_route(p),
            routes::match_listing_route(p),
        ) {
            (&Method::PUT, Some(id), _) => {
                routes::handle_moderate_listing(state, caller, id, body).await
            }
            (&Method::GET, _, Some(ListingRoute::Listing(id))) => {
                routes::handle_get_listing(state, caller, id).await
            }
            (&Method::PUT, _, Some(ListingRoute::Listing(id))) => {
                routes::handle_update_listing(state, caller, id, body).await
            }
            (&Method::POST, _, Some(ListingRoute::Reports(id))) => {
                routes::handle_submit_report(state, caller, id, body).await
            }
            (_, Some(_), _) | (_, _, Some(_)) => error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
                Some("METHOD_NOT_ALLOWED"),
            ),
            (_, None, None) => routes::not_found_response(p),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{self, admin, body_json, user};

    #[tokio::test]
    async fn test_dispatch_health() {
        let response = dispatch(
            test_support::state(),
            &Method::GET,
            "/healthz",
            None,
            &Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_path() {
        let response = dispatch(
            test_support::state(),
            &Method::GET,
            "/nope",
            None,
            &Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispatch_wrong_method_on_listing() {
        let response = dispatch(
            test_support::state(),
            &Method::DELETE,
            "/api/listings/abc",
            None,
            &Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_dispatch_create_then_report() {
        let state = test_support::state();
        let owner = user("owner");
        let created = dispatch(
            state.clone(),
            &Method::POST,
            "/api/listings",
            Some(&owner),
            &Bytes::from(r#"{"title":"Loft","description":"Bright"}"#),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = body_json(created).await["listing"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let reporter = user("u1");
        let reported = dispatch(
            state,
            &Method::POST,
            &format!("/api/listings/{}/reports", id),
            Some(&reporter),
            &Bytes::from(r#"{"reason":"duplicate listing"}"#),
        )
        .await;
        assert_eq!(reported.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_dispatch_moderation_route() {
        let state = test_support::state();
        let created = dispatch(
            state.clone(),
            &Method::POST,
            "/api/listings",
            Some(&user("owner")),
            &Bytes::from(r#"{"title":"Loft"}"#),
        )
        .await;
        let id = body_json(created).await["listing"]["id"]
            .as_str()
            .unwrap()
            .to_string();
        let path = format!("/admin/listings/{}/moderation", id);

        let moderated = dispatch(
            state.clone(),
            &Method::PUT,
            &path,
            Some(&admin()),
            &Bytes::from(r#"{"status":"rejected"}"#),
        )
        .await;
        assert_eq!(moderated.status(), StatusCode::OK);
        assert_eq!(body_json(moderated).await["moderationStatus"], "rejected");

        let wrong_method = dispatch(state, &Method::GET, &path, Some(&admin()), &Bytes::new()).await;
        assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
