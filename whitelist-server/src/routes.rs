//! HTTP route handlers for the whitelist API.

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use whitelist::core::command::{CommandError, RawCommand, WhitelistCommand};
use whitelist::core::types::Disposition;
use whitelist::reply::Acknowledgment;

use crate::state::{AppState, RefreshedLocations};

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/commands/whitelist", post(whitelist_command))
        .route("/locations", get(get_locations))
        .route("/suggestions", get(get_suggestions))
}

async fn health() -> &'static str {
    "ok"
}

/// POST /api/commands/whitelist - run one add/remove and reply with an
/// acknowledgment.
///
/// Unreadable bodies and invalid commands get 422; every other outcome
/// (including backend errors) is 200 with the disposition in the body.
async fn whitelist_command(
    State(state): State<AppState>,
    body: Result<Json<RawCommand>, JsonRejection>,
) -> (StatusCode, Json<Acknowledgment>) {
    let raw = match body {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            info!(error = %rejection, "unreadable whitelist command");
            let err = CommandError::Malformed(rejection.body_text());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(Acknowledgment::invalid(&err)),
            );
        }
    };
    let command = match WhitelistCommand::parse(&raw) {
        Ok(command) => command,
        Err(err) => {
            info!(error = %err, "rejected whitelist command");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(Acknowledgment::invalid(&err)),
            );
        }
    };
    let known = state.locations.load().snapshot.len();
    if let Err(err) = command.require_scoped_if_ambiguous(known) {
        info!(error = %err, known, "unscoped command with multiple whitelists");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(Acknowledgment::invalid(&err)),
        );
    }

    let service = state.service.clone();
    let worker_command = command.clone();
    let disposition = match tokio::task::spawn_blocking(move || service.execute(&worker_command))
        .await
    {
        Ok(disposition) => disposition,
        Err(err) => {
            warn!(error = %err, "whitelist worker did not complete");
            Disposition::Error("internal error while updating the whitelist".to_string())
        }
    };
    (
        StatusCode::OK,
        Json(Acknowledgment::for_outcome(&command, disposition)),
    )
}

/// GET /api/locations - current location snapshot.
async fn get_locations(State(state): State<AppState>) -> Json<RefreshedLocations> {
    Json(state.locations.load().as_ref().clone())
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SuggestionField {
    Folder,
    File,
}

#[derive(Debug, Deserialize)]
struct SuggestionQuery {
    field: SuggestionField,
    /// Narrows file suggestions to one folder.
    folder: Option<String>,
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    choices: Vec<String>,
}

/// GET /api/suggestions - autocomplete choices from the snapshot.
async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionQuery>,
) -> Json<SuggestionsResponse> {
    let current = state.locations.load();
    let choices = match params.field {
        SuggestionField::Folder => current.snapshot.folder_suggestions(&params.query),
        SuggestionField::File => current
            .snapshot
            .file_suggestions(params.folder.as_deref(), &params.query),
    };
    Json(SuggestionsResponse { choices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::Utc;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use whitelist::core::command::{Location, Target};
    use whitelist::core::document::Whitelist;
    use whitelist::core::locations::LocationSnapshot;
    use whitelist::io::backend::Backend;
    use whitelist::io::error::StoreError;
    use whitelist::service::WhitelistService;
    use whitelist::test_support::MemoryBackend;

    fn app_with(backend: MemoryBackend) -> (Router, AppState) {
        let boxed: Box<dyn Backend> = Box::new(backend);
        let state = AppState::new(WhitelistService::new(boxed));
        let router = Router::new()
            .nest("/api", api_router())
            .with_state(state.clone());
        (router, state)
    }

    fn locations(pairs: &[(&str, &str)]) -> LocationSnapshot {
        LocationSnapshot::new(
            pairs
                .iter()
                .map(|(folder, file)| Location::new(*folder, *file).expect("loc")),
        )
    }

    async fn post_command(router: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::post("/api/commands/whitelist")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        send(router, request).await
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).expect("request");
        send(router, request).await
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (router, _) = app_with(MemoryBackend::default());
        let response = router
            .oneshot(Request::get("/api/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn add_returns_success_acknowledgment() {
        let (router, state) = app_with(MemoryBackend::default());

        let (status, body) =
            post_command(router, json!({"action": "add", "eos_id": "P1"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disposition"], "added");
        assert_eq!(body["success"], true);
        assert_eq!(body["color"], 0x57_F2_87);
        assert_eq!(body["message"], "Added `P1` to the default whitelist.");
        let stored = state.service.read(&Target::Default).expect("read");
        assert_eq!(stored.exclusive_join, vec!["P1"]);
    }

    #[tokio::test]
    async fn action_defaults_to_add() {
        let (router, _) = app_with(MemoryBackend::default());
        let (status, body) = post_command(router, json!({"eos_id": "P1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disposition"], "added");
    }

    #[tokio::test]
    async fn duplicate_add_is_a_rejection_not_an_error_status() {
        let backend = MemoryBackend::with_document(
            Target::Default,
            Whitelist {
                exclusive_join: vec!["P1".to_string()],
            },
        );
        let (router, _) = app_with(backend);

        let (status, body) = post_command(router, json!({"eos_id": "P1"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disposition"], "already_present");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn backend_failure_is_reported_in_body() {
        let backend = MemoryBackend::default();
        backend.fail_fetch(|| StoreError::Transport("connection reset".to_string()));
        let (router, _) = app_with(backend);

        let (status, body) = post_command(router, json!({"eos_id": "P1"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disposition"], "error");
        assert!(
            body["detail"]
                .as_str()
                .expect("detail")
                .contains("connection reset")
        );
    }

    #[tokio::test]
    async fn invalid_command_is_unprocessable() {
        let (router, _) = app_with(MemoryBackend::default());

        let (status, body) = post_command(
            router,
            json!({"action": "ban", "eos_id": "P1"}),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["disposition"], "error");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unreadable_body_still_gets_an_acknowledgment() {
        let (router, _) = app_with(MemoryBackend::default());
        let request = Request::post("/api/commands/whitelist")
            .header("content-type", "application/json")
            .body(Body::from("{\"eos_id\": "))
            .expect("request");

        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["disposition"], "error");
        assert_eq!(body["success"], false);
        assert!(
            body["message"]
                .as_str()
                .expect("message")
                .starts_with("Invalid command: malformed command:")
        );

        let (status, body) = post_command(router, json!({"eos_id": 42})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["disposition"], "error");
    }

    #[tokio::test]
    async fn unscoped_command_rejected_when_locations_are_ambiguous() {
        let (router, state) = app_with(MemoryBackend::default());
        state.locations.replace(
            locations(&[("eu", "main.json"), ("us", "main.json")]),
            Utc::now(),
        );

        let (status, body) = post_command(router.clone(), json!({"eos_id": "P1"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["message"],
            "Invalid command: folder and file are required when multiple whitelists exist"
        );

        let (status, body) = post_command(
            router,
            json!({"eos_id": "P1", "folder": "eu", "file": "main.json"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Added `P1` to the eu/main.json whitelist.");
    }

    #[tokio::test]
    async fn locations_endpoint_reports_snapshot() {
        let (router, state) = app_with(MemoryBackend::default());

        let (_, body) = get_json(router.clone(), "/api/locations").await;
        assert_eq!(body["locations"], json!([]));
        assert_eq!(body["refreshed_at"], Value::Null);

        state
            .locations
            .replace(locations(&[("eu", "main.json")]), Utc::now());
        let (status, body) = get_json(router, "/api/locations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["locations"],
            json!([{"folder": "eu", "file": "main.json"}])
        );
        assert!(body["refreshed_at"].is_string());
    }

    #[tokio::test]
    async fn suggestions_filter_by_prefix() {
        let (router, state) = app_with(MemoryBackend::default());
        state.locations.replace(
            locations(&[
                ("eu", "main.json"),
                ("eu", "event.json"),
                ("us", "main.json"),
            ]),
            Utc::now(),
        );

        let (_, body) = get_json(router.clone(), "/api/suggestions?field=folder&query=E").await;
        assert_eq!(body["choices"], json!(["eu"]));

        let (_, body) = get_json(
            router.clone(),
            "/api/suggestions?field=file&folder=eu&query=m",
        )
        .await;
        assert_eq!(body["choices"], json!(["main.json"]));

        let (_, body) = get_json(router, "/api/suggestions?field=file").await;
        assert_eq!(body["choices"], json!(["event.json", "main.json"]));
    }
}
