use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use slm_core::{
    license::LicenseClient,
    triggers::{Trigger, UpgradeNotice},
};
use slm_models::{license::LicenseRecord, response::ServerResponse};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<LicenseClient>,
    pub triggers: UnboundedSender<Trigger>,
}

#[derive(Debug, Deserialize)]
pub struct ActivateArguments {
    pub license_key: String,
}

#[derive(Serialize)]
struct LicenseStatus {
    #[serde(flatten)]
    record: LicenseRecord,
    version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/license", get(license_status))
        .route("/license/activate", post(activate))
        .route("/license/deactivate", post(deactivate))
        .route("/license/check", get(check))
        .route("/license/version", post(update_version))
        .route(
            "/hooks/upgrader-process-complete",
            post(upgrader_process_complete),
        )
        .route("/hooks/plugin-activated", post(plugin_activated))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn license_status(State(state): State<AppState>) -> Response {
    match state.client.record().await {
        Ok(record) => Json(LicenseStatus {
            record,
            version: state.client.settings().version.clone(),
        })
        .into_response(),
        Err(err) => {
            tracing::error!(err = ?err, "failed to read the license record");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

#[tracing::instrument(skip_all)]
async fn activate(
    State(state): State<AppState>,
    Json(args): Json<ActivateArguments>,
) -> Json<ServerResponse> {
    let installation = state.client.settings().installation();
    Json(
        state
            .client
            .activate(args.license_key.trim(), &installation)
            .await,
    )
}

#[tracing::instrument(skip_all)]
async fn deactivate(State(state): State<AppState>) -> Json<ServerResponse> {
    Json(state.client.deactivate().await)
}

async fn check(State(state): State<AppState>) -> Json<ServerResponse> {
    Json(state.client.check_status().await)
}

async fn update_version(State(state): State<AppState>) -> Json<serde_json::Value> {
    let reported = state.client.update_version().await;
    Json(json!({ "reported": reported }))
}

async fn upgrader_process_complete(
    State(state): State<AppState>,
    Json(notice): Json<UpgradeNotice>,
) -> StatusCode {
    enqueue(&state, Trigger::UpgradeCompleted(notice))
}

async fn plugin_activated(State(state): State<AppState>) -> StatusCode {
    enqueue(&state, Trigger::PluginActivated)
}

fn enqueue(state: &AppState, trigger: Trigger) -> StatusCode {
    if state.triggers.send(trigger).is_ok() {
        StatusCode::ACCEPTED
    } else {
        tracing::error!("the trigger loop has stopped");
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use slm_client::{Error, Response as HttpResponse, Transport};
    use slm_core::{scheduler::TaskScheduler, settings::ClientSettings};
    use slm_database::MemoryStore;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tower::ServiceExt;

    /// Accepts every request.
    #[derive(Default)]
    struct AlwaysSuccess {
        requests: AtomicUsize,
    }

    #[async_trait]
    impl Transport for AlwaysSuccess {
        async fn get(&self, _url: &str, _timeout: Duration) -> Result<HttpResponse, Error> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse::new(StatusCode::OK, r#"{"result":"success"}"#))
        }

        async fn post(
            &self,
            _url: &str,
            _form: Vec<u8>,
            _timeout: Duration,
        ) -> Result<HttpResponse, Error> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse::new(StatusCode::OK, r#"{"result":"success"}"#))
        }
    }

    fn app() -> (Router, Arc<AlwaysSuccess>, UnboundedReceiver<Trigger>) {
        let settings = ClientSettings {
            server_url: "https://slm.example.org/".into(),
            secret_key: "s3cret".into(),
            registered_domain: "example.com".into(),
            item_reference: "plugin-a".into(),
            version: "1.2.3".into(),
            plugin_basename: "plugin-a/plugin-a.php".into(),
            option_prefix: "test_plugin".into(),
        };
        let transport = Arc::new(AlwaysSuccess::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let client = LicenseClient::new(
            settings,
            transport.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(TaskScheduler::new(tx.clone())),
        );
        let router = router(AppState {
            client: Arc::new(client),
            triggers: tx,
        });
        (router, transport, rx)
    }

    async fn call(router: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn check_without_license() {
        let (router, transport, _rx) = app();

        let (status, body) = call(&router, "GET", "/license/check", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            json!({"result": "error", "message": "No license key found"})
        );
        assert_eq!(transport.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn activate_then_deactivate() {
        let (router, _transport, _rx) = app();

        let (status, body) = call(
            &router,
            "POST",
            "/license/activate",
            r#"{"license_key":"  KEY-1 "}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"result":"success"}"#);

        let (_, body) = call(&router, "GET", "/license", "").await;
        let status = serde_json::from_str::<serde_json::Value>(&body).unwrap();
        assert_eq!(status["license_key"], json!("KEY-1"));
        assert_eq!(status["is_active"], json!(true));
        assert_eq!(status["version"], json!("1.2.3"));

        let (_, body) = call(&router, "POST", "/license/version", "").await;
        assert_eq!(body, r#"{"reported":true}"#);

        let (_, body) = call(&router, "POST", "/license/deactivate", "").await;
        assert_eq!(body, r#"{"result":"success"}"#);

        let (_, body) = call(&router, "GET", "/license", "").await;
        let status = serde_json::from_str::<serde_json::Value>(&body).unwrap();
        assert_eq!(status["license_key"], json!(null));
        assert_eq!(status["is_active"], json!(false));
    }

    #[tokio::test]
    async fn blank_key_is_not_activated() {
        let (router, transport, _rx) = app();

        let (status, body) = call(
            &router,
            "POST",
            "/license/activate",
            r#"{"license_key":"   "}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            json!({"result": "error", "message": "License key is empty"})
        );
        assert_eq!(transport.requests.load(Ordering::SeqCst), 0);

        let (_, body) = call(&router, "GET", "/license", "").await;
        let status = serde_json::from_str::<serde_json::Value>(&body).unwrap();
        assert_eq!(status["is_active"], json!(false));
    }

    #[tokio::test]
    async fn hooks_are_queued() {
        let (router, _transport, mut rx) = app();

        let (status, _) = call(
            &router,
            "POST",
            "/hooks/upgrader-process-complete",
            r#"{"action":"update","type":"plugin","plugins":["plugin-a/plugin-a.php"]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let (status, _) = call(&router, "POST", "/hooks/plugin-activated", "").await;
        assert_eq!(status, StatusCode::ACCEPTED);

        assert_eq!(
            rx.recv().await,
            Some(Trigger::UpgradeCompleted(UpgradeNotice {
                action: "update".into(),
                kind: "plugin".into(),
                plugins: vec!["plugin-a/plugin-a.php".into()],
            }))
        );
        assert_eq!(rx.recv().await, Some(Trigger::PluginActivated));
    }
}
