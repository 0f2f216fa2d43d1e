use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::core::config::FirebaseConfig;
use crate::core::error::{AppError, Result};
use crate::features::reports::clients::firestore_value::{
    new_report_fields, resolve_fields, CommitRequest, DocumentMask, FieldTransform,
    ListDocumentsResponse, Precondition, Write, WriteDocument, FIELD_CREATED_AT,
    FIELD_RESOLVED_AT, FIELD_STATUS,
};
use crate::features::reports::models::{NewReport, Report, ReportId, ReportPatch};
use crate::features::reports::store::ReportStore;
use crate::features::session::FirebaseAuthClient;
use crate::shared::constants::FIRESTORE_PAGE_SIZE;
use crate::shared::subscription::Subscription;

/// Report store backed by the Firestore REST API.
///
/// Writes go through `documents:commit` so timestamps can be server-assigned.
/// The REST surface has no listen stream, so subscriptions re-list the
/// collection on an interval and push a snapshot whenever it changed.
#[derive(Clone)]
pub struct FirestoreClient {
    config: FirebaseConfig,
    auth: Arc<FirebaseAuthClient>,
    http_client: reqwest::Client,
}

impl FirestoreClient {
    pub fn new(config: FirebaseConfig, auth: Arc<FirebaseAuthClient>) -> Self {
        Self {
            config,
            auth,
            http_client: reqwest::Client::new(),
        }
    }

    fn database_path(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.config.project_id
        )
    }

    fn documents_url(&self) -> String {
        format!("{}/v1/{}", self.config.firestore_base_url, self.database_path())
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.database_path(), collection, id)
    }

    /// Commit a single write atomically
    async fn commit(&self, write: Write) -> Result<()> {
        let token = self.auth.id_token().await?;
        let url = format!("{}:commit", self.documents_url());

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&CommitRequest {
                writes: vec![write],
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach Firestore: {}", e);
                AppError::ExternalServiceError(format!("Failed to commit write: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(())
    }

    /// List the whole collection, following page tokens. Documents that do
    /// not decode as reports are skipped.
    async fn list(&self, collection: &str) -> Result<Vec<Report>> {
        let token = self.auth.id_token().await?;
        let url = format!("{}/{}", self.documents_url(), collection);

        let mut reports = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .query(&[("pageSize", FIRESTORE_PAGE_SIZE.to_string())]);
            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let response = request.send().await.map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to list documents: {}", e))
            })?;

            if !response.status().is_success() {
                return Err(Self::error_from_response(response).await);
            }

            let page = response.json::<ListDocumentsResponse>().await.map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to parse document list: {}", e))
            })?;

            for document in &page.documents {
                match document.to_report() {
                    Ok(report) => reports.push(report),
                    Err(e) => tracing::warn!("Skipping malformed report document: {}", e),
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(reports)
    }

    /// Poll the collection until the subscriber goes away
    async fn poll(self, collection: String, sender: UnboundedSender<Vec<Report>>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<Vec<Report>> = None;

        tracing::debug!("Watching collection '{}'", collection);

        loop {
            interval.tick().await;
            if sender.is_closed() {
                break;
            }

            match self.list(&collection).await {
                Ok(reports) => {
                    if last.as_ref() == Some(&reports) {
                        continue;
                    }
                    if sender.send(reports.clone()).is_err() {
                        break;
                    }
                    last = Some(reports);
                }
                Err(e) => tracing::warn!("Failed to poll collection '{}': {}", collection, e),
            }
        }

        tracing::debug!("Stopped watching collection '{}'", collection);
    }

    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        tracing::error!("Firestore API error: HTTP {} - {}", status, body);

        match status.as_u16() {
            401 | 403 => AppError::Auth(format!("Firestore rejected credentials: HTTP {}", status)),
            404 => AppError::NotFound("Document not found".to_string()),
            _ => AppError::ExternalServiceError(format!("Firestore API error: HTTP {}", status)),
        }
    }
}

#[async_trait]
impl ReportStore for FirestoreClient {
    async fn create(&self, collection: &str, report: NewReport) -> Result<ReportId> {
        let id = Uuid::new_v4().simple().to_string();

        self.commit(Write {
            update: WriteDocument {
                name: self.document_name(collection, &id),
                fields: new_report_fields(&report),
            },
            update_mask: None,
            update_transforms: vec![FieldTransform::server_time(FIELD_CREATED_AT)],
            current_document: Precondition { exists: false },
        })
        .await?;

        tracing::info!("Created report {} in '{}'", id, collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: ReportPatch) -> Result<()> {
        let write = match patch {
            ReportPatch::Resolve => Write {
                update: WriteDocument {
                    name: self.document_name(collection, id),
                    fields: resolve_fields(),
                },
                update_mask: Some(DocumentMask {
                    field_paths: vec![FIELD_STATUS.to_string()],
                }),
                update_transforms: vec![FieldTransform::server_time(FIELD_RESOLVED_AT)],
                current_document: Precondition { exists: true },
            },
        };

        self.commit(write).await?;

        tracing::info!("Updated report {} in '{}' ({:?})", id, collection, patch);
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> Subscription<Vec<Report>> {
        let (sender, subscription) = Subscription::channel();
        let poller = tokio::spawn(self.clone().poll(collection.to_string(), sender));
        subscription.with_producer(poller.abort_handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::ReportStatus;
    use crate::features::session::IdentityProvider;
    use crate::shared::test_helpers::{spawn_stub_server, test_firebase_config};
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const DOCUMENTS: &str = "/v1/projects/civic-eye/databases/(default)/documents";

    #[derive(Clone, Default)]
    struct StubState {
        documents: Arc<Mutex<Vec<Value>>>,
        commits: Arc<Mutex<Vec<Value>>>,
        reject_commits: bool,
    }

    fn stored(id: &str, status: &str, created_at: &str) -> Value {
        json!({
            "name": format!("projects/civic-eye/databases/(default)/documents/reports/{}", id),
            "fields": {
                "description": { "stringValue": format!("report {}", id) },
                "location": { "stringValue": "Main St" },
                "category": { "stringValue": "Infrastructure" },
                "status": { "stringValue": status },
                "createdAt": { "timestampValue": created_at }
            }
        })
    }

    async fn list_documents(
        State(state): State<StubState>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let documents = state.documents.lock().unwrap().clone();
        // Serve one document per page to exercise page tokens
        let index: usize = params
            .get("pageToken")
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let page: Vec<Value> = documents.get(index).cloned().into_iter().collect();
        let next = if index + 1 < documents.len() {
            json!((index + 1).to_string())
        } else {
            Value::Null
        };
        Json(json!({ "documents": page, "nextPageToken": next }))
    }

    async fn commit(
        State(state): State<StubState>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if state.reject_commits {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": { "code": 404, "status": "NOT_FOUND" } })),
            );
        }
        state.commits.lock().unwrap().push(body);
        (StatusCode::OK, Json(json!({ "commitTime": "2024-05-01T08:00:00Z" })))
    }

    async fn signed_in_client(state: StubState) -> FirestoreClient {
        let router = Router::new()
            .route(
                "/identitytoolkit.googleapis.com/v1/accounts:signUp",
                post(|| async {
                    Json(json!({
                        "idToken": "token",
                        "refreshToken": "refresh",
                        "expiresIn": "3600",
                        "localId": "anon"
                    }))
                }),
            )
            .route(&format!("{}/reports", DOCUMENTS), get(list_documents))
            .route(&format!("{}:commit", DOCUMENTS), post(commit))
            .with_state(state);
        let base_url = spawn_stub_server(router).await;

        let mut config = test_firebase_config(&base_url);
        config.poll_interval = Duration::from_millis(20);
        let auth = Arc::new(FirebaseAuthClient::new(config.clone()));
        auth.sign_in_anonymously().await.unwrap();

        FirestoreClient::new(config, auth)
    }

    #[tokio::test]
    async fn test_create_commits_pending_with_server_timestamp() {
        let state = StubState::default();
        let client = signed_in_client(state.clone()).await;

        let report = NewReport::pending(
            "Pothole on Main St".to_string(),
            "Main St & 5th".to_string(),
            "Infrastructure".to_string(),
        );
        let id = client.create("reports", report).await.unwrap();

        let commits = state.commits.lock().unwrap();
        let write = &commits[0]["writes"][0];
        assert!(write["update"]["name"].as_str().unwrap().ends_with(&format!("/reports/{}", id)));
        assert_eq!(write["update"]["fields"]["status"]["stringValue"], "Pending");
        assert_eq!(write["updateTransforms"][0]["fieldPath"], "createdAt");
        assert_eq!(write["updateTransforms"][0]["setToServerValue"], "REQUEST_TIME");
        assert_eq!(write["currentDocument"]["exists"], false);
    }

    #[tokio::test]
    async fn test_resolve_masks_status_and_requires_existing() {
        let state = StubState::default();
        let client = signed_in_client(state.clone()).await;

        client
            .update("reports", "abc123", ReportPatch::Resolve)
            .await
            .unwrap();

        let commits = state.commits.lock().unwrap();
        let write = &commits[0]["writes"][0];
        assert!(write["update"]["name"].as_str().unwrap().ends_with("/reports/abc123"));
        assert_eq!(write["update"]["fields"]["status"]["stringValue"], "Resolved");
        assert_eq!(write["updateMask"]["fieldPaths"], json!(["status"]));
        assert_eq!(write["updateTransforms"][0]["fieldPath"], "resolvedAt");
        assert_eq!(write["currentDocument"]["exists"], true);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let state = StubState {
            reject_commits: true,
            ..StubState::default()
        };
        let client = signed_in_client(state).await;

        let result = client.update("reports", "gone", ReportPatch::Resolve).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_follows_pages_and_skips_malformed() {
        let state = StubState::default();
        {
            let mut documents = state.documents.lock().unwrap();
            documents.push(stored("a", "Pending", "2024-05-01T08:00:00Z"));
            documents.push(json!({
                "name": "projects/civic-eye/databases/(default)/documents/reports/bad",
                "fields": {}
            }));
            documents.push(stored("b", "Resolved", "2024-05-02T08:00:00Z"));
        }
        let client = signed_in_client(state).await;

        let reports = client.list("reports").await.unwrap();

        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(reports[1].status, ReportStatus::Resolved);
    }

    #[tokio::test]
    async fn test_subscription_pushes_initial_and_changed_snapshots() {
        let state = StubState::default();
        state
            .documents
            .lock()
            .unwrap()
            .push(stored("a", "Pending", "2024-05-01T08:00:00Z"));
        let client = signed_in_client(state.clone()).await;

        let mut subscription = client.subscribe("reports");

        let first = tokio::time::timeout(Duration::from_secs(2), subscription.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.len(), 1);

        state.documents.lock().unwrap()[0] = stored("a", "Resolved", "2024-05-01T08:00:00Z");

        let second = tokio::time::timeout(Duration::from_secs(2), subscription.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second[0].status, ReportStatus::Resolved);
    }
}
