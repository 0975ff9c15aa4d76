pub mod health;
pub mod workflow;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/process-resume", post(workflow::handle_process_resume))
        .route("/api/v1/results/:id", get(workflow::handle_get_result))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{Config, PipelineSettings};
    use crate::db::{DisabledStore, NewWorkflowResult, ResultStore};
    use crate::pipeline::orchestrator::{FinalRecord, Orchestrator};
    use crate::pipeline::schema::validate_as;
    use crate::pipeline::sections::SectionHeaders;
    use crate::testing::{
        cover_letter_json, job_analysis_json, tailored_resume_json, MemoryStore,
        ScriptedGenerator, JOB_DESCRIPTION,
    };

    const BOUNDARY: &str = "careercraft-test-boundary";

    fn app(store: Arc<dyn ResultStore>) -> Router {
        let config = Config {
            database_url: None,
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            pipeline_timeout: Duration::from_secs(300),
            stream_heartbeat: Duration::from_secs(15),
            min_job_description_chars: 50,
            max_upload_bytes: 1024 * 1024,
            section_headers: SectionHeaders::default(),
        };
        let orchestrator = Orchestrator::new(
            Arc::new(ScriptedGenerator::new()),
            PipelineSettings::default(),
        );
        build_router(AppState {
            config,
            orchestrator,
            store,
        })
    }

    fn multipart_body(filename: &str, file: &[u8], job_description: Option<&str>) -> Body {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume_file\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n");
        if let Some(jd) = job_description {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"job_description\"\r\n\r\n{jd}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn upload(body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/process-resume")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_persistence_backend() {
        let response = app(Arc::new(DisabledStore)).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["persistence"], "disabled");
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected_before_streaming() {
        let response = app(Arc::new(DisabledStore))
            .oneshot(upload(multipart_body(
                "resume.docx",
                b"PK",
                Some(JOB_DESCRIPTION),
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Only PDF files are supported");
    }

    #[tokio::test]
    async fn test_short_job_description_is_rejected() {
        let response = app(Arc::new(DisabledStore))
            .oneshot(upload(multipart_body(
                "resume.pdf",
                b"%PDF-1.4",
                Some("Too short"),
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(
            body["error"]["message"],
            "Job description too short (minimum 50 characters)"
        );
    }

    #[tokio::test]
    async fn test_missing_job_description_field_is_rejected() {
        let response = app(Arc::new(DisabledStore))
            .oneshot(upload(multipart_body("resume.pdf", b"%PDF-1.4", None)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_result_lookup_without_persistence_is_unavailable() {
        let uri = format!("/api/v1/results/{}", uuid::Uuid::new_v4());
        let response = app(Arc::new(DisabledStore)).oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_result_is_not_found() {
        let uri = format!("/api/v1/results/{}", uuid::Uuid::new_v4());
        let response = app(Arc::new(MemoryStore::default()))
            .oneshot(get_request(&uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_saved_result_is_returned() {
        let store = Arc::new(MemoryStore::default());
        let record = FinalRecord {
            job_analysis: validate_as(&job_analysis_json()).unwrap(),
            tailored_resume: validate_as(&tailored_resume_json()).unwrap(),
            cover_letter: validate_as(&cover_letter_json()).unwrap(),
        };
        let id = store
            .save(&NewWorkflowResult {
                job_description: JOB_DESCRIPTION,
                resume_filename: Some("resume.pdf"),
                record: &record,
                processing_time_seconds: 12.5,
            })
            .await
            .unwrap();

        let response = app(store)
            .oneshot(get_request(&format!("/api/v1/results/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["resume_filename"], "resume.pdf");
        assert_eq!(body["job_analysis"]["role_title"], "Data Engineer");
    }
}
