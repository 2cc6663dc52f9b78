//! Wiremock integration tests for the job mutation client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gts_core::{CalendarRefresh, CsrfTokenProvider, Toasts};
use gts_domain::GtsError;
use gts_infra::{HttpClient, JobMutationsClient, JobPayload};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestToasts {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl Toasts for TestToasts {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

struct FixedCsrf;

impl CsrfTokenProvider for FixedCsrf {
    fn token(&self) -> Option<String> {
        Some("tok-123".to_string())
    }
}

#[derive(Default)]
struct CountingRefresh {
    count: AtomicUsize,
}

impl CalendarRefresh for CountingRefresh {
    fn refresh_calendar(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    client: JobMutationsClient,
    toasts: Arc<TestToasts>,
    refresh: Arc<CountingRefresh>,
}

fn harness(server: &MockServer) -> Harness {
    let toasts = Arc::new(TestToasts::default());
    let refresh = Arc::new(CountingRefresh::default());
    let jobs_url = Url::parse(&format!("{}/jobs/", server.uri())).unwrap();
    let client = JobMutationsClient::new(
        HttpClient::new().unwrap(),
        jobs_url,
        Arc::new(FixedCsrf),
        toasts.clone(),
        refresh.clone(),
    );
    Harness { client, toasts, refresh }
}

#[tokio::test]
async fn create_carries_csrf_and_triggers_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/"))
        .and(header("X-CSRFToken", "tok-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "success", "id": "job-77"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let payload = JobPayload { title: "Flatbed delivery".into(), ..Default::default() };
    h.client.save_job(&payload).await.unwrap();

    assert_eq!(*h.toasts.successes.lock().unwrap(), vec!["Job saved".to_string()]);
    assert!(h.toasts.errors.lock().unwrap().is_empty());
    assert_eq!(h.refresh.count.load(Ordering::SeqCst), 1, "mutation must invalidate the cache");
}

#[tokio::test]
async fn update_posts_to_the_job_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let payload = JobPayload {
        id: Some("7".into()),
        title: "Flatbed delivery (moved)".into(),
        ..Default::default()
    };
    h.client.save_job(&payload).await.unwrap();
}

#[tokio::test]
async fn delete_surfaces_the_server_message_on_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/jobs/9/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": "error",
            "error": "Job already completed"
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h.client.delete_job("9").await.unwrap_err();

    assert_eq!(err, GtsError::Network("Job already completed".into()));
    assert_eq!(*h.toasts.errors.lock().unwrap(), vec!["Job already completed".to_string()]);
    assert_eq!(h.refresh.count.load(Ordering::SeqCst), 0, "failed mutations must not refresh");
}

#[tokio::test]
async fn rejection_without_a_message_falls_back_to_the_generic_toast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/3/status/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h.client.set_job_status("3", "completed").await.unwrap_err();

    assert!(matches!(err, GtsError::Network(_)));
    assert_eq!(
        *h.toasts.errors.lock().unwrap(),
        vec![gts_domain::constants::GENERIC_MUTATION_ERROR.to_string()]
    );
}
