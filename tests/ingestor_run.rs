//! End-to-end runs against mocked scraping and PostgREST endpoints.

mod common;

use common::{scrape_body, supabase_config, two_listings, LogCapture, SUPABASE_KEY};
use job_ingestor::{build_store, Extractor, Ingestor, RunOutcome};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn ingestor_for(server: &MockServer) -> Ingestor {
    let config = supabase_config(&server.uri());
    let extractor = Extractor::new(&config).unwrap();
    let store = build_store(&config).await.unwrap();
    Ingestor::new(extractor, store, config.settings.target_url.clone())
}

async fn mount_listings(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body(two_listings())))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_empty_scrape_skips_storage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/scrape"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let logs = LogCapture::default();
    let _guard = logs.install();

    let ingestor = ingestor_for(&server).await;
    assert_eq!(ingestor.run().await, RunOutcome::NoJobs);

    let output = logs.contents();
    assert!(output.contains("Scraping error"), "logs: {output}");
    assert!(output.contains("No jobs found"), "logs: {output}");
}

#[tokio::test]
async fn test_inserts_mapped_rows_in_one_call() {
    let server = MockServer::start().await;
    mount_listings(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .and(header("apikey", SUPABASE_KEY))
        .and(header("authorization", format!("Bearer {}", SUPABASE_KEY).as_str()))
        .and(header("prefer", "return=minimal"))
        .and(body_json(json!([
            {
                "title": "Python Engineer",
                "company_name": "Acme",
                "location": "東京都 港区",
                "salary": "年収 600万円",
                "source_url": "https://jp.indeed.com/viewjob?jk=abc"
            },
            {
                "title": "Data Engineer",
                "company_name": "Globex",
                "location": "",
                "salary": "",
                "source_url": "https://jp.indeed.com/viewjob?jk=def"
            }
        ])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let ingestor = ingestor_for(&server).await;
    assert_eq!(ingestor.run().await, RunOutcome::Inserted(2));
}

#[tokio::test]
async fn test_unique_violation_is_reported_as_duplicate() {
    let server = MockServer::start().await;
    mount_listings(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "details": "Key (source_url)=(https://jp.indeed.com/viewjob?jk=abc) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"jobs_source_url_key\""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let logs = LogCapture::default();
    let _guard = logs.install();

    let ingestor = ingestor_for(&server).await;
    assert_eq!(ingestor.run().await, RunOutcome::Duplicate);

    let output = logs.contents();
    assert!(
        output.contains("Some jobs were already in the database (duplicate entries)"),
        "logs: {output}"
    );
    assert!(!output.contains("Database error"), "logs: {output}");
}

#[tokio::test]
async fn test_other_database_errors_do_not_propagate() {
    let server = MockServer::start().await;
    mount_listings(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "details": "RLS policy blocks insert",
            "hint": "Use the service role key",
            "message": "permission denied for table jobs"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let logs = LogCapture::default();
    let _guard = logs.install();

    let ingestor = ingestor_for(&server).await;
    assert_eq!(ingestor.run().await, RunOutcome::StorageFailed);

    let output = logs.contents();
    assert!(output.contains("Database error"), "logs: {output}");
    assert!(output.contains("permission denied for table jobs"), "logs: {output}");
    assert!(output.contains("42501"), "logs: {output}");
    assert!(output.contains("RLS policy blocks insert"), "logs: {output}");
    assert!(output.contains("Use the service role key"), "logs: {output}");
}

#[tokio::test]
async fn test_non_json_error_body_is_a_storage_failure() {
    let server = MockServer::start().await;
    mount_listings(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let ingestor = ingestor_for(&server).await;
    assert_eq!(ingestor.run().await, RunOutcome::StorageFailed);
}

#[tokio::test]
async fn test_run_for_overrides_target() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/scrape"))
        .and(wiremock::matchers::body_partial_json(json!({
            "url": "https://jp.indeed.com/jobs?q=rust"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let ingestor = ingestor_for(&server).await;
    assert_eq!(
        ingestor.run_for("https://jp.indeed.com/jobs?q=rust").await,
        RunOutcome::NoJobs
    );
}
