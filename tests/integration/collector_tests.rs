//! End-to-end collection and survey tests

use super::{fast_policy, test_source};
use chapter_sieve::collector::{
    collect_all, collect_query, collect_source, survey_catalog, CollectSettings, FailureCategory,
    QueryOutcome, SurveyStatus,
};
use chapter_sieve::config::ChapterListing;
use chapter_sieve::crawler::CrawlOptions;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings() -> CollectSettings {
    CollectSettings {
        entity_delay: Duration::from_millis(1),
        ..CollectSettings::default()
    }
}

async fn mount_search(server: &MockServer, source: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/sources/{}/search", source)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_chapters(
    server: &MockServer,
    source: &str,
    entity: &str,
    status: u16,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/sources/{}/manga/{}/chapters",
            source, entity
        )))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_collect_query_retries_rate_limit() {
    let mock_server = MockServer::start().await;

    // First search is rate limited, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .and(query_param("q", "One Piece"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"id": "one_piece", "title": "One Piece"},
                {"id": "one_piece_film", "title": "One Piece Film"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_chapters(
        &mock_server,
        "mangahere",
        "one_piece",
        200,
        json!([
            {"id": "c3", "title": "Vol.01 Ch.003 - Their Dream"},
            {"id": "c2", "title": "Vol.01 Ch.002 - They Call Him Straw Hat Luffy"},
            {"id": "c1", "title": "Vol.01 Ch.001 - Romance Dawn"},
            {"id": "sp", "title": "Special: Strong World"}
        ]),
    )
    .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let report = collect_query(
        &source,
        "One Piece",
        &settings(),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    match report.outcome {
        QueryOutcome::Collected {
            entity,
            chapter_count,
            samples,
            lookups,
            unresolved,
        } => {
            assert_eq!(entity.id, "one_piece");
            assert_eq!(chapter_count, 4);
            assert_eq!(samples.len(), 3);
            assert!(lookups.iter().all(|l| l.is_found()));
            assert_eq!(lookups[0].chapter_id.as_deref(), Some("c1"));
            assert_eq!(unresolved.len(), 1);
            assert_eq!(unresolved[0].id, "sp");
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_collect_query_does_not_retry_not_found() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "mangahere",
        json!([{"id": "missing", "title": "Missing"}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/manga/missing/chapters"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let report = collect_query(
        &source,
        "Missing",
        &settings(),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    match report.outcome {
        QueryOutcome::Failed {
            category, attempts, ..
        } => {
            assert_eq!(category, FailureCategory::NotFound);
            assert_eq!(attempts, 1);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_collect_query_exhausts_on_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let report = collect_query(
        &source,
        "Berserk",
        &settings(),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        report.outcome,
        QueryOutcome::Failed {
            category: FailureCategory::ServerError,
            attempts: 3,
            ..
        }
    ));
}

#[tokio::test]
async fn test_collect_query_without_results_or_chapters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .and(query_param("q", "Nothing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .and(query_param("q", "Empty"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "empty", "title": "Empty"}])),
        )
        .mount(&mock_server)
        .await;
    mount_chapters(&mock_server, "mangahere", "empty", 200, json!([])).await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let report = collect_source(
        &source,
        &["Nothing".to_string(), "Empty".to_string()],
        &settings(),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(report.queries.len(), 2);
    assert!(matches!(report.queries[0].outcome, QueryOutcome::NoResults));
    assert!(matches!(
        report.queries[1].outcome,
        QueryOutcome::NoChapters { .. }
    ));
    assert_eq!(report.collected_count(), 0);
}

#[tokio::test]
async fn test_collect_source_when_already_cancelled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let report = collect_source(
        &source,
        &["A".to_string(), "B".to_string()],
        &settings(),
        &fast_policy(),
        &cancel,
    )
    .await;

    assert!(report
        .queries
        .iter()
        .all(|q| matches!(q.outcome, QueryOutcome::Cancelled)));
    assert!(report.was_cancelled());
}

#[tokio::test]
async fn test_collect_all_keeps_source_order() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    mount_search(&first, "mangahere", json!([{"id": "a", "title": "A"}])).await;
    mount_chapters(&first, "mangahere", "a", 200, json!([{"id": "1", "title": "Ch.1"}])).await;
    mount_search(&second, "mangalek", json!({"success": true, "data": []})).await;

    let sources = vec![
        test_source(&first.uri(), "mangahere", ChapterListing::Json),
        test_source(&second.uri(), "mangalek", ChapterListing::Json),
    ];
    let report = collect_all(
        sources,
        vec!["A".to_string()],
        settings(),
        fast_policy(),
        CancellationToken::new(),
    )
    .await;

    let order: Vec<&str> = report.sources.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(order, vec!["mangahere", "mangalek"]);
    assert_eq!(report.total_queries(), 2);
    assert_eq!(report.total_collected(), 1);
}

fn survey_options(target_count: usize, page_size: usize) -> CrawlOptions {
    CrawlOptions {
        target_count,
        page_size,
        pacing_delay: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn test_survey_categorizes_entities() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangalek/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "solo", "title": "Solo Leveling"},
            {"_id": "empty", "title": "Empty Work"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangalek/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "gone", "title": "Gone Work"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_chapters(
        &mock_server,
        "mangalek",
        "solo",
        200,
        json!([{"_id": "2", "title": "2"}, {"_id": "1", "title": "1"}]),
    )
    .await;
    mount_chapters(&mock_server, "mangalek", "empty", 200, json!([])).await;
    mount_chapters(&mock_server, "mangalek", "gone", 404, json!({})).await;

    let source = test_source(&mock_server.uri(), "mangalek", ChapterListing::Json);
    let report = survey_catalog(
        &source,
        &survey_options(100, 2),
        &settings(),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    assert!(report.reached_end);
    assert!(report.crawl_failure.is_none());
    assert_eq!(report.total(), 3);
    assert_eq!(
        report.entries[0].status,
        SurveyStatus::Success { chapter_count: 2 }
    );
    assert_eq!(
        report.entries[1].category(),
        Some(FailureCategory::ZeroChapters)
    );
    assert_eq!(report.entries[2].category(), Some(FailureCategory::NotFound));
    assert_eq!(report.success_count(), 1);
}

#[tokio::test]
async fn test_survey_continues_after_partial_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangalek/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "a", "title": "A"},
            {"_id": "b", "title": "B"}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangalek/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_chapters(
        &mock_server,
        "mangalek",
        "a",
        200,
        json!([{"_id": "1", "title": "Ch.1"}]),
    )
    .await;
    mount_chapters(
        &mock_server,
        "mangalek",
        "b",
        200,
        json!([{"_id": "1", "title": "Ch.1"}]),
    )
    .await;

    let source = test_source(&mock_server.uri(), "mangalek", ChapterListing::Json);
    let report = survey_catalog(
        &source,
        &survey_options(100, 2),
        &settings(),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    assert!(!report.reached_end);
    assert!(!report.cancelled);
    assert!(report.crawl_failure.is_some());
    assert_eq!(report.total(), 2);
    assert_eq!(report.success_count(), 2);
}

#[tokio::test]
async fn test_survey_respects_target_count() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "mangalek",
        json!([
            {"_id": "a", "title": "A"},
            {"_id": "b", "title": "B"},
            {"_id": "c", "title": "C"}
        ]),
    )
    .await;
    mount_chapters(&mock_server, "mangalek", "a", 200, json!([{"_id": "1", "title": "1"}])).await;
    mount_chapters(&mock_server, "mangalek", "b", 200, json!([{"_id": "1", "title": "1"}])).await;

    let source = test_source(&mock_server.uri(), "mangalek", ChapterListing::Json);
    let report = survey_catalog(
        &source,
        &survey_options(2, 3),
        &settings(),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    assert!(!report.reached_end);
    assert_eq!(report.total(), 2);
    assert_eq!(report.success_count(), 2);
}
