//! Gateway adapter tests

use super::test_source;
use chapter_sieve::config::ChapterListing;
use chapter_sieve::FetchError;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_page_reads_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .and(query_param("q", "One Piece"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"id": "one_piece", "title": "One Piece"},
                {"id": "one_piece_party", "title": "One Piece Party"},
                {"title": "Missing id"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let entities = source.search_page("One Piece", 2, 50).await.unwrap();

    let ids: Vec<&str> = entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["one_piece", "one_piece_party"]);
    assert_eq!(entities[0].title, "One Piece");
}

#[tokio::test]
async fn test_fetch_chapters_reads_bare_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangalek/manga/4521/chapters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": 903, "title": "Episode 3 - The Return"},
            {"_id": 902, "title": "Bonus", "number": 2},
            {"_id": 901, "title": "Prologue"}
        ])))
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangalek", ChapterListing::Json);
    let chapters = source.fetch_chapters("4521").await.unwrap();

    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters[0].id, "903");
    assert_eq!(chapters[0].resolved_number(), Some(3.0));
    assert_eq!(chapters[1].resolved_number(), Some(2.0));
    assert_eq!(chapters[2].resolved_number(), None);
}

#[tokio::test]
async fn test_fetch_chapters_encodes_entity_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/api/v1/sources/mangahere/manga/solo%20leveling%2Fraw/chapters",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "c1", "title": "Chapter 1"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let chapters = source.fetch_chapters("solo leveling/raw").await.unwrap();
    assert_eq!(chapters.len(), 1);
}

#[tokio::test]
async fn test_fetch_chapters_from_html_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangalek/manga/berserk/chapters"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<ul>
                <li class="wp-manga-chapter"><a href="/berserk/2/">Chapter 2</a></li>
                <li class="wp-manga-chapter"><a href="/berserk/1/">Chapter 1</a></li>
            </ul>"#,
        ))
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangalek", ChapterListing::Html);
    let chapters = source.fetch_chapters("berserk").await.unwrap();

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[1].id, "/berserk/1/");
    assert_eq!(chapters[1].resolved_number(), Some(1.0));
}

#[tokio::test]
async fn test_status_errors_keep_their_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/manga/gone/chapters"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let err = source.fetch_chapters("gone").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let err = source.search_page("x", 1, 10).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_unsuccessful_envelope_yields_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources/mangahere/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "upstream unavailable"
        })))
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    assert!(source.search_page("x", 1, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_sources() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": ["mangahere", {"id": "mangalek", "name": "MangaLek"}]
        })))
        .mount(&mock_server)
        .await;

    let source = test_source(&mock_server.uri(), "mangahere", ChapterListing::Json);
    let ids = source.list_sources().await.unwrap();
    assert_eq!(ids, vec!["mangahere".to_string(), "mangalek".to_string()]);
}
