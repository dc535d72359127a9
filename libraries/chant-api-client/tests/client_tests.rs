//! Tests for the catalog client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real API.

use std::time::Duration;

use chant_api_client::{ApiClientError, ApiConfig, CatalogClient, SongInput};
use chant_core::{Locator, Track, TrackId};
use chant_playback::{PlaybackUrlProvider, ProviderError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

fn client_for(server: &MockServer) -> CatalogClient {
    let config = ApiConfig::new(server.uri()).with_retry_base_delay(Duration::from_millis(5));
    CatalogClient::new(config).expect("valid endpoint")
}

fn song_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "song_id": id,
        "title": title,
        "artist": "Monks of Solesmes",
        "album": "Gregorian Chant",
        "s3_uri": format!("s3://chants/{id}.mp3"),
    })
}

fn draft() -> SongInput {
    SongInput::from(&Track::new("ignored", "Kyrie", "Schola", "s3://chants/kyrie.mp3"))
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        let result = CatalogClient::new(ApiConfig::new(""));

        match result.unwrap_err() {
            ApiClientError::InvalidUrl(msg) => assert!(msg.contains("empty")),
            other => panic!("Expected InvalidUrl error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = ApiConfig::new("https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
    }
}

// =============================================================================
// Song Tests
// =============================================================================

mod songs {
    use super::*;

    #[tokio::test]
    async fn test_list_songs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([song_json("1", "Kyrie"), song_json("2", "Gloria")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let songs = client_for(&server).list_songs().await.unwrap();

        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, TrackId::new("1"));
        assert_eq!(songs[0].locator, "s3://chants/1.mp3");
        assert_eq!(songs[1].album.as_deref(), Some("Gregorian Chant"));
    }

    #[tokio::test]
    async fn test_get_song_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs/404"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "Song not found", "code": "404"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_song(&TrackId::new("404"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Song not found (Code: 404)");
    }

    #[tokio::test]
    async fn test_unstructured_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_songs().await.unwrap_err();

        match err {
            ApiClientError::ServerError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("Expected ServerError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_songs().await.unwrap_err();
        assert!(matches!(err, ApiClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_create_song_posts_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/songs"))
            .and(body_json(json!({
                "title": "Kyrie",
                "artist": "Schola",
                "s3_uri": "s3://chants/kyrie.mp3",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(song_json("77", "Kyrie")))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server).create_song(&draft()).await.unwrap();
        assert_eq!(created.id, TrackId::new("77"));
    }

    #[tokio::test]
    async fn test_delete_song() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/songs/5"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .delete_song(&TrackId::new("5"))
            .await
            .unwrap();
    }
}

// =============================================================================
// Update Retry Tests
// =============================================================================

mod update_retry {
    use super::*;

    fn conflict() -> ResponseTemplate {
        ResponseTemplate::new(409)
            .set_body_json(json!({"error": "Song was modified", "code": "409"}))
    }

    #[tokio::test]
    async fn test_retries_conflicts_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/songs/1"))
            .respond_with(conflict())
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/songs/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(song_json("1", "Kyrie")))
            .expect(1)
            .mount(&server)
            .await;

        let updated = client_for(&server)
            .update_song_with_retry(&TrackId::new("1"), &draft(), 3)
            .await
            .unwrap();

        assert_eq!(updated.id, TrackId::new("1"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/songs/1"))
            .respond_with(conflict())
            .expect(3)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .update_song_with_retry(&TrackId::new("1"), &draft(), 3)
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/songs/1"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": "Missing title", "code": "400"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .update_song_with_retry(&TrackId::new("1"), &draft(), 3)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
    }
}

// =============================================================================
// Presigned URL Tests
// =============================================================================

mod presigned {
    use super::*;

    #[tokio::test]
    async fn test_presigned_url_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/presigned-url"))
            .and(body_json(json!({"bucket": "chants", "key": "office/lauds.mp3"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"url": "https://cdn.example.com/signed", "expiresIn": 3600})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let presigned = client_for(&server)
            .presigned_url("chants", "office/lauds.mp3")
            .await
            .unwrap();

        assert_eq!(presigned.url, "https://cdn.example.com/signed");
        assert_eq!(presigned.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn test_provider_maps_locator() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/presigned-url"))
            .and(body_json(json!({"bucket": "chants", "key": "kyrie.mp3"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"url": "https://cdn.example.com/kyrie", "expiresIn": 60})),
            )
            .mount(&server)
            .await;

        let locator = Locator::parse("s3://chants/kyrie.mp3").unwrap();
        let url = client_for(&server)
            .resolve_playback_url(&locator)
            .await
            .unwrap();

        assert_eq!(url.url, "https://cdn.example.com/kyrie");
        assert_eq!(url.expires_in, Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_provider_reports_missing_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/presigned-url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let locator = Locator::parse("s3://chants/kyrie.mp3").unwrap();
        let err = client_for(&server)
            .resolve_playback_url(&locator)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MissingUrl));
    }

    #[tokio::test]
    async fn test_provider_reports_server_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/presigned-url"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"error": "Access denied", "code": "403"})),
            )
            .mount(&server)
            .await;

        let locator = Locator::parse("s3://chants/kyrie.mp3").unwrap();
        let err = client_for(&server)
            .resolve_playback_url(&locator)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Access denied (Code: 403)");
    }
}
