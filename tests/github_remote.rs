//! Integration tests for the GitHub REST gateway.
//!
//! Each test runs the gateway against a local wiremock server standing in
//! for the GitHub API.

use hubtree::core::types::RepoName;
use hubtree::remote::github::{Credentials, GitHubRemote};
use hubtree::remote::{RemoteError, RemoteRepository, ShowPathResult};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "/repos/acme/widgets";

async fn setup() -> (MockServer, GitHubRemote) {
    let server = MockServer::start().await;
    let remote = GitHubRemote::new(RepoName::new("acme/widgets").unwrap(), None)
        .with_api_base(server.uri())
        .with_reference("v1");
    (server, remote)
}

fn commit(sha: &str, date: &str) -> serde_json::Value {
    json!({
        "sha": sha,
        "commit": {
            "author": {"name": "a", "date": date},
            "committer": {"name": "c", "date": date}
        }
    })
}

// =============================================================================
// Contents API
// =============================================================================

mod contents {
    use super::*;

    #[tokio::test]
    async fn exists_true_on_success() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/README.md", REPO)))
            .and(query_param("ref", "v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "file"})))
            .mount(&server)
            .await;

        assert!(remote.exists("README.md").await.unwrap());
    }

    #[tokio::test]
    async fn exists_false_on_404() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/missing", REPO)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        assert!(!remote.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/bin/data", REPO)))
            .and(header("accept", "application/vnd.github.raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 1, 2, 255]))
            .mount(&server)
            .await;

        assert_eq!(remote.download("bin/data").await.unwrap(), vec![0u8, 1, 2, 255]);
    }

    #[tokio::test]
    async fn special_characters_stay_in_the_path() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/docs/issue%2312.md", REPO)))
            .and(query_param("ref", "v1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hash".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/docs/what%3F.md", REPO)))
            .and(query_param("ref", "v1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"question".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(remote.download("docs/issue#12.md").await.unwrap(), b"hash");
        assert_eq!(remote.download("docs/what?.md").await.unwrap(), b"question");
    }

    #[tokio::test]
    async fn show_path_object_is_file() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/src/lib.rs", REPO)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "file",
                "name": "lib.rs",
                "path": "src/lib.rs",
                "sha": "abc123",
                "size": 42
            })))
            .mount(&server)
            .await;

        match remote.show_path("src/lib.rs").await.unwrap() {
            ShowPathResult::File(entry) => {
                assert_eq!(entry.path.as_deref(), Some("src/lib.rs"));
                assert_eq!(entry.name.as_deref(), Some("lib.rs"));
                assert_eq!(entry.size, Some(42));
            }
            other => panic!("expected file, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn show_path_array_is_directory() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/src", REPO)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "file", "name": "lib.rs", "path": "src/lib.rs"}
            ])))
            .mount(&server)
            .await;

        assert_eq!(
            remote.show_path("src").await.unwrap(),
            ShowPathResult::DirectoryHint
        );
    }

    #[tokio::test]
    async fn show_path_404_is_not_found() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/contents/nope", REPO)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        assert_eq!(
            remote.show_path("nope").await.unwrap_err(),
            RemoteError::NotFound("Not Found".into())
        );
    }
}

// =============================================================================
// Trees and commits
// =============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn tree_is_listed_recursively_at_reference() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/git/trees/v1", REPO)))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "root",
                "tree": [
                    {"path": "src", "mode": "040000", "type": "tree", "sha": "t1"},
                    {"path": "src/lib.rs", "mode": "100644", "type": "blob", "sha": "b1", "size": 3}
                ],
                "truncated": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let listing = remote.list_tree_recursive().await.unwrap();
        assert_eq!(listing.entries.len(), 2);
        assert_eq!(listing.entries[1].path(), "src/lib.rs");
        assert!(!listing.truncated);
    }

    #[tokio::test]
    async fn commits_follow_pages_on_branch() {
        let (server, remote) = setup().await;
        let remote = remote.with_branch("main");

        let full_page: Vec<_> = (0..100)
            .map(|i| commit(&format!("c{}", i), "2020-01-02T00:00:00Z"))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("{}/commits", REPO)))
            .and(query_param("sha", "main"))
            .and(query_param("path", "a.txt"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/commits", REPO)))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([commit("first", "2019-01-01T00:00:00Z")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let history = remote.commits_for_path("a.txt").await.unwrap();
        assert_eq!(history.len(), 101);
        assert_eq!(history.newest().unwrap().sha, "c0");
        assert_eq!(history.oldest().unwrap().sha, "first");
        assert_eq!(
            history.oldest().unwrap().committer_date,
            "2019-01-01T00:00:00Z"
        );
    }

    #[tokio::test]
    async fn empty_history() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/commits", REPO)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(remote.commits_for_path("a.txt").await.unwrap().is_empty());
    }
}

// =============================================================================
// Authentication and error mapping
// =============================================================================

mod errors {
    use super::*;

    async fn tree_error(status: u16) -> RemoteError {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/git/trees/v1", REPO)))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"message": "nope"})),
            )
            .mount(&server)
            .await;

        remote.list_tree_recursive().await.unwrap_err()
    }

    #[tokio::test]
    async fn status_mapping() {
        assert!(matches!(tree_error(401).await, RemoteError::AuthFailed(_)));
        assert_eq!(
            tree_error(403).await,
            RemoteError::AuthFailed("Permission denied: nope".into())
        );
        assert_eq!(tree_error(404).await, RemoteError::NotFound("nope".into()));
        assert_eq!(tree_error(429).await, RemoteError::RateLimited);
        assert!(matches!(
            tree_error(500).await,
            RemoteError::ApiError { status: 500, .. }
        ));
        assert_eq!(
            tree_error(422).await,
            RemoteError::ApiError {
                status: 422,
                message: "nope".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let (server, remote) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/git/trees/v1", REPO)))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(matches!(
            remote.list_tree_recursive().await,
            Err(RemoteError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let remote = GitHubRemote::new(RepoName::new("acme/widgets").unwrap(), None)
            .with_api_base("http://127.0.0.1:1");

        assert!(matches!(
            remote.exists("a").await,
            Err(RemoteError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        let remote = GitHubRemote::new(
            RepoName::new("acme/widgets").unwrap(),
            Some(Credentials::Token("t0ken".into())),
        )
        .with_api_base(server.uri());

        Mock::given(method("GET"))
            .and(path(format!("{}/contents/a", REPO)))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(remote.exists("a").await.unwrap());
    }
}
