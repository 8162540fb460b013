mod helpers;

use futures::StreamExt;
use helpers::*;
use mockito::{Matcher, Server};
use seaweed_core::models::{DeleteOptions, ListOptions, UploadOptions};
use seaweed_core::WeedError;
use std::collections::BTreeMap;

const FILE_METADATA: &str = r#"{
    "FullPath": "/files/f.txt",
    "Mtime": "2024-03-01T10:00:00Z",
    "Crtime": "2024-03-01T10:00:00Z",
    "Mode": 432,
    "Mime": "text/plain",
    "FileSize": 8,
    "Extended": {"Seaweed-owner": "b3Bz", "Seaweed-team": "c3RvcmFnZQ=="},
    "chunks": [{"file_id": "3,01637037d6", "size": 8}]
}"#;

fn limit(limit: u32) -> ListOptions {
    ListOptions {
        limit: Some(limit),
        ..ListOptions::default()
    }
}

#[tokio::test]
async fn test_upload_sends_multipart_with_options() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/files/hello.txt")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("collection".into(), "docs".into()),
            Matcher::UrlEncoded("ttl".into(), "3m".into()),
        ]))
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::Regex("CONTENTS".into()))
        .with_status(201)
        .with_body(r#"{"name":"hello.txt","size":8}"#)
        .create_async()
        .await;

    let result = filer_client(&server)
        .upload(
            "/files/hello.txt",
            "CONTENTS",
            "hello.txt",
            &UploadOptions {
                collection: Some("docs".to_string()),
                ttl: Some("3m".to_string()),
                ..UploadOptions::default()
            },
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.name, "hello.txt");
    assert_eq!(result.size, 8);
}

#[tokio::test]
async fn test_put_uses_put_method() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/files/my%20report.txt")
        .match_query(Matcher::Any)
        .with_status(201)
        .with_body(r#"{"name":"my report.txt","size":6}"#)
        .create_async()
        .await;

    let result = filer_client(&server)
        .put(
            "files/my report.txt",
            "REPORT",
            "my report.txt",
            &UploadOptions::default(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.size, 6);
}

#[tokio::test]
async fn test_get_file_and_attachment() {
    let mut server = Server::new_async().await;
    let inline = server
        .mock("GET", "/files/f.txt")
        .with_status(200)
        .with_body("CONTENTS")
        .create_async()
        .await;
    let attachment = server
        .mock("GET", "/files/f.txt")
        .match_query(Matcher::UrlEncoded(
            "response-content-disposition".into(),
            "attachment".into(),
        ))
        .with_status(200)
        .with_header("content-disposition", "attachment; filename=\"f.txt\"")
        .with_body("CONTENTS")
        .create_async()
        .await;

    let client = filer_client(&server);
    assert_eq!(&client.get_file("/files/f.txt", false).await.unwrap()[..], b"CONTENTS");
    assert_eq!(&client.get_file("/files/f.txt", true).await.unwrap()[..], b"CONTENTS");

    inline.assert_async().await;
    attachment.assert_async().await;
}

#[tokio::test]
async fn test_get_metadata_returns_file_entry() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/f.txt")
        .match_query(Matcher::UrlEncoded("metadata".into(), "true".into()))
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(FILE_METADATA)
        .create_async()
        .await;

    let entry = filer_client(&server)
        .get_metadata("/files/f.txt")
        .await
        .unwrap();

    assert!(!entry.is_directory());
    assert_eq!(entry.name(), "f.txt");
    assert_eq!(entry.attributes().file_size, 8);
}

#[tokio::test]
async fn test_missing_path_is_no_file_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/missing.txt")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let client = filer_client(&server);
    let err = client.get_metadata("/files/missing.txt").await.unwrap_err();
    assert!(matches!(err, WeedError::NoFileFound(ref p) if p == "/files/missing.txt"));

    let err = client.get_file("/files/missing.txt", false).await.unwrap_err();
    assert!(matches!(err, WeedError::NoFileFound(_)));
}

#[tokio::test]
async fn test_move_entry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/files/new.txt")
        .match_query(Matcher::UrlEncoded("mv.from".into(), "/files/old.txt".into()))
        .with_status(204)
        .create_async()
        .await;

    filer_client(&server)
        .move_entry("files/old.txt", "/files/new.txt")
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_entry_with_options() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/files/nested")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("recursive".into(), "true".into()),
            Matcher::UrlEncoded("ignoreRecursiveError".into(), "true".into()),
        ]))
        .with_status(204)
        .create_async()
        .await;

    filer_client(&server)
        .delete_entry(
            "/files/nested",
            &DeleteOptions {
                recursive: Some(true),
                ignore_recursive_error: Some(true),
                ..DeleteOptions::default()
            },
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_set_tags_sends_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/files/f.txt")
        .match_query(Matcher::Regex("^tagging$".into()))
        .match_header("Seaweed-owner", "ops")
        .match_header("Seaweed-team", "storage")
        .with_status(202)
        .create_async()
        .await;

    let mut tags = BTreeMap::new();
    tags.insert("Seaweed-owner".to_string(), "ops".to_string());
    tags.insert("Seaweed-team".to_string(), "storage".to_string());

    filer_client(&server)
        .set_tags("/files/f.txt", &tags)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_tags_never_reach_the_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = filer_client(&server)
        .set_tags(
            "/files/f.txt",
            [("Bad-1", "a"), ("Seaweed-ok", "b"), ("Bad-2", "c")],
        )
        .await
        .unwrap_err();

    match err {
        WeedError::InvalidTag(keys) => assert_eq!(keys, vec!["Bad-1", "Bad-2"]),
        other => panic!("expected InvalidTag, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_tags_differing_only_in_case_are_rejected() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = filer_client(&server)
        .set_tags(
            "/files/f.txt",
            [("Seaweed-Owner", "a"), ("Seaweed-owner", "b")],
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, WeedError::InvalidInput(ref msg) if msg.contains("Seaweed-owner")),
        "{:?}",
        err
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remove_named_tags() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/files/f.txt")
        .match_query(Matcher::UrlEncoded(
            "tagging".into(),
            "Seaweed-owner,Seaweed-team".into(),
        ))
        .with_status(202)
        .create_async()
        .await;

    filer_client(&server)
        .remove_tags("/files/f.txt", &["Seaweed-owner", "Seaweed-team"])
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remove_all_tags() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/files/f.txt")
        .match_query(Matcher::Regex("^tagging$".into()))
        .with_status(202)
        .create_async()
        .await;

    let none: &[&str] = &[];
    filer_client(&server)
        .remove_tags("/files/f.txt", none)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remove_tags_validates_names() {
    let server = Server::new_async().await;
    let err = filer_client(&server)
        .remove_tags("/files/f.txt", &["owner"])
        .await
        .unwrap_err();
    assert!(matches!(err, WeedError::InvalidTag(ref keys) if keys == &["owner"]));
}

#[tokio::test]
async fn test_get_tags_decodes_values() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/f.txt")
        .match_query(Matcher::UrlEncoded("metadata".into(), "true".into()))
        .with_status(200)
        .with_body(FILE_METADATA)
        .create_async()
        .await;

    let tags = filer_client(&server).get_tags("/files/f.txt").await.unwrap();
    assert_eq!(tags["Seaweed-owner"], "ops");
    assert_eq!(tags["Seaweed-team"], "storage");
}

#[tokio::test]
async fn test_listing_with_exactly_limit_entries_ends_on_empty_page() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/files/")
        .match_query(Matcher::Regex("^limit=2$".into()))
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(listing_body("/files", &["a.txt", "b.txt"], 2))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/files/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "2".into()),
            Matcher::UrlEncoded("lastFileName".into(), "b.txt".into()),
        ]))
        .with_status(200)
        .with_body(listing_body("/files", &[], 2))
        .expect(1)
        .create_async()
        .await;

    let entries = filer_client(&server)
        .list_files("/files", limit(2))
        .await
        .unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_listing_follows_cursor_across_pages() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/")
        .match_query(Matcher::Regex("^limit=2$".into()))
        .with_status(200)
        .with_body(listing_body("/files", &["a", "b"], 2))
        .create_async()
        .await;
    server
        .mock("GET", "/files/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "2".into()),
            Matcher::UrlEncoded("lastFileName".into(), "b".into()),
        ]))
        .with_status(200)
        .with_body(listing_body("/files", &["c", "d"], 2))
        .create_async()
        .await;
    let last = server
        .mock("GET", "/files/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "2".into()),
            Matcher::UrlEncoded("lastFileName".into(), "d".into()),
        ]))
        .with_status(200)
        .with_body(listing_body("/files", &["e"], 2))
        .create_async()
        .await;

    let mut pages = filer_client(&server)
        .list_entries("/files", limit(2))
        .unwrap();
    let mut sizes = Vec::new();
    while let Some(page) = pages.next().await {
        sizes.push(page.unwrap().len());
    }

    assert_eq!(sizes, vec![2, 2, 1]);
    last.assert_async().await;
}

#[tokio::test]
async fn test_listing_forwards_name_patterns() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "100".into()),
            Matcher::UrlEncoded("namePattern".into(), "*.txt".into()),
            Matcher::UrlEncoded("namePatternExclude".into(), "tmp?".into()),
        ]))
        .with_status(200)
        .with_body(listing_body("", &["a.txt"], 100))
        .create_async()
        .await;

    let entries = filer_client(&server)
        .list_files(
            "/",
            ListOptions {
                name_pattern: Some("*.txt".to_string()),
                name_pattern_exclude: Some("tmp?".to_string()),
                ..ListOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_listing_zero_limit_is_rejected_before_any_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = filer_client(&server);
    assert!(matches!(
        client.list_entries("/files", limit(0)),
        Err(WeedError::InvalidInput(_))
    ));
    assert!(matches!(
        client.list_files("/files", limit(0)).await,
        Err(WeedError::InvalidInput(_))
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_listing_is_lazy() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/files/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(listing_body("/files", &["a"], 100))
        .expect(1)
        .create_async()
        .await;

    let client = filer_client(&server);
    let pages = client.list_entries("/files", ListOptions::default()).unwrap();
    // Nothing is requested until the stream is polled.
    assert!(!mock.matched_async().await);

    let pages: Vec<_> = pages.collect().await;
    assert_eq!(pages.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_listing_missing_directory_is_no_file_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/missing/")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let err = filer_client(&server)
        .list_files("/missing", ListOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WeedError::NoFileFound(ref p) if p == "/missing"));
}
