//! S3 backend integration tests using LocalStack.
//!
//! These tests verify hierarchical listing, content fetching and a full
//! filtered tree query against a real S3 API.

use std::sync::Arc;

use crate::common::{gzip, LocalStackTestContext};
use kbx_explorer::{Explorer, ExplorerConfig, TreeQuery};
use kbx_traits::{ContentFetcher, EntryKind, StorageLister};
use kbx_types::{StorageNode, TopicFilter};

const SECURITY_NOV_03: &str = "topics/neptunedb-security/year=2023/month=11/day=03/hour=15/neptunedb-security+1+0000000000.json.gz";
const SECURITY_NOV_05: &str = "topics/neptunedb-security/year=2023/month=11/day=05/hour=09/neptunedb-security+0+0000000042.json.gz";
const REPORTS_NOV_03: &str = "topics/neptunedb-reports/year=2023/month=11/day=03/hour=10/neptunedb-reports+0+0000000007.json.gz";

/// Upload a small Kafka sink style backup, returning `false` if LocalStack is down.
async fn seed(ctx: &LocalStackTestContext, bucket: &str) -> bool {
    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return false;
    }

    ctx.create_bucket(bucket).await.unwrap();
    ctx.upload_gzip(
        bucket,
        SECURITY_NOV_03,
        r#"{"type":"gs.event.db.datachange.neptune.actions","id":1}"#,
    )
    .await
    .unwrap();
    ctx.upload_gzip(
        bucket,
        SECURITY_NOV_05,
        r#"{"type":"gs.event.db.datachange.neptune.actions","id":2}"#,
    )
    .await
    .unwrap();
    ctx.upload_raw(
        bucket,
        REPORTS_NOV_03,
        gzip(r#"{"type":"gs.event.report.generated","id":3}"#),
    )
    .await
    .unwrap();
    // Directory marker as written by some S3 tools
    ctx.upload_raw(bucket, "topics/neptunedb-reports/", Vec::new())
        .await
        .unwrap();

    true
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_lists_one_level() {
    let ctx = LocalStackTestContext::new().await;
    let bucket = "kbx-list-bucket";
    if !seed(&ctx, bucket).await {
        return;
    }

    let storage = ctx.storage(bucket).await;

    let topics = storage.list_children("topics/").await.unwrap();
    let keys: Vec<&str> = topics.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["topics/neptunedb-reports/", "topics/neptunedb-security/"]
    );
    assert!(topics.iter().all(|e| e.kind == EntryKind::Partition));

    // The directory marker of the listed prefix is not reported
    let reports = storage
        .list_children("topics/neptunedb-reports/")
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].key, "topics/neptunedb-reports/year=2023/");
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_lists_leaves_and_fetches_content() {
    let ctx = LocalStackTestContext::new().await;
    let bucket = "kbx-fetch-bucket";
    if !seed(&ctx, bucket).await {
        return;
    }

    let storage = ctx.storage(bucket).await;
    let hour = "topics/neptunedb-security/year=2023/month=11/day=03/hour=15/";

    let entries = storage.list_children(hour).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Leaf);
    assert_eq!(entries[0].key, SECURITY_NOV_03);

    let raw = storage.fetch_content(SECURITY_NOV_03).await.unwrap();
    let text = kbx_explorer::decode_content(&raw).await.unwrap();
    assert!(text.contains("neptune.actions"));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_filtered_tree_query() {
    let ctx = LocalStackTestContext::new().await;
    let bucket = "kbx-query-bucket";
    if !seed(&ctx, bucket).await {
        return;
    }

    let explorer = Explorer::new(
        Arc::new(ctx.storage(bucket).await),
        ExplorerConfig::default(),
    )
    .unwrap();

    let from = kbx_types::parse_date_time("2023-11-01").unwrap();
    let until = kbx_types::parse_date_time("2023-11-04").unwrap();
    let query = TreeQuery::new()
        .with_topics(TopicFilter::parse("neptunedb-security").unwrap())
        .with_bounds(Some(from), Some(until))
        .unwrap()
        .with_search_pattern("gs.event.db.datachange.neptune.actions");

    let nodes = explorer.query_tree(query).await.unwrap();

    assert_eq!(nodes.len(), 1);
    let files = nodes[0].data_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, SECURITY_NOV_03);
    assert_eq!(files[0].file_name, "neptunedb-security+1+0000000000.json.gz");

    // Day 5 is outside the window and never appears
    let StorageNode::Directory(topic) = &nodes[0] else {
        panic!("expected a directory");
    };
    assert!(nodes[0]
        .find("topics/neptunedb-security/year=2023/month=11/day=05/")
        .is_none());
    assert_eq!(topic.name, "topics/neptunedb-security/");
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_missing_bucket_fails_root_listing() {
    let ctx = LocalStackTestContext::new().await;
    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let explorer = Explorer::new(
        Arc::new(ctx.storage("kbx-no-such-bucket").await),
        ExplorerConfig::default(),
    )
    .unwrap();

    let err = explorer.query_tree(TreeQuery::new()).await.unwrap_err();
    assert!(!err.is_invalid_request());
}
