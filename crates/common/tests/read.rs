//! Integration tests for tree queries and the read cache

mod common;

use std::time::Duration;

use ::common::content::NodeKind;

#[tokio::test]
async fn test_listing_and_queries() {
    let env = common::setup_test_env().await;
    let fs = &env.fs;

    assert_eq!(fs.children("/"), ["docs", "readme.txt"]);
    assert_eq!(fs.children("/docs"), ["api.md", "guide.md"]);
    assert_eq!(fs.children("docs/"), ["api.md", "guide.md"]);

    assert!(fs.exists("/docs"));
    assert!(fs.is_dir("/docs"));
    assert!(!fs.is_file("/docs"));
    assert!(fs.is_file("//readme.txt"));
    assert!(!fs.exists("/draft.txt"));

    let meta = fs.metadata("/docs/guide.md").unwrap();
    assert_eq!(meta.kind, NodeKind::File);
    assert_eq!(meta.title, "guide.md");
    assert_eq!(
        meta.mime_hint.map(|m| m.essence_str().to_string()),
        Some("text/markdown".to_string())
    );
}

#[tokio::test]
async fn test_missing_paths_are_quiet() {
    let env = common::setup_test_env().await;
    let fs = &env.fs;

    assert!(!fs.exists("/nope"));
    assert!(!fs.is_dir("/nope"));
    assert!(!fs.is_file("/nope"));
    assert!(fs.children("/nope").is_empty());
    assert!(fs.content("/nope").is_none());
    assert!(fs.metadata("/nope").is_none());
    assert!(fs.stat("/nope").is_none());
    assert!(fs.ls("/nope").is_empty());
}

#[tokio::test]
async fn test_directories_have_no_content() {
    let env = common::setup_test_env().await;
    assert!(env.fs.content("/docs").is_none());
    assert!(env.fs.children("/readme.txt").is_empty());
}

#[tokio::test]
async fn test_orphan_found_by_path_but_never_listed() {
    let env = common::setup_test_env().await;
    let fs = &env.fs;

    assert!(fs.exists("/orphan/lost.txt"));
    assert!(fs.is_file("/orphan/lost.txt"));
    assert_eq!(fs.content("/orphan/lost.txt").as_deref(), Some("nobody lists me"));
    assert!(!fs.exists("/orphan"));
    assert!(!fs.walk("/").iter().any(|p| p.starts_with("/orphan")));
}

#[tokio::test]
async fn test_stat_summarizes_without_content() {
    let env = common::setup_test_env().await;

    let stat = env.fs.stat("/readme.txt").unwrap();
    assert_eq!(stat.path, "/readme.txt");
    assert!(!stat.is_directory);
    assert_eq!(stat.size, 5);
    assert_eq!(stat.mime_hint, Some(mime_plain()));

    let dir = env.fs.stat("/docs").unwrap();
    assert!(dir.is_directory);
    assert_eq!(dir.size, 0);

    // stat doesn't populate the cache
    assert_eq!(env.fs.stats().cache_size, 0);
}

#[tokio::test]
async fn test_content_is_cached_until_ttl() {
    let env = common::setup_test_env().await;
    let fs = &env.fs;

    assert_eq!(fs.stats().cache_size, 0);
    assert_eq!(fs.content("/readme.txt").as_deref(), Some("hello"));
    let stats = fs.stats();
    assert_eq!((stats.cache_size, stats.cache_hits, stats.cache_misses), (1, 0, 1));

    // inside the ttl the cached entry answers
    env.advance(Duration::from_secs(5 * 60 - 1));
    assert_eq!(fs.content("/readme.txt").as_deref(), Some("hello"));
    let stats = fs.stats();
    assert_eq!((stats.cache_hits, stats.cache_misses), (1, 1));

    // at the ttl the entry is stale and is replaced from the resident tree
    env.advance(Duration::from_secs(1));
    assert_eq!(fs.content("/readme.txt").as_deref(), Some("hello"));
    let stats = fs.stats();
    assert_eq!((stats.cache_size, stats.cache_hits, stats.cache_misses), (1, 1, 2));

    // the replacement is fresh again
    assert_eq!(fs.content("/readme.txt").as_deref(), Some("hello"));
    assert_eq!(fs.stats().cache_hits, 2);

    // an invalidated path misses once, then is served from the cache
    fs.invalidate("/readme.txt");
    assert_eq!(fs.stats().cache_size, 0);
    fs.content("/readme.txt");
    fs.content("/readme.txt");
    let stats = fs.stats();
    assert_eq!((stats.cache_size, stats.cache_hits, stats.cache_misses), (1, 3, 3));

    assert_eq!(env.store.fetch_count(), 1);
}

#[tokio::test]
async fn test_stats() {
    let env = common::setup_test_env().await;
    let stats = env.fs.stats();
    assert_eq!(stats.total_items, 6);
    assert_eq!(stats.directories, 2);
    assert_eq!(stats.files, 4);
    assert_eq!(stats.cache_size, 0);
}

#[tokio::test]
async fn test_clear_cache_and_invalidate() {
    let env = common::setup_test_env().await;
    let fs = &env.fs;

    fs.content("/readme.txt");
    fs.content("/docs/api.md");
    assert_eq!(fs.stats().cache_size, 2);

    fs.invalidate("readme.txt");
    assert_eq!(fs.stats().cache_size, 1);

    fs.clear_cache();
    assert_eq!(fs.stats().cache_size, 0);
}

#[tokio::test]
async fn test_resolve_and_normalize() {
    let env = common::setup_test_env().await;
    let fs = &env.fs;

    assert_eq!(fs.normalize_path("docs//api.md/"), "/docs/api.md");
    assert_eq!(fs.resolve_path("/docs", "../readme.txt"), "/readme.txt");
    assert_eq!(fs.resolve_path("/docs", "api.md"), "/docs/api.md");
    assert_eq!(fs.resolve_path("/a/b", "../../x"), "/x");

    let resolved = fs.resolve_path("/docs", "..");
    assert_eq!(fs.children(&resolved), ["docs", "readme.txt"]);
}

#[tokio::test]
async fn test_ls_and_walk() {
    let env = common::setup_test_env().await;

    let entries = env.fs.ls("/");
    let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["/docs", "/readme.txt"]);

    assert_eq!(
        env.fs.walk("/"),
        ["/docs", "/docs/api.md", "/docs/guide.md", "/readme.txt"]
    );
}

fn mime_plain() -> mime::Mime {
    mime::TEXT_PLAIN
}
