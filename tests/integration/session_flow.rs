use super::support::{FakeAnalyzer, FakeSource};
use repo_audit::config::RepositoryConfig;
use repo_audit::error::{ApiError, RemoteError};
use repo_audit::notify::NotificationLevel;
use repo_audit::remote::{RepositorySource, SecurityAnalyzer};
use repo_audit::{analysis_key, AuditSession, ViewMode};
use std::sync::atomic::Ordering;
use std::sync::Arc;

const URL: &str = "https://github.com/octo/widgets";
const HANDLER: &str = "const run = (input) => eval(input);\nexport default run;";

fn session() -> (AuditSession, Arc<FakeSource>, Arc<FakeAnalyzer>) {
    let source = Arc::new(FakeSource::with_files(&[
        ("src/api/handler.js", HANDLER),
        ("src/util.js", "export const add = (a, b) => a + b;"),
        ("README.md", "# widgets"),
    ]));
    let analyzer = Arc::new(FakeAnalyzer::default());
    let source_dyn: Arc<dyn RepositorySource> = source.clone();
    let analyzer_dyn: Arc<dyn SecurityAnalyzer> = analyzer.clone();
    let session = AuditSession::new(source_dyn, analyzer_dyn, RepositoryConfig::default());
    (session, source, analyzer)
}

#[tokio::test]
async fn test_load_repository_builds_tree() {
    let (mut session, source, _) = session();
    let stats = session.load_repository(URL, None).await.unwrap();

    assert_eq!(stats.files, 3);
    assert_eq!(stats.directories, 2);
    let loaded = session.repository().unwrap();
    assert_eq!(loaded.repo.to_string(), "octo/widgets");
    assert_eq!(loaded.branch, "main");
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);

    let titles: Vec<String> = session
        .drain_notifications()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, vec!["Loading Repository", "Repository Loaded"]);
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_listing() {
    let (mut session, source, _) = session();
    let err = session
        .load_repository("https://example.com/octo", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRepositoryUrl(_)));
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
    assert!(session.tree().is_empty());
}

#[tokio::test]
async fn test_failed_load_keeps_previous_tree() {
    let (mut session, source, _) = session();
    session.load_repository(URL, None).await.unwrap();
    let before = session.tree().to_vec();

    *source.fail_listing.lock() = true;
    let err = session
        .load_repository("https://github.com/octo/other", Some("dev"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::RemoteFailure(RemoteError::Unavailable(_))));
    assert_eq!(session.tree(), before.as_slice());
    assert_eq!(session.repository().unwrap().repo.name, "widgets");

    let last = session.drain_notifications().pop().unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.title, "Repository Load Failed");
}

#[tokio::test]
async fn test_toggle_folders() {
    let (mut session, _, _) = session();
    session.load_repository(URL, None).await.unwrap();

    assert_eq!(session.visible_rows().len(), 2);
    assert!(session.toggle_folder("src").unwrap());
    assert!(session.toggle_folder("src/api").unwrap());
    let rows: Vec<&str> = session
        .visible_rows()
        .iter()
        .map(|row| row.node.path.as_str())
        .collect();
    assert_eq!(
        rows,
        vec!["src", "src/api", "src/api/handler.js", "src/util.js", "README.md"]
    );

    assert!(!session.toggle_folder("src").unwrap());
    assert_eq!(session.visible_rows().len(), 2);

    assert!(matches!(
        session.toggle_folder("README.md"),
        Err(ApiError::NotADirectory(_))
    ));
    assert!(matches!(
        session.toggle_folder("missing"),
        Err(ApiError::PathNotFound(_))
    ));
}

#[tokio::test]
async fn test_analysis_is_cached_across_toggles_and_reopen() {
    let (mut session, _, analyzer) = session();
    session.load_repository(URL, None).await.unwrap();
    let path = "src/api/handler.js";
    session.open_file(path).await.unwrap();

    let findings = session.analyze(path).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line, Some(1));

    session.toggle_folder("src").unwrap();
    session.toggle_folder("src").unwrap();
    session.close_file(path);
    session.open_file(path).await.unwrap();

    let again = session.analyze(path).await.unwrap();
    assert_eq!(again, findings);
    assert_eq!(analyzer.analyze_calls.load(Ordering::SeqCst), 1);

    let key = analysis_key(path, HANDLER);
    assert_eq!(session.analysis_cache().get(&key), Some(findings));
    assert_eq!(session.analysis_cache().stats().hits, 1);
}

#[tokio::test]
async fn test_failed_analysis_is_retried() {
    let (mut session, _, analyzer) = session();
    session.load_repository(URL, None).await.unwrap();
    let path = "src/util.js";
    session.open_file(path).await.unwrap();

    *analyzer.fail_analyze.lock() = true;
    assert!(session.analyze(path).await.is_err());
    assert!(session.analysis_cache().is_empty());

    *analyzer.fail_analyze.lock() = false;
    assert!(session.analyze(path).await.unwrap().is_empty());
    assert_eq!(analyzer.analyze_calls.load(Ordering::SeqCst), 2);

    let titles: Vec<String> = session
        .drain_notifications()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert!(titles.contains(&"Scan Failed".to_string()));
    assert_eq!(titles.last().map(String::as_str), Some("Scan Complete"));
}

#[tokio::test]
async fn test_rewrite_toggle_uses_cache() {
    let (mut session, _, analyzer) = session();
    session.load_repository(URL, None).await.unwrap();
    let path = "src/api/handler.js";
    session.open_file(path).await.unwrap();

    assert!(matches!(
        session.request_rewrite(path).await,
        Err(ApiError::NotAnalyzed(_))
    ));

    session.analyze(path).await.unwrap();
    assert_eq!(session.request_rewrite(path).await.unwrap(), ViewMode::Corrected);
    assert!(session.effective_content(path).unwrap().contains("safeEval(input)"));

    assert_eq!(session.request_rewrite(path).await.unwrap(), ViewMode::Original);
    assert_eq!(session.effective_content(path).unwrap(), HANDLER);
    assert_eq!(session.rewrite_cache().len(), 1);

    assert_eq!(session.request_rewrite(path).await.unwrap(), ViewMode::Corrected);
    assert_eq!(analyzer.rewrite_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_rewrite_stays_original() {
    let (mut session, _, analyzer) = session();
    session.load_repository(URL, None).await.unwrap();
    let path = "src/api/handler.js";
    session.open_file(path).await.unwrap();
    session.analyze(path).await.unwrap();
    session.drain_notifications();

    *analyzer.fail_rewrite.lock() = true;
    assert!(session.request_rewrite(path).await.is_err());
    assert_eq!(session.open_file_state(path).unwrap().view_mode(), ViewMode::Original);
    assert!(session.rewrite_cache().is_empty());

    let notification = session.drain_notifications().pop().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.title, "Code Fix Failed");

    *analyzer.fail_rewrite.lock() = false;
    assert_eq!(session.request_rewrite(path).await.unwrap(), ViewMode::Corrected);
    assert_eq!(analyzer.rewrite_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_reload_keeps_caches_and_closes_files() {
    let (mut session, source, analyzer) = session();
    session.load_repository(URL, None).await.unwrap();
    let path = "src/api/handler.js";
    session.open_file(path).await.unwrap();
    session.analyze(path).await.unwrap();
    session.toggle_folder("src").unwrap();

    session.load_repository(URL, None).await.unwrap();
    assert!(session.open_file_state(path).is_none());
    assert_eq!(session.visible_rows().len(), 2);
    assert_eq!(session.analysis_cache().len(), 1);

    session.open_file(path).await.unwrap();
    session.analyze(path).await.unwrap();
    assert_eq!(analyzer.analyze_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_open_file_errors() {
    let (mut session, _, _) = session();
    assert!(matches!(
        session.open_file("README.md").await,
        Err(ApiError::NoRepository)
    ));

    session.load_repository(URL, None).await.unwrap();
    assert!(matches!(
        session.open_file("src").await,
        Err(ApiError::NotAFile(_))
    ));
    assert!(matches!(
        session.open_file("nope.rs").await,
        Err(ApiError::PathNotFound(_))
    ));
    assert!(matches!(
        session.analyze("README.md").await,
        Err(ApiError::FileNotOpen(_))
    ));
}

#[tokio::test]
async fn test_empty_file_is_a_remote_failure() {
    let source = Arc::new(FakeSource::with_files(&[("empty.txt", "")]));
    let source_dyn: Arc<dyn RepositorySource> = source.clone();
    let analyzer: Arc<dyn SecurityAnalyzer> = Arc::new(FakeAnalyzer::default());
    let mut session = AuditSession::new(source_dyn, analyzer, RepositoryConfig::default());
    session.load_repository(URL, None).await.unwrap();

    let err = session.open_file("empty.txt").await.unwrap_err();
    assert!(matches!(err, ApiError::RemoteFailure(RemoteError::EmptyResponse(_))));
    assert!(session.open_file_state("empty.txt").is_none());
}

#[tokio::test]
async fn test_opened_file_starts_original_before_analysis() {
    let (mut session, _, analyzer) = session();
    session.load_repository(URL, None).await.unwrap();
    let path = "src/api/handler.js";

    let file = session.open_file(path).await.unwrap();
    assert_eq!(file.view_mode(), ViewMode::Original);
    assert!(file.findings.is_none());
    assert_eq!(file.effective_content(), HANDLER);
    assert_eq!(analyzer.analyze_calls.load(Ordering::SeqCst), 0);
}
