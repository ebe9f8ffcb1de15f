use futures::future::join_all;
use repo_audit::{analysis_key, EntryState, ResultCache};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_interleaved_callers_in_one_task_share_production() {
    let cache = ResultCache::<String>::new("analysis");
    let calls = AtomicUsize::new(0);
    let key = analysis_key("src/app.js", "eval(x)");

    let lookups = (0..8).map(|_| {
        cache.get_or_compute(&key, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, String>("findings".to_string())
        })
    });
    let results = join_all(lookups).await;

    assert!(results.iter().all(|r| r.as_deref() == Ok("findings")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.state(&key), Some(EntryState::Ready));
    assert_eq!(cache.stats().waits, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_keys_produce_independently() {
    let cache = Arc::new(ResultCache::<usize>::new("analysis"));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..32 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            let key = analysis_key(&format!("file{}.rs", i % 4), "fn main() {}");
            cache
                .get_or_compute(&key, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok::<_, ()>(i % 4)
                })
                .await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), Ok(i % 4));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(cache.len(), 4);
}

#[tokio::test]
async fn test_failures_are_never_served_to_later_callers() {
    let cache = ResultCache::<Vec<String>>::new("analysis");
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        let result = cache
            .get_or_compute("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<Vec<String>, _>("service unavailable")
            })
            .await;
        assert_eq!(result, Err("service unavailable"));
        assert_eq!(cache.state("k"), None);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let value = cache
        .get_or_compute("k", || async { Ok::<_, &str>(Vec::new()) })
        .await
        .unwrap();
    assert!(value.is_empty());
    assert_eq!(cache.get("k"), Some(Vec::new()));
    assert_eq!(cache.stats().failures, 3);
}

#[tokio::test]
async fn test_invalidate_during_production_does_not_store() {
    let cache = Arc::new(ResultCache::<u32>::new("rewrite"));
    let (release, released) = tokio::sync::oneshot::channel::<()>();

    let producer = {
        let cache = cache.clone();
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async move {
                    let _ = released.await;
                    Ok::<_, ()>(1)
                })
                .await
        })
    };
    while cache.state("k") != Some(EntryState::Pending) {
        tokio::task::yield_now().await;
    }

    assert!(cache.invalidate("k"));
    release.send(()).unwrap();
    assert_eq!(producer.await.unwrap(), Ok(1));
    assert_eq!(cache.state("k"), None);

    let value = cache.get_or_compute("k", || async { Ok::<_, ()>(2) }).await;
    assert_eq!(value, Ok(2));
}
