mod common;

use std::sync::Arc;

use pagetap::{
    CaptureConfig, CaptureSession, ChannelMessage, PageContext, PageRequest, PagetapError,
    SessionBuilder,
};
use serde_json::json;
use tokio::time::{Duration, sleep, timeout};

use common::{LOGS_BODY, MATCHING_URL, MockPage, OTHER_URL, StaticFetch};

fn fast_config() -> CaptureConfig {
    CaptureConfig::builder()
        .pacing(Duration::from_millis(5))
        .build()
        .unwrap()
}

async fn wait_for_len(session: &CaptureSession, want: usize) {
    timeout(Duration::from_secs(2), async {
        while session.len().await != want {
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("collector never reached {want} items"));
}

#[tokio::test]
async fn full_capture_pipeline_collects_dedups_and_exports() {
    let page = Arc::new(MockPage::stagnant());
    let mut session = CaptureSession::builder()
        .page(page)
        .config(fast_config())
        .build()
        .unwrap();
    let mut rx = session.subscribe();

    let mut ctx = PageContext::new(Arc::new(StaticFetch::new(LOGS_BODY)));
    let handle = session.install(&mut ctx);

    session.start(false);
    timeout(Duration::from_secs(2), async {
        while !handle.capturing() {
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();

    // Two records arrive; a duplicate delivery of the same response must
    // not grow the collector.
    ctx.fetch()
        .send(PageRequest::get(MATCHING_URL))
        .await
        .unwrap();
    wait_for_len(&session, 2).await;
    ctx.fetch()
        .send(PageRequest::get(MATCHING_URL))
        .await
        .unwrap();
    ctx.fetch().send(PageRequest::get(OTHER_URL)).await.unwrap();
    sleep(Duration::from_millis(20)).await;
    assert_eq!(session.len().await, 2);

    session.stop().await;
    assert_eq!(session.len().await, 2, "stop must not discard data");

    let export = session.export("host-logs").await.unwrap().unwrap();
    assert!(export.name.starts_with("host-logs-"));
    assert!(export.name.ends_with(".jsonl"));
    let lines: Vec<_> = export.content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(lines[0]).unwrap(),
        json!({"id": "a", "level": "info"})
    );

    // The status feed saw the capture happen.
    let mut statuses = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        if let ChannelMessage::Status { msg } = msg {
            statuses.push(msg);
        }
    }
    assert!(statuses.iter().any(|m| m.contains("captured +2")));
    assert!(statuses.iter().any(|m| m.contains("exported 2 items")));

    session.clear().await;
    assert_eq!(session.len().await, 0);
    assert!(session.export("host-logs").await.unwrap().is_none());
}

#[tokio::test]
async fn start_is_idempotent_while_the_driver_runs() {
    let page = Arc::new(MockPage::stagnant());
    let mut session = CaptureSession::builder()
        .page(page.clone())
        .config(
            CaptureConfig::builder()
                .pacing(Duration::from_millis(5))
                .stagnant_limit(1000)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    session.start(false);
    session.start(true);
    sleep(Duration::from_millis(30)).await;
    let summary = session.stop().await.expect("driver was running");

    // One driver, not two: iterations track a single 5ms cadence.
    assert!(summary.iterations >= 2);
    let passes = page.element_passes.load(std::sync::atomic::Ordering::SeqCst);
    assert_eq!(u64::from(summary.iterations), passes as u64);
}

#[tokio::test]
async fn stopping_without_starting_is_a_no_op() {
    let mut session = CaptureSession::builder()
        .page(Arc::new(MockPage::stagnant()))
        .config(fast_config())
        .build()
        .unwrap();
    assert!(session.stop().await.is_none());
}

#[tokio::test]
async fn building_without_a_page_is_an_error() {
    let err = SessionBuilder::default().build().err().unwrap();
    assert!(matches!(err, PagetapError::Config(_)));
}
