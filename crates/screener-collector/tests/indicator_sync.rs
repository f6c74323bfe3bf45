//! 메모리 저장소 기반 지표 동기화 통합 테스트.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use screener_collector::modules::{workflow_name, CheckpointStatus};
use screener_collector::ports::CheckpointStore;
use screener_collector::{IndicatorSync, IndicatorSyncOptions, MemoryStore, SyncPorts};
use screener_core::{AssetClass, EngineConfig, OhlcvPoint, SyncConfig};

fn day(index: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(index as i64)
}

fn history(code: &str, len: usize) -> Vec<OhlcvPoint> {
    (0..len)
        .map(|i| {
            let close = 50.0 + (i as f64 * 0.4).sin() * 4.0 + i as f64 * 0.05;
            OhlcvPoint::new(
                day(i),
                code,
                close - 0.3,
                close + 1.0,
                close - 1.0,
                close,
                10_000.0 + (i % 7) as f64 * 500.0,
            )
            .with_amount(close * 10_000.0)
        })
        .collect()
}

fn job(store: &Arc<MemoryStore>, checkpoint_every: usize) -> IndicatorSync {
    job_with_timeout(store, checkpoint_every, 30)
}

fn job_with_timeout(
    store: &Arc<MemoryStore>,
    checkpoint_every: usize,
    instrument_timeout_secs: u64,
) -> IndicatorSync {
    IndicatorSync::new(
        SyncPorts::from_store(store.clone()),
        &EngineConfig::default(),
        SyncConfig {
            concurrency: 4,
            instrument_timeout_secs,
            checkpoint_every,
            asset_classes: vec![AssetClass::Stock],
        },
    )
}

fn options_for(today: NaiveDate) -> IndicatorSyncOptions {
    IndicatorSyncOptions {
        today: Some(today),
        ..Default::default()
    }
}

#[tokio::test]
async fn writes_only_rows_after_watermark() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_history(AssetClass::Stock, history("600000", 80))
        .await;
    let sync = job(&store, 100);

    let first = sync.run(&options_for(day(59))).await.unwrap();
    assert_eq!(first.success, 1);
    assert_eq!(first.total_rows, 60 - 33);
    let before = store.indicator_rows(AssetClass::Stock, "600000").await;
    assert_eq!(before.last().map(|r| r.date), Some(day(59)));

    let second = sync.run(&options_for(day(79))).await.unwrap();
    assert_eq!(second.success, 1);
    assert_eq!(second.total_rows, 20);

    let after = store.indicator_rows(AssetClass::Stock, "600000").await;
    assert_eq!(after.len(), 80 - 33);
    assert_eq!(after.last().map(|r| r.date), Some(day(79)));
    // 이미 저장된 행은 두 번째 실행에서 바뀌지 않음
    assert_eq!(&after[..before.len()], &before[..]);

    let loads = store.loads().await;
    assert_eq!(loads.len(), 2);
    assert_eq!(loads[0].row_limit, Some(1000));
    assert_eq!(loads[1].watermark, Some(day(59)));
    assert_eq!(loads[1].row_limit, None);
}

#[tokio::test]
async fn skips_up_to_date_instrument_without_loading() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_history(AssetClass::Stock, history("000001", 50))
        .await;
    let sync = job(&store, 100);

    sync.run(&options_for(day(49))).await.unwrap();
    let stats = sync.run(&options_for(day(49))).await.unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.success, 0);
    assert_eq!(store.loads().await.len(), 1);
}

#[tokio::test]
async fn short_history_counts_as_empty() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_history(AssetClass::Stock, history("000002", 20))
        .await;
    let sync = job(&store, 100);

    let stats = sync.run(&options_for(day(19))).await.unwrap();

    assert_eq!(stats.empty, 1);
    assert_eq!(stats.errors, 0);
    assert!(store
        .indicator_rows(AssetClass::Stock, "000002")
        .await
        .is_empty());
}

#[tokio::test]
async fn failing_loader_is_isolated_to_one_code() {
    let store = Arc::new(MemoryStore::new());
    for code in ["000001", "000002", "000003"] {
        store.insert_history(AssetClass::Stock, history(code, 40)).await;
    }
    store.fail_loads_for("000002").await;
    let sync = job(&store, 100);

    let stats = sync.run(&options_for(day(39))).await.unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(store.indicator_rows(AssetClass::Stock, "000001").await.len(), 7);
    assert!(store
        .indicator_rows(AssetClass::Stock, "000002")
        .await
        .is_empty());
    assert_eq!(store.indicator_rows(AssetClass::Stock, "000003").await.len(), 7);
}

#[tokio::test]
async fn compute_timeout_is_isolated_to_one_code() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_history(AssetClass::Stock, history("000001", 1000))
        .await;
    job(&store, 100).run(&options_for(day(999))).await.unwrap();
    let written = store.indicator_rows(AssetClass::Stock, "000001").await;
    assert_eq!(written.len(), 1000 - 33);

    // 타임아웃 0초: 계산 단계에 도달한 종목은 모두 시간 초과
    store
        .insert_history(AssetClass::Stock, history("000002", 1000))
        .await;
    let stats = job_with_timeout(&store, 100, 0)
        .run(&options_for(day(999)))
        .await
        .unwrap();

    assert_eq!(stats.total, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.success, 0);
    assert!(store
        .indicator_rows(AssetClass::Stock, "000002")
        .await
        .is_empty());
    assert_eq!(
        store.indicator_rows(AssetClass::Stock, "000001").await,
        written
    );

    // 다음 정상 실행에서 복구
    let retry = job(&store, 100).run(&options_for(day(999))).await.unwrap();
    assert_eq!(retry.success, 1);
    assert_eq!(retry.skipped, 1);
    assert_eq!(
        store.indicator_rows(AssetClass::Stock, "000002").await.len(),
        1000 - 33
    );
}

#[tokio::test]
async fn malformed_history_is_counted_by_reason() {
    let store = Arc::new(MemoryStore::new());
    let mut points = history("000009", 40);
    points[12].volume = None;
    store.insert_history(AssetClass::Stock, points).await;
    let sync = job(&store, 100);

    let stats = sync.run(&options_for(day(39))).await.unwrap();

    assert_eq!(stats.invalid.get("missing_column"), Some(&1));
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.processed(), 1);
}

#[tokio::test]
async fn resumes_after_interrupted_checkpoint() {
    let store = Arc::new(MemoryStore::new());
    let codes = ["000001", "000002", "000003", "000004", "000005"];
    for code in codes {
        store.insert_history(AssetClass::Stock, history(code, 40)).await;
    }
    let workflow = workflow_name(AssetClass::Stock);
    store
        .save_checkpoint(&workflow, "000003", 3, CheckpointStatus::Interrupted)
        .await
        .unwrap();
    let sync = job(&store, 2);

    let stats = sync
        .run(&IndicatorSyncOptions {
            resume: true,
            today: Some(day(39)),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 2);
    let mut loaded: Vec<String> = store.loads().await.into_iter().map(|p| p.code).collect();
    loaded.sort();
    assert_eq!(loaded, vec!["000004".to_string(), "000005".to_string()]);

    let checkpoint = store.checkpoint(&workflow).await.unwrap();
    assert_eq!(checkpoint.status, CheckpointStatus::Completed);
    assert_eq!(checkpoint.total_processed, 2);
}

#[tokio::test]
async fn resume_without_checkpoint_processes_everything() {
    let store = Arc::new(MemoryStore::new());
    for code in ["000001", "000002", "000003"] {
        store.insert_history(AssetClass::Stock, history(code, 40)).await;
    }
    let sync = job(&store, 2);

    let stats = sync
        .run(&IndicatorSyncOptions {
            resume: true,
            today: Some(day(39)),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 3);
}

#[tokio::test]
async fn explicit_codes_limit_the_universe() {
    let store = Arc::new(MemoryStore::new());
    for code in ["000001", "000002"] {
        store.insert_history(AssetClass::Stock, history(code, 40)).await;
    }
    let sync = job(&store, 100);

    let stats = sync
        .run(&IndicatorSyncOptions {
            codes: Some(vec!["000002".to_string()]),
            today: Some(day(39)),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(stats.total, 1);
    assert!(store
        .indicator_rows(AssetClass::Stock, "000001")
        .await
        .is_empty());
}

#[tokio::test]
async fn plan_reports_watermark_window() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_history(AssetClass::Stock, history("600000", 40))
        .await;
    let sync = job(&store, 100);
    sync.run(&options_for(day(39))).await.unwrap();

    let plan = sync
        .plan_for(AssetClass::Stock, "600000", day(45))
        .await
        .unwrap();

    assert_eq!(plan.watermark, Some(day(39)));
    assert_eq!(plan.range.start, Some(day(39) - Duration::days(300)));
    assert!(!plan.is_up_to_date());
}
