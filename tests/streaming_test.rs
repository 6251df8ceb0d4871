mod common;
mod helpers;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reflecto::adapters::providers::FixedTimeProvider;
use reflecto::adapters::sqlite::SqliteSessionRepository;
use reflecto::adapters::stores::InMemoryActionStore;
use reflecto::domain::models::StreamingConfig;
use reflecto::services::{LiveEmitter, StreamRegistry, StreamingService};
use serde_json::json;
use tokio::sync::broadcast;

use helpers::database::{setup_test_db, teardown_test_db};

const INSTANT: &str = "2026-02-08T19:30:00Z";

#[tokio::test]
async fn test_live_session_streams_until_done_then_replays_identically() {
    let pool = setup_test_db().await;
    let sessions = Arc::new(common::session_service(&pool, INSTANT, "l"));
    let registry = Arc::new(StreamRegistry::new(Duration::from_secs(60)));
    let streaming = StreamingService::new(
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        Arc::clone(&registry),
    );

    let session_id = sessions.start_session("u1").await.unwrap();
    let (shutdown_tx, _) = broadcast::channel(1);

    let emitter = LiveEmitter::new(
        Arc::clone(&sessions),
        Arc::new(InMemoryActionStore::new()),
        Arc::clone(&registry),
        Arc::new(FixedTimeProvider::parse(INSTANT).unwrap()),
        StreamingConfig::default(),
    );
    let frames = streaming.stream(&session_id, shutdown_tx.subscribe());

    let id = session_id.clone();
    let emitter_rx = shutdown_tx.subscribe();
    let emission = tokio::spawn(async move { emitter.run(&id, emitter_rx, Some(4)).await });

    let live: Vec<String> = tokio::time::timeout(
        Duration::from_secs(10),
        frames.map(|f| f.expect("frame")).collect::<Vec<_>>(),
    )
    .await
    .expect("stream should finish at done");

    assert_eq!(emission.await.unwrap().unwrap(), 4);
    assert_eq!(live.len(), 5);
    assert!(live[0].starts_with("event: heartbeat\ndata: {\"ts\": "));
    assert!(live[1].starts_with("event: presence\n"));
    assert!(live[1].contains("\"state\": \"AWAKE\""));
    assert!(live[2].starts_with("event: skills\n"));
    assert_eq!(
        live[3],
        format!("event: time_of_day\ndata: {}\n\n", "{\"time_of_day\": \"evening\"}")
    );
    assert_eq!(
        live[4],
        format!("event: done\ndata: {{ \"session_id\": \"{session_id}\" }}\n\n")
    );

    let replayed = streaming.replay_frames(&session_id).await.unwrap();
    assert_eq!(replayed, live);
    assert!(sessions.verify_event_chain(&session_id).await.unwrap().valid);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_completed_session_stream_is_pure_replay() {
    let pool = setup_test_db().await;
    let sessions = common::session_service(&pool, "2026-02-08T12:00:00Z", "c");
    let created = sessions
        .create_session("u1", &common::request("2026-02-08", json!({"energy": 7})))
        .await
        .unwrap();

    let registry = Arc::new(StreamRegistry::new(Duration::from_secs(60)));
    let streaming = StreamingService::new(
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        Arc::clone(&registry),
    );
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let frames: Vec<String> = streaming
        .stream(&created.session_id, shutdown_rx)
        .map(|f| f.unwrap())
        .collect()
        .await;

    let kinds: Vec<&str> = frames
        .iter()
        .map(|f| f.lines().next().unwrap_or_default())
        .collect();
    assert_eq!(
        kinds,
        [
            "event: avatar",
            "event: questions",
            "event: response_chunk",
            "event: presence",
            "event: closing",
            "event: done",
        ]
    );
    assert!(registry.is_empty(), "done releases the registry entry");

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_shutdown_ends_an_open_stream() {
    let pool = setup_test_db().await;
    let sessions = common::session_service(&pool, INSTANT, "o");
    let session_id = sessions.start_session("u1").await.unwrap();

    let streaming = StreamingService::new(
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        Arc::new(StreamRegistry::new(Duration::from_secs(60))),
    );
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let reader = tokio::spawn(streaming.stream(&session_id, shutdown_rx).collect::<Vec<_>>());

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(()).unwrap();

    let frames = tokio::time::timeout(Duration::from_secs(5), reader)
        .await
        .expect("stream should stop on shutdown")
        .unwrap();
    assert!(frames.is_empty());

    teardown_test_db(pool).await;
}
