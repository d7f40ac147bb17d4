//! Cross-cutting pipeline properties: terminal classification state,
//! ownership cascade, and job/advice bookkeeping.

mod common;

use solace::classifier::ClassifierProvider;
use solace::llm::LlmProvider;
use solace::models::{Advice, AdviceJob, ClassificationStatus, Emotion};
use solace::services::{ClassificationManager, MemoryService};

#[tokio::test]
async fn every_note_reaches_a_terminal_scored_state() {
    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;

    for i in 0..5 {
        common::insert_pending_note(&db, &user_id, &format!("entry {i}")).await;
    }

    // No classifier configured: everything settles to the fallback.
    let manager = ClassificationManager::new(
        db.clone(),
        ClassifierProvider::new(None),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );
    assert_eq!(manager.run_once().await.unwrap(), 5);

    let (notes, total) = db.list_notes(&user_id, 100, 0).await.unwrap();
    assert_eq!(total, 5);
    for note in notes {
        assert_ne!(note.classification, ClassificationStatus::Pending);
        let emotions = note.emotions.expect("all seven fields populated");
        for emotion in Emotion::ALL {
            let score = emotions.get(emotion);
            assert!((0.0..=1.0).contains(&score), "{emotion} out of range");
        }
    }
}

#[tokio::test]
async fn deleting_a_user_cascades_to_everything_they_own() {
    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;

    for i in 0..3 {
        common::insert_scored_note(&db, &user_id, &format!("note {i}"), common::joyful()).await;
    }

    let memory_service = MemoryService::new(
        db.clone(),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );
    memory_service
        .create_memory(&user_id)
        .await
        .unwrap()
        .expect("memory");

    let advice = Advice::new(
        nanoid::nanoid!(),
        user_id.clone(),
        "Rest more".to_string(),
        1,
        3,
        Emotion::Joy,
    );
    db.create_advice(&advice).await.unwrap();

    let job = AdviceJob::new(user_id.clone());
    db.create_advice_job(&job).await.unwrap();

    assert!(db.delete_user(&user_id).await.unwrap());

    assert!(db.get_user_by_id(&user_id).await.unwrap().is_none());
    let (notes, _) = db.list_notes(&user_id, 100, 0).await.unwrap();
    assert!(notes.is_empty());
    assert!(db.latest_memory(&user_id).await.unwrap().is_none());
    assert!(db.latest_advice(&user_id).await.unwrap().is_none());
    assert!(db.get_advice_job(&job.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_missing_user_reports_false() {
    let db = common::setup_db().await;
    assert!(!db.delete_user("no-such-user").await.unwrap());
}

#[tokio::test]
async fn memory_and_advice_counters_track_independently() {
    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;

    for i in 0..3 {
        common::insert_scored_note(&db, &user_id, &format!("note {i}"), common::joyful()).await;
    }

    // Closing a memory batch consumes the memory counter but not the
    // advice counter: both windows are computed over the same note stream
    // from different anchors.
    let memory_service = MemoryService::new(
        db.clone(),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );
    memory_service
        .create_memory(&user_id)
        .await
        .unwrap()
        .expect("memory");

    assert!(!memory_service.should_create_memory(&user_id).await.unwrap());

    let gate = solace::services::EligibilityGate::new(db.clone(), &common::pipeline_config());
    assert!(gate.is_eligible(&user_id).await);
}
