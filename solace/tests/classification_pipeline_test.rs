//! End-to-end classification pipeline tests against a mocked emotion
//! classification service.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solace::classifier::ClassifierProvider;
use solace::config::ClassifierConfig;
use solace::llm::LlmProvider;
use solace::models::{ClassificationStatus, Emotion};
use solace::services::ClassificationManager;

fn classifier_config(url: String, max_retries: u32) -> ClassifierConfig {
    ClassifierConfig {
        url,
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        max_retries,
        // Due immediately so tests can drive retries with repeated passes.
        retry_delay_secs: 0,
        max_input_chars: 500,
    }
}

#[tokio::test]
async fn successful_classification_scores_the_note() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"label": "joy", "score": 0.87654},
            {"label": "sadness", "score": 0.1},
            {"label": "anger", "score": 0.02}
        ]])))
        .mount(&server)
        .await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    let note = common::insert_pending_note(&db, &user_id, "what a day!").await;

    let config = classifier_config(server.uri(), 3);
    let manager = ClassificationManager::new(
        db.clone(),
        ClassifierProvider::new(Some(&config)),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );

    assert_eq!(manager.run_once().await.unwrap(), 1);

    let scored = db.get_note_by_id(&note.id).await.unwrap().expect("note");
    assert_eq!(scored.classification, ClassificationStatus::Scored);
    let emotions = scored.emotions.expect("emotions populated");
    // rounded to 3 decimals
    assert_eq!(emotions.joy, 0.877);
    assert_eq!(emotions.sadness, 0.1);
    // labels not returned by the service default to zero
    assert_eq!(emotions.fear, 0.0);
    assert_eq!(emotions.dominant().0, Emotion::Joy);
    for emotion in Emotion::ALL {
        let score = emotions.get(emotion);
        assert!((0.0..=1.0).contains(&score));
    }
}

#[tokio::test]
async fn warming_up_model_retries_then_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": "Model is currently loading"})),
        )
        .mount(&server)
        .await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    let note = common::insert_pending_note(&db, &user_id, "hello").await;

    let config = classifier_config(server.uri(), 2);
    let manager = ClassificationManager::new(
        db.clone(),
        ClassifierProvider::new(Some(&config)),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );

    // Two transient passes re-queue the note without settling it.
    assert_eq!(manager.run_once().await.unwrap(), 0);
    let pending = db.get_note_by_id(&note.id).await.unwrap().expect("note");
    assert_eq!(pending.classification, ClassificationStatus::Pending);
    assert_eq!(pending.classify_attempts, 1);
    assert!(pending.emotions.is_none());

    assert_eq!(manager.run_once().await.unwrap(), 0);

    // Third transient failure exhausts the retry budget: neutral fallback.
    assert_eq!(manager.run_once().await.unwrap(), 1);
    let settled = db.get_note_by_id(&note.id).await.unwrap().expect("note");
    assert_eq!(settled.classification, ClassificationStatus::Fallback);
    let emotions = settled.emotions.expect("emotions populated");
    assert_eq!(emotions.neutral, 1.0);
    assert_eq!(emotions.joy, 0.0);
}

#[tokio::test]
async fn permanent_failure_falls_back_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "Input validation failed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    let note = common::insert_pending_note(&db, &user_id, "hello").await;

    let config = classifier_config(server.uri(), 3);
    let manager = ClassificationManager::new(
        db.clone(),
        ClassifierProvider::new(Some(&config)),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );

    assert_eq!(manager.run_once().await.unwrap(), 1);

    let settled = db.get_note_by_id(&note.id).await.unwrap().expect("note");
    assert_eq!(settled.classification, ClassificationStatus::Fallback);
    assert_eq!(settled.emotions.expect("emotions").neutral, 1.0);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    let note = common::insert_pending_note(&db, &user_id, "hello").await;

    let config = classifier_config(server.uri(), 3);
    let manager = ClassificationManager::new(
        db.clone(),
        ClassifierProvider::new(Some(&config)),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );

    assert_eq!(manager.run_once().await.unwrap(), 0);
    let pending = db.get_note_by_id(&note.id).await.unwrap().expect("note");
    assert_eq!(pending.classification, ClassificationStatus::Pending);
    assert_eq!(pending.classify_attempts, 1);
}

#[tokio::test]
async fn edited_note_is_reclassified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"label": "sadness", "score": 0.8}
        ]])))
        .mount(&server)
        .await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    let note = common::insert_scored_note(&db, &user_id, "original", common::joyful()).await;

    // Editing the content discards the old scores and re-enters the queue.
    db.update_note_content(&note.id, "edited content")
        .await
        .unwrap();
    let edited = db.get_note_by_id(&note.id).await.unwrap().expect("note");
    assert_eq!(edited.classification, ClassificationStatus::Pending);
    assert!(edited.emotions.is_none());

    let config = classifier_config(server.uri(), 3);
    let manager = ClassificationManager::new(
        db.clone(),
        ClassifierProvider::new(Some(&config)),
        LlmProvider::unavailable("test"),
        &common::pipeline_config(),
    );
    assert_eq!(manager.run_once().await.unwrap(), 1);

    let rescored = db.get_note_by_id(&note.id).await.unwrap().expect("note");
    assert_eq!(rescored.classification, ClassificationStatus::Scored);
    assert_eq!(rescored.emotions.expect("emotions").dominant().0, Emotion::Sadness);
}
