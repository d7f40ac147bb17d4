//! End-to-end advice generation tests against a mocked OpenAI-compatible
//! generation service.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solace::config::LlmConfig;
use solace::llm::LlmProvider;
use solace::models::{AdviceJob, Emotion, JobStatus};
use solace::services::{AdviceJobManager, AdviceService, EligibilityGate, UserLocks};

fn llm_config(base_url: String) -> LlmConfig {
    LlmConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        timeout_secs: 5,
        max_retries: 0,
        temperature: 0.7,
        max_tokens: 200,
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop",
                "logprobs": null
            }
        ],
        "usage": {"prompt_tokens": 50, "completion_tokens": 20, "total_tokens": 70}
    })
}

async fn mock_completions(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn generate_closes_batch_and_persists_advice() {
    let server = MockServer::start().await;
    mock_completions(&server, "Take a short walk before lunch today.").await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    for content in ["got the job!", "celebrated with friends", "still smiling"] {
        common::insert_scored_note(&db, &user_id, content, common::joyful()).await;
    }

    let llm = LlmProvider::new(Some(&llm_config(server.uri())));
    let service = AdviceService::new(
        db.clone(),
        llm,
        &common::pipeline_config(),
        UserLocks::new(),
    );

    let advice = service.generate(&user_id).await.expect("advice generated");

    assert_eq!(advice.content, "Take a short walk before lunch today.");
    assert_eq!(advice.dominant_emotion, Emotion::Joy);
    // The full batch closed into a memory before context assembly.
    assert_eq!(advice.memories_used, 1);
    assert_eq!(advice.notes_used, 3);

    let memory = db
        .latest_memory(&user_id)
        .await
        .unwrap()
        .expect("memory created during the run");
    assert_eq!(memory.batch_size, 3);
    assert_eq!(memory.dominant_emotion, Emotion::Joy);

    let latest = db
        .latest_advice(&user_id)
        .await
        .unwrap()
        .expect("advice persisted");
    assert_eq!(latest.id, advice.id);
}

#[tokio::test]
async fn eligibility_resets_after_advice() {
    let server = MockServer::start().await;
    mock_completions(&server, "Be kind to yourself.").await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    let gate = EligibilityGate::new(db.clone(), &common::pipeline_config());

    // 0 notes: not eligible.
    assert!(!gate.is_eligible(&user_id).await);

    // 3 notes, no prior advice: eligible.
    for i in 0..3 {
        common::insert_scored_note(&db, &user_id, &format!("note {i}"), common::joyful()).await;
    }
    assert!(gate.is_eligible(&user_id).await);

    // Repeated reads with no writes in between agree.
    assert!(gate.is_eligible(&user_id).await);

    let llm = LlmProvider::new(Some(&llm_config(server.uri())));
    let service = AdviceService::new(
        db.clone(),
        llm,
        &common::pipeline_config(),
        UserLocks::new(),
    );
    service.generate(&user_id).await.expect("advice generated");

    // 0 notes since the advice: not eligible again.
    assert!(!gate.is_eligible(&user_id).await);

    // 2 notes since: still below threshold.
    for i in 0..2 {
        common::insert_scored_note(&db, &user_id, &format!("later {i}"), common::joyful()).await;
    }
    assert!(!gate.is_eligible(&user_id).await);

    // Third note since the advice tips it over.
    common::insert_scored_note(&db, &user_id, "third", common::joyful()).await;
    assert!(gate.is_eligible(&user_id).await);
}

#[tokio::test]
async fn job_lifecycle_succeeds_with_persisted_advice() {
    let server = MockServer::start().await;
    mock_completions(&server, "Write down one thing you are grateful for.").await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    for i in 0..3 {
        common::insert_scored_note(&db, &user_id, &format!("note {i}"), common::joyful()).await;
    }

    let job = AdviceJob::new(user_id.clone());
    db.create_advice_job(&job).await.unwrap();

    let llm = LlmProvider::new(Some(&llm_config(server.uri())));
    let service = AdviceService::new(
        db.clone(),
        llm,
        &common::pipeline_config(),
        UserLocks::new(),
    );
    let manager = AdviceJobManager::new(db.clone(), service, &common::pipeline_config());

    assert_eq!(manager.run_once().await.unwrap(), 1);

    let finished = db.get_advice_job(&job.id).await.unwrap().expect("job");
    assert_eq!(finished.status, JobStatus::Succeeded);
    let advice_id = finished.advice_id.expect("advice id recorded");
    assert!(finished.error.is_none());

    let (advice, total) = db.list_advice(&user_id, 10, 0).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(advice[0].id, advice_id);
}

#[tokio::test]
async fn upstream_failure_fails_job_without_partial_advice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "model overloaded",
                "type": "invalid_request_error",
                "param": null,
                "code": null
            }
        })))
        .mount(&server)
        .await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    for i in 0..3 {
        common::insert_scored_note(&db, &user_id, &format!("note {i}"), common::joyful()).await;
    }

    let job = AdviceJob::new(user_id.clone());
    db.create_advice_job(&job).await.unwrap();

    let llm = LlmProvider::new(Some(&llm_config(server.uri())));
    let service = AdviceService::new(
        db.clone(),
        llm,
        &common::pipeline_config(),
        UserLocks::new(),
    );
    let manager = AdviceJobManager::new(db.clone(), service, &common::pipeline_config());

    assert_eq!(manager.run_once().await.unwrap(), 1);

    let finished = db.get_advice_job(&job.id).await.unwrap().expect("job");
    assert_eq!(finished.status, JobStatus::Failed);
    assert!(finished.error.is_some());
    assert!(finished.advice_id.is_none());

    let (advice, total) = db.list_advice(&user_id, 10, 0).await.unwrap();
    assert!(advice.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn empty_completion_content_is_an_error() {
    let server = MockServer::start().await;
    mock_completions(&server, "   ").await;

    let db = common::setup_db().await;
    let user_id = common::create_user(&db, "sub-1").await;
    for i in 0..3 {
        common::insert_scored_note(&db, &user_id, &format!("note {i}"), common::joyful()).await;
    }

    let llm = LlmProvider::new(Some(&llm_config(server.uri())));
    let service = AdviceService::new(
        db.clone(),
        llm,
        &common::pipeline_config(),
        UserLocks::new(),
    );

    let result = service.generate(&user_id).await;
    assert!(result.is_err());

    let (advice, _) = db.list_advice(&user_id, 10, 0).await.unwrap();
    assert!(advice.is_empty());
}
