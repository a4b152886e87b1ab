//! Drives a full sweep against a mock chat endpoint and checks the persisted document.

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use walk_core::config::LlmConfig;
use walk_core::document::data_file_path;
use walk_core::llm::OllamaChatClient;
use walk_core::walk::{self, WalkParams};
use walk_core::{Position, WalkDocument};

fn reply_body(content: &str) -> String {
    json!({ "message": { "role": "assistant", "content": content }, "done": true }).to_string()
}

#[tokio::test]
async fn three_step_walk_is_persisted_in_the_documented_shape() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for (step, reply) in ["RIGHT", "UP", "LEFT"].into_iter().enumerate() {
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "model": "m:v", "options": { "temperature": 0.5 } })),
                Matcher::Regex(format!("current step is {step},")),
            ]))
            .with_status(200)
            .with_body(reply_body(&format!("{reply}\n")))
            .expect(1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let llm = OllamaChatClient::new(&LlmConfig {
        endpoint: format!("{}/api/chat", server.url()),
        ..LlmConfig::default()
    })?;
    let params = WalkParams {
        grid_size: 20,
        steps: 3,
        temperatures: vec![0.5],
        rounds_per_temperature: 1,
        retries: 0,
        retry_backoff: Duration::ZERO,
    };

    let run = walk::run(&params, "m:v", &llm).await?;
    let mut doc = WalkDocument::new();
    doc.insert(run);

    let dir = tempfile::tempdir()?;
    let path = data_file_path(dir.path(), "m:v")?;
    assert!(path.ends_with("m_v.json"));
    doc.save(&path)?;

    for mock in &mocks {
        mock.assert_async().await;
    }

    let on_disk: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(
        on_disk,
        json!({"m:v": {"TEMP_0.5": {"R_0": [["RIGHT", "UP", "LEFT"], [[0, 0], [1, 0], [1, 1]]]}}})
    );

    let loaded = WalkDocument::load(&path)?;
    assert_eq!(
        loaded.paths("m:v", 0.5, 1)?,
        vec![vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)]]
    );
    assert_eq!(loaded.model("m:v")?.bucket(0.5)?.trial(0)?.decisions, ["RIGHT", "UP", "LEFT"]);
    Ok(())
}

#[tokio::test]
async fn endpoint_failure_aborts_the_sweep() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let llm = OllamaChatClient::new(&LlmConfig {
        endpoint: format!("{}/api/chat", server.url()),
        ..LlmConfig::default()
    })?;
    let params = WalkParams {
        grid_size: 20,
        steps: 2,
        temperatures: vec![0.0],
        rounds_per_temperature: 1,
        retries: 0,
        retry_backoff: Duration::ZERO,
    };

    let err = walk::run(&params, "m:v", &llm).await;
    assert!(matches!(err, Err(walk_core::WalkError::Llm { step: 0, .. })));
    Ok(())
}
