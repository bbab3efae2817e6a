// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Diagram Generation Pipeline Tests
//!
//! Drives `DiagramGenerationService::generate` end to end against scripted
//! providers:
//! - event ordering and the terminal `complete` payload
//! - semantic veto in the explanation and diagram phases
//! - validation failures that never touch the network
//! - the free-tier and context-window token budget gate
//! - upstream failures and per-phase timeouts
//! - repository cache reuse across runs

mod common;

use common::{happy_phases, service, settings, Phase, ScriptedLLMFactory, StubGitFactory};
use futures::StreamExt;
use repograph_core::application::GenerationSettings;
use repograph_core::domain::events::PipelineEvent;
use repograph_core::domain::generation::GenerationRequest;
use std::sync::Arc;
use std::time::Duration;

fn hello_world() -> GenerationRequest {
    GenerationRequest::new("github", "octocat", "Hello-World")
}

async fn run(
    git: &Arc<StubGitFactory>,
    llm: &Arc<ScriptedLLMFactory>,
    settings: GenerationSettings,
    request: GenerationRequest,
) -> Vec<PipelineEvent> {
    service(git.clone(), llm.clone(), settings)
        .generate(request)
        .collect()
        .await
}

fn statuses(events: &[PipelineEvent]) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for event in events {
        // collapse runs of chunk events
        if out.last() != Some(&event.status()) || !event.status().ends_with("_chunk") {
            out.push(event.status());
        }
    }
    out
}

fn error_message(event: &PipelineEvent) -> &str {
    match event {
        PipelineEvent::Error { error } => error,
        other => panic!("expected error event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hello_world_emits_ordered_events_and_complete() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, happy_phases()));

    let events = run(&git, &llm, settings(), hello_world()).await;

    assert_eq!(
        statuses(&events),
        vec![
            "started",
            "explanation_sent",
            "explanation",
            "explanation_chunk",
            "mapping_sent",
            "mapping",
            "mapping_chunk",
            "diagram_sent",
            "diagram",
            "diagram_chunk",
            "complete",
        ]
    );

    match &events[0] {
        PipelineEvent::Started { message } => {
            assert_eq!(message, "Starting generation process with openai (o3-mini)...")
        }
        other => panic!("unexpected first event {other:?}"),
    }

    let Some(PipelineEvent::Complete {
        diagram,
        explanation,
        mapping,
        ai_platform,
        ai_model,
    }) = events.last()
    else {
        panic!("stream did not end with complete");
    };

    assert_eq!(ai_platform, "openai");
    assert_eq!(ai_model, "o3-mini");
    assert!(explanation.contains("A small Python project"));
    assert_eq!(mapping, "\n1. Main: src/main.py\n2. Utils: src/utils\n");
    assert!(!diagram.contains("```"));
    assert!(diagram
        .contains("click Main \"https://github.com/octocat/Hello-World/blob/master/src/main.py\""));
    assert!(diagram
        .contains("click Utils \"https://github.com/octocat/Hello-World/tree/master/src/utils\""));
}

#[tokio::test]
async fn test_phases_receive_previous_outputs() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, happy_phases()));

    let mut request = hello_world();
    request.api_key = Some("sk-caller".into());
    run(&git, &llm, settings(), request).await;

    let requests = llm.last_requests();
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.api_key.as_deref() == Some("sk-caller")));

    let explanation_input = requests[0].input.render();
    assert!(explanation_input.contains("src/utils/helpers.py"));
    assert!(explanation_input.contains("My first repository on GitHub!"));

    assert!(requests[1]
        .input
        .render()
        .contains("A small Python project with a main module."));
    assert!(requests[2].input.render().contains("1. Main: src/main.py"));
}

#[tokio::test]
async fn test_blank_caller_key_uses_configured_key() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, happy_phases()));

    let mut request = hello_world();
    request.api_key = Some(String::new());
    let events = run(&git, &llm, settings(), request).await;

    assert_eq!(events.last().map(PipelineEvent::status), Some("complete"));
    let requests = llm.last_requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.api_key.is_none()));
}

#[tokio::test]
async fn test_bad_instructions_in_diagram_phase_vetoes_run() {
    let git = Arc::new(StubGitFactory::new());
    let mut phases = happy_phases();
    phases[2] = Phase::Chunks(vec!["BAD_", "INSTRUCTIONS"]);
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, phases));

    let mut request = hello_world();
    request.instructions = "make it purple and sing".into();
    let events = run(&git, &llm, settings(), request).await;

    let last = events.last().expect("at least one event");
    assert_eq!(
        error_message(last),
        "The instructions provided are invalid or ambiguous"
    );
    assert!(events.iter().all(|e| e.status() != "complete"));
    assert_eq!(events.iter().filter(|e| e.status() == "error").count(), 1);
}

#[tokio::test]
async fn test_bad_instructions_in_explanation_stops_before_mapping() {
    let git = Arc::new(StubGitFactory::new());
    let mut phases = happy_phases();
    phases[0] = Phase::Chunks(vec!["BAD_INSTRUCTIONS"]);
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, phases));

    let mut request = hello_world();
    request.instructions = "???".into();
    let events = run(&git, &llm, settings(), request).await;

    assert_eq!(
        statuses(&events),
        vec![
            "started",
            "explanation_sent",
            "explanation",
            "explanation_chunk",
            "error"
        ]
    );
    assert_eq!(llm.last_requests().len(), 1);
}

#[tokio::test]
async fn test_oversized_instructions_yield_single_error() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, happy_phases()));

    let mut request = hello_world();
    request.instructions = "x".repeat(1001);
    let events = run(&git, &llm, settings(), request).await;

    assert_eq!(events.len(), 1);
    assert_eq!(
        error_message(&events[0]),
        "Instructions exceed maximum length of 1000 characters"
    );
    assert_eq!(git.creates(), 0);
}

#[tokio::test]
async fn test_protected_repository_is_rejected_without_network() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, happy_phases()));

    let events = run(
        &git,
        &llm,
        settings(),
        GenerationRequest::new("github", "tiangolo", "fastapi"),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert_eq!(error_message(&events[0]), "Example repos cannot be regenerated");
    assert_eq!(git.creates(), 0);
    assert_eq!(git.fetches(), 0);
}

#[tokio::test]
async fn test_unsupported_git_platform() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, happy_phases()));

    let events = run(
        &git,
        &llm,
        settings(),
        GenerationRequest::new("bitbucket", "octocat", "Hello-World"),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert!(error_message(&events[0]).contains("Unsupported platform"));
}

#[tokio::test]
async fn test_free_tier_limit_without_caller_key() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(50_001, happy_phases()));

    let events = run(&git, &llm, settings(), hello_world()).await;

    assert_eq!(statuses(&events), vec!["started", "error"]);
    assert!(error_message(&events[1]).contains("too large for free tier"));
    assert!(llm.last_requests().is_empty());
}

#[tokio::test]
async fn test_free_tier_limit_is_inclusive() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(50_000, happy_phases()));

    let events = run(&git, &llm, settings(), hello_world()).await;

    assert_eq!(events.last().map(PipelineEvent::status), Some("complete"));
}

#[tokio::test]
async fn test_caller_key_lifts_free_tier_limit() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(50_001, happy_phases()));

    let mut request = hello_world();
    request.api_key = Some("sk-caller".into());
    let events = run(&git, &llm, settings(), request).await;

    assert_eq!(events.last().map(PipelineEvent::status), Some("complete"));
}

#[tokio::test]
async fn test_context_ceiling_applies_even_with_caller_key() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(195_000, happy_phases()));

    let mut request = hello_world();
    request.api_key = Some("sk-caller".into());
    let events = run(&git, &llm, settings(), request).await;

    assert_eq!(statuses(&events), vec!["started", "error"]);
    assert!(error_message(&events[1]).contains("exceeds model context"));
}

#[tokio::test]
async fn test_context_ceiling_follows_selected_model() {
    let git = Arc::new(StubGitFactory::new());
    // below the o3-mini ceiling, above deepseek-chat's
    let llm = Arc::new(ScriptedLLMFactory::new(150_000, happy_phases()));

    let mut request = hello_world();
    request.api_key = Some("sk-caller".into());
    request.ai_platform = Some("deepseek".into());
    let events = run(&git, &llm, settings(), request).await;

    let last = events.last().expect("at least one event");
    assert!(error_message(last).contains("deepseek deepseek-chat"));
}

#[tokio::test]
async fn test_upstream_failure_mid_stream_ends_with_error() {
    let git = Arc::new(StubGitFactory::new());
    let mut phases = happy_phases();
    phases[1] = Phase::FailAfter(vec!["<component_mapping>\n1. Main"]);
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, phases));

    let events = run(&git, &llm, settings(), hello_world()).await;

    assert_eq!(
        &statuses(&events)[4..],
        &["mapping_sent", "mapping", "mapping_chunk", "error"]
    );
    assert!(error_message(events.last().unwrap()).contains("500"));
}

#[tokio::test]
async fn test_stalled_phase_times_out() {
    let git = Arc::new(StubGitFactory::new());
    let mut phases = happy_phases();
    phases[0] = Phase::Hang;
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, phases));

    let short = GenerationSettings {
        phase_timeout: Duration::from_millis(50),
        ..settings()
    };
    let events = run(&git, &llm, short, hello_world()).await;

    let last = events.last().expect("at least one event");
    assert!(error_message(last).contains("explaining phase did not finish"));
}

#[tokio::test]
async fn test_repository_data_is_cached_across_runs() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, happy_phases()));
    let service = service(git.clone(), llm.clone(), settings());

    for _ in 0..2 {
        let events: Vec<_> = service.generate(hello_world()).collect().await;
        assert_eq!(events.last().map(PipelineEvent::status), Some("complete"));
    }

    assert_eq!(git.fetches(), 1);
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_cost_estimate_uses_token_counts_and_pricing() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(50_000, vec![]));
    let service = service(git, llm, settings());

    // (2 * 50_000 + 50_000 + 3000) * 1.1e-6 + 8000 * 4.4e-6 = 0.2035
    let cost = service.estimate_cost(&hello_world()).await.unwrap();
    assert_eq!(cost, "$0.20 USD");
}

#[tokio::test]
async fn test_cost_estimate_reports_platform_errors() {
    let git = Arc::new(StubGitFactory::new());
    let llm = Arc::new(ScriptedLLMFactory::new(1_000, vec![]));
    let service = service(git, llm, settings());

    let err = service
        .estimate_cost(&GenerationRequest::new("svn", "octocat", "Hello-World"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "unsupported_platform");
}
