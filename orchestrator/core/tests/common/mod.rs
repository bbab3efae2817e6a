// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! In-memory Git and LLM providers for driving the pipeline without network
//! access.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use repograph_core::application::{DiagramGenerationService, GenerationSettings};
use repograph_core::domain::git::{GitError, GitProvider, GitProviderFactory};
use repograph_core::domain::llm::{
    CompletionRequest, LLMError, LLMProvider, LLMProviderFactory, TextStream,
};
use repograph_core::infrastructure::cache::RepositoryCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const FILE_TREE: &str = "src/main.py\nsrc/utils/helpers.py\nREADME.md";
pub const README: &str = "# Hello World\nMy first repository on GitHub!";

pub struct StubGitProvider {
    pub fetches: AtomicUsize,
}

#[async_trait]
impl GitProvider for StubGitProvider {
    fn platform(&self) -> &'static str {
        "github"
    }

    async fn check_repository_exists(&self, _: &str, _: &str) -> Result<bool, GitError> {
        Ok(true)
    }

    async fn get_default_branch(&self, _: &str, _: &str) -> Result<Option<String>, GitError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Some("master".to_string()))
    }

    async fn get_file_tree(&self, _: &str, _: &str) -> Result<String, GitError> {
        Ok(FILE_TREE.to_string())
    }

    async fn get_readme(&self, _: &str, _: &str) -> Result<String, GitError> {
        Ok(README.to_string())
    }

    fn get_file_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String {
        format!("https://github.com/{owner}/{repo}/blob/{branch}/{path}")
    }

    fn get_directory_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String {
        format!("https://github.com/{owner}/{repo}/tree/{branch}/{path}")
    }
}

/// Hands out one shared stub provider; counts how often it was asked.
pub struct StubGitFactory {
    pub provider: Arc<StubGitProvider>,
    pub creates: AtomicUsize,
}

impl StubGitFactory {
    pub fn new() -> Self {
        Self {
            provider: Arc::new(StubGitProvider {
                fetches: AtomicUsize::new(0),
            }),
            creates: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.provider.fetches.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

impl GitProviderFactory for StubGitFactory {
    fn create(
        &self,
        platform: &str,
        _token: Option<&str>,
        _base_url: Option<&str>,
    ) -> Result<Arc<dyn GitProvider>, GitError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        match platform {
            "github" => Ok(self.provider.clone()),
            other => Err(GitError::UnsupportedPlatform(format!(
                "Unsupported platform: {other}"
            ))),
        }
    }
}

/// How one scripted phase behaves.
#[derive(Clone)]
pub enum Phase {
    Chunks(Vec<&'static str>),
    /// Emit the chunks, then fail with an upstream status error.
    FailAfter(Vec<&'static str>),
    /// Never produce anything.
    Hang,
}

/// Replays one scripted phase per streaming call, in order.
pub struct ScriptedLLM {
    platform: String,
    model: String,
    token_count: usize,
    phases: Vec<Phase>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLLM {
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLLM {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LLMError> {
        Err(LLMError::Provider("blocking completion not scripted".into()))
    }

    fn complete_stream(&self, request: CompletionRequest) -> TextStream {
        let index = {
            let mut calls = self.calls.lock();
            calls.push(request);
            calls.len() - 1
        };

        let chunks = |chunks: Vec<&'static str>| chunks.into_iter().map(|c| Ok(c.to_string()));
        match self.phases.get(index).cloned() {
            Some(Phase::Chunks(items)) => text_stream(chunks(items).collect()),
            Some(Phase::FailAfter(items)) => text_stream(
                chunks(items)
                    .chain(std::iter::once(Err(LLMError::Status {
                        provider: "Stub".into(),
                        status: 500,
                        body: "internal error".into(),
                    })))
                    .collect(),
            ),
            Some(Phase::Hang) => Box::pin(stream::pending::<Result<String, LLMError>>()),
            None => text_stream(Vec::new()),
        }
    }

    async fn count_tokens(&self, _text: &str) -> Result<usize, LLMError> {
        Ok(self.token_count)
    }
}

fn text_stream(items: Vec<Result<String, LLMError>>) -> TextStream {
    Box::pin(stream::iter(items))
}

/// Builds one ScriptedLLM per `create` call, keeping the last one.
pub struct ScriptedLLMFactory {
    pub token_count: usize,
    pub phases: Vec<Phase>,
    pub last: Mutex<Option<Arc<ScriptedLLM>>>,
}

impl ScriptedLLMFactory {
    pub fn new(token_count: usize, phases: Vec<Phase>) -> Self {
        Self {
            token_count,
            phases,
            last: Mutex::new(None),
        }
    }

    pub fn last_requests(&self) -> Vec<CompletionRequest> {
        self.last
            .lock()
            .as_ref()
            .map(|llm| llm.requests())
            .unwrap_or_default()
    }
}

impl LLMProviderFactory for ScriptedLLMFactory {
    fn create(&self, platform: &str, model: &str) -> Result<Arc<dyn LLMProvider>, LLMError> {
        if !["openai", "claude", "deepseek"].contains(&platform) {
            return Err(LLMError::UnsupportedPlatform(platform.to_string()));
        }
        let llm = Arc::new(ScriptedLLM {
            platform: platform.to_string(),
            model: model.to_string(),
            token_count: self.token_count,
            phases: self.phases.clone(),
            calls: Mutex::new(Vec::new()),
        });
        *self.last.lock() = Some(llm.clone());
        Ok(llm)
    }
}

pub fn happy_phases() -> Vec<Phase> {
    vec![
        Phase::Chunks(vec![
            "<explanation>A small Python ",
            "project with a main module.</explanation>",
        ]),
        Phase::Chunks(vec![
            "<component_mapping>\n1. Main: src/main.py\n",
            "2. Utils: src/utils\n</component_mapping>",
        ]),
        Phase::Chunks(vec![
            "```mermaid\nflowchart TD\n  Main --> Utils\n",
            "  click Main \"src/main.py\"\n  click Utils \"src/utils\"\n```",
        ]),
    ]
}

pub fn settings() -> GenerationSettings {
    GenerationSettings {
        phase_timeout: Duration::from_secs(5),
        ..GenerationSettings::default()
    }
}

pub fn service(
    git: Arc<StubGitFactory>,
    llm: Arc<ScriptedLLMFactory>,
    settings: GenerationSettings,
) -> DiagramGenerationService {
    DiagramGenerationService::new(git, llm, Arc::new(RepositoryCache::new(8)), settings)
}
