// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Diagram Generation Service
//
// Runs the staged pipeline for one request:
// validate -> fetch repository data -> token budget gate -> explanation ->
// component mapping -> diagram -> click-directive post-processing.
//
// Each run is exposed as a lazy stream of PipelineEvents. Any failure ends
// the stream with exactly one `error` event; nothing is retried.

use crate::application::cost::{estimate_usd, format_usd};
use crate::application::prompts;
use crate::domain::catalog;
use crate::domain::config::ServiceConfig;
use crate::domain::diagram::{extract_component_mapping, process_click_events, strip_code_fences};
use crate::domain::events::PipelineEvent;
use crate::domain::generation::{
    GenerationError, GenerationRequest, PipelineStage, BAD_INSTRUCTIONS_SENTINEL,
};
use crate::domain::git::{GitProvider, GitProviderFactory};
use crate::domain::llm::{
    CompletionRequest, LLMProvider, LLMProviderFactory, PromptInput, ReasoningEffort, TextStream,
};
use crate::domain::repository::RepositoryData;
use crate::infrastructure::cache::RepositoryCache;
use crate::infrastructure::git::DefaultGitProviderFactory;
use crate::infrastructure::llm::DefaultLLMProviderFactory;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub type EventStream = Pin<Box<dyn Stream<Item = PipelineEvent> + Send>>;

type PhaseStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// Run-independent knobs resolved from configuration.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub default_platform: String,
    pub default_model: String,
    pub default_effort: ReasoningEffort,
    pub phase_timeout: Duration,
    pub free_tier_token_limit: usize,
}

impl GenerationSettings {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            default_platform: config.defaults.ai_platform.clone(),
            default_model: config.defaults.ai_model.clone(),
            default_effort: config.defaults.reasoning_effort,
            phase_timeout: Duration::from_secs(config.generation.phase_timeout_secs),
            free_tier_token_limit: config.generation.free_tier_token_limit,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Items of the inner run: stage transitions are reported to the outer
/// driver for logging and failure attribution, events go to the caller.
enum Step {
    Stage(PipelineStage),
    Event(PipelineEvent),
}

/// Admission-control gate over the combined file tree + README token count.
pub fn check_token_budget(
    count: usize,
    ceiling: usize,
    free_tier_limit: usize,
    has_caller_key: bool,
    platform: &str,
    model: &str,
) -> Result<(), GenerationError> {
    if count >= ceiling {
        return Err(GenerationError::QuotaExceeded(format!(
            "Repository exceeds model context: {platform} {model} accepts at most {ceiling} tokens, \
             current size is {count} tokens."
        )));
    }
    if count > free_tier_limit && !has_caller_key {
        return Err(GenerationError::QuotaExceeded(format!(
            "Repository too large for free tier: the file tree and README together exceed \
             {free_tier_limit} tokens (current size: {count} tokens). Provide your own \
             {platform} API key to continue."
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DiagramGenerationService {
    git_providers: Arc<dyn GitProviderFactory>,
    llm_providers: Arc<dyn LLMProviderFactory>,
    cache: Arc<RepositoryCache>,
    settings: GenerationSettings,
}

impl DiagramGenerationService {
    pub fn new(
        git_providers: Arc<dyn GitProviderFactory>,
        llm_providers: Arc<dyn LLMProviderFactory>,
        cache: Arc<RepositoryCache>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            git_providers,
            llm_providers,
            cache,
            settings,
        }
    }

    /// Wire the default provider factories and a cache sized from `config`.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            Arc::new(DefaultGitProviderFactory::new(config.git.clone())),
            Arc::new(DefaultLLMProviderFactory::new(config.llm.clone())),
            Arc::new(RepositoryCache::new(config.cache.capacity)),
            GenerationSettings::from_config(config),
        )
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<RepositoryCache> {
        &self.cache
    }

    /// Platform and model for a request, falling back to process defaults.
    /// A platform override without a model uses that platform's default model.
    pub fn resolve_ai_choice(&self, request: &GenerationRequest) -> (String, String) {
        let platform = request
            .ai_platform
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.settings.default_platform.clone());

        let model = match request.ai_model.clone().filter(|m| !m.is_empty()) {
            Some(model) => model,
            None if platform.eq_ignore_ascii_case(&self.settings.default_platform) => {
                self.settings.default_model.clone()
            }
            None => catalog::default_model(&platform)
                .unwrap_or_default()
                .to_string(),
        };
        (platform, model)
    }

    fn resolve_providers(
        &self,
        request: &GenerationRequest,
    ) -> Result<(Arc<dyn GitProvider>, Arc<dyn LLMProvider>), GenerationError> {
        let (ai_platform, ai_model) = self.resolve_ai_choice(request);
        let llm = self.llm_providers.create(&ai_platform, &ai_model)?;
        let git = self.git_providers.create(
            &request.platform,
            request.git_token.as_deref(),
            request.git_api_url.as_deref(),
        )?;
        Ok((git, llm))
    }

    async fn repository_data(
        &self,
        request: &GenerationRequest,
        git: Arc<dyn GitProvider>,
    ) -> Result<Arc<RepositoryData>, GenerationError> {
        Ok(self.cache.get_or_fetch(&request.cache_key(), git).await?)
    }

    /// Estimated USD cost of a run, formatted as `$X.XX USD`.
    /// Instruction length is not checked on this path.
    pub async fn estimate_cost(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let (git, llm) = self.resolve_providers(request)?;
        let data = self.repository_data(request, git).await?;

        let file_tree_tokens = llm.count_tokens(&data.file_tree).await?;
        let readme_tokens = llm.count_tokens(&data.readme).await?;
        let pricing = catalog::pricing(llm.platform(), llm.model());

        let cost = format_usd(estimate_usd(file_tree_tokens, readme_tokens, pricing));
        debug!(
            owner = %request.owner,
            repo = %request.repo,
            file_tree_tokens,
            readme_tokens,
            cost = %cost,
            "Estimated generation cost"
        );
        Ok(cost)
    }

    /// Run the pipeline for `request`. The returned stream ends after its
    /// first `complete` or `error` event.
    pub fn generate(&self, request: GenerationRequest) -> EventStream {
        let service = self.clone();

        Box::pin(async_stream::stream! {
            info!(
                platform = %request.platform,
                owner = %request.owner,
                repo = %request.repo,
                "Starting diagram generation"
            );

            let mut stage = PipelineStage::Validating;
            let steps = service.run(request);
            futures::pin_mut!(steps);

            while let Some(step) = steps.next().await {
                match step {
                    Ok(Step::Stage(next)) => {
                        debug!(from = %stage, to = %next, "Pipeline stage transition");
                        stage = next;
                    }
                    Ok(Step::Event(event)) => {
                        let terminal = event.is_terminal();
                        if terminal {
                            metrics::counter!("repograph_generations_total", "outcome" => "complete")
                                .increment(1);
                            info!("Diagram generation complete");
                        }
                        yield event;
                        if terminal {
                            return;
                        }
                    }
                    Err(err) => {
                        metrics::counter!("repograph_generations_total", "outcome" => "error")
                            .increment(1);
                        metrics::counter!(
                            "repograph_generation_failures_total",
                            "stage" => stage.as_str()
                        )
                        .increment(1);
                        warn!(stage = %stage, kind = err.kind(), error = %err, "Diagram generation failed");
                        yield PipelineEvent::error(err.to_string());
                        return;
                    }
                }
            }
        })
    }

    fn run(self, request: GenerationRequest) -> impl Stream<Item = Result<Step, GenerationError>> + Send {
        async_stream::try_stream! {
            request.validate()?;

            yield Step::Stage(PipelineStage::Fetching);
            let (git, llm) = self.resolve_providers(&request)?;
            let data = self.repository_data(&request, git).await?;
            let ai_platform = llm.platform().to_string();
            let ai_model = llm.model().to_string();

            yield Step::Event(PipelineEvent::Started {
                message: format!("Starting generation process with {ai_platform} ({ai_model})..."),
            });

            yield Step::Stage(PipelineStage::BudgetCheck);
            let token_count = llm
                .count_tokens(&format!("{}\n{}", data.file_tree, data.readme))
                .await?;
            check_token_budget(
                token_count,
                catalog::token_limit(&ai_platform, &ai_model),
                self.settings.free_tier_token_limit,
                request.has_caller_key(),
                &ai_platform,
                &ai_model,
            )?;

            let effort = request.reasoning_effort.unwrap_or(self.settings.default_effort);
            let completion = |system_prompt: String, input: PromptInput| CompletionRequest {
                system_prompt,
                input,
                api_key: request.api_key.clone().filter(|key| !key.trim().is_empty()),
                reasoning_effort: effort,
            };

            // Phase 1: explanation
            yield Step::Stage(PipelineStage::Explaining);
            yield Step::Event(PipelineEvent::ExplanationSent {
                message: format!("Sending explanation request to {ai_platform}..."),
            });
            yield Step::Event(PipelineEvent::Explanation {
                message: "Analyzing repository structure...".to_string(),
            });

            let mut explanation = String::new();
            let mut chunks = self.phase(
                PipelineStage::Explaining,
                llm.as_ref(),
                completion(
                    prompts::with_instructions(prompts::EXPLANATION_PROMPT, &request.instructions),
                    PromptInput::new()
                        .with("file_tree", data.file_tree.as_str())
                        .with("readme", data.readme.as_str())
                        .with("instructions", request.instructions.as_str()),
                ),
            );
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                explanation.push_str(&chunk);
                yield Step::Event(PipelineEvent::ExplanationChunk { chunk });
            }
            if explanation.contains(BAD_INSTRUCTIONS_SENTINEL) {
                Err::<(), _>(GenerationError::SemanticVeto)?;
            }

            // Phase 2: component mapping
            yield Step::Stage(PipelineStage::Mapping);
            yield Step::Event(PipelineEvent::MappingSent {
                message: format!("Sending component mapping request to {ai_platform}..."),
            });
            yield Step::Event(PipelineEvent::Mapping {
                message: "Creating component mapping...".to_string(),
            });

            let mut mapping_response = String::new();
            let mut chunks = self.phase(
                PipelineStage::Mapping,
                llm.as_ref(),
                completion(
                    prompts::mapping_prompt(),
                    PromptInput::new()
                        .with("explanation", explanation.as_str())
                        .with("file_tree", data.file_tree.as_str()),
                ),
            );
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                mapping_response.push_str(&chunk);
                yield Step::Event(PipelineEvent::MappingChunk { chunk });
            }
            let mapping = extract_component_mapping(&mapping_response);
            if mapping.is_empty() {
                debug!("Component mapping markers missing; continuing with an empty mapping");
            }

            // Phase 3: diagram
            yield Step::Stage(PipelineStage::Diagramming);
            yield Step::Event(PipelineEvent::DiagramSent {
                message: format!("Sending diagram generation request to {ai_platform}..."),
            });
            yield Step::Event(PipelineEvent::Diagram {
                message: "Generating diagram...".to_string(),
            });

            let mut diagram = String::new();
            let mut chunks = self.phase(
                PipelineStage::Diagramming,
                llm.as_ref(),
                completion(
                    prompts::with_instructions(prompts::DIAGRAM_PROMPT, &request.instructions),
                    PromptInput::new()
                        .with("explanation", explanation.as_str())
                        .with("component_mapping", mapping.as_str())
                        .with("instructions", request.instructions.as_str()),
                ),
            );
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                diagram.push_str(&chunk);
                yield Step::Event(PipelineEvent::DiagramChunk { chunk });
            }
            let diagram = strip_code_fences(&diagram);
            if diagram.contains(BAD_INSTRUCTIONS_SENTINEL) {
                Err::<(), _>(GenerationError::SemanticVeto)?;
            }

            yield Step::Stage(PipelineStage::Postprocessing);
            let diagram = process_click_events(
                &diagram,
                &request.owner,
                &request.repo,
                &data.default_branch,
                data.provider.as_ref(),
            );

            yield Step::Stage(PipelineStage::Complete);
            yield Step::Event(PipelineEvent::Complete {
                diagram,
                explanation,
                mapping,
                ai_platform,
                ai_model,
            });
        }
    }

    /// One streaming LLM call bounded by the per-phase deadline.
    fn phase(
        &self,
        stage: PipelineStage,
        llm: &dyn LLMProvider,
        request: CompletionRequest,
    ) -> PhaseStream {
        Box::pin(bounded_phase(
            llm.complete_stream(request),
            stage,
            self.settings.phase_timeout,
        ))
    }
}

fn bounded_phase(
    mut upstream: TextStream,
    stage: PipelineStage,
    timeout: Duration,
) -> impl Stream<Item = Result<String, GenerationError>> + Send {
    async_stream::try_stream! {
        let deadline = Instant::now() + timeout;
        loop {
            let next = tokio::time::timeout_at(deadline, upstream.next())
                .await
                .map_err(|_| GenerationError::Timeout(stage, timeout.as_secs()))?;
            match next {
                Some(chunk) => {
                    let chunk = chunk?;
                    yield chunk;
                }
                None => break,
            }
        }
    }
}
