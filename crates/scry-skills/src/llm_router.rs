//! LLM router: routes research, follow-up, and synthesis requests to a mock
//! generator or a live model API, and parses the typed section replies.

use scry_core::{
    build_synthesis_prompt, FollowUpReply, FollowUpRequest, NoteDraft, Reasoner,
    ResearchFindings, ResearchRequest, SynthesisReport, SYNTHESIS_SYSTEM_PROMPT,
};

const ROUTER_NAME: &str = "LlmRouter";
const ENV_LLM_MODE: &str = "SCRY_LLM_MODE";
const ENV_LLM_API_URL: &str = "SCRY_LLM_API_URL";
const ENV_LLM_API_KEY: &str = "SCRY_LLM_API_KEY";
const ENV_LLM_MODEL: &str = "SCRY_LLM_MODEL";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Mode for LLM invocation: mock (deterministic local generation) or live
/// (external messages API).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    #[default]
    Mock,
    Live,
}

impl LlmMode {
    /// Reads the mode from `SCRY_LLM_MODE` ("live" enables the API path).
    pub fn from_env() -> Self {
        match std::env::var(ENV_LLM_MODE).as_deref() {
            Ok("live") => LlmMode::Live,
            _ => LlmMode::Mock,
        }
    }

    /// Maps a config string ("mock", "live") to a mode. Unknown values are mock.
    pub fn from_config(mode: &str) -> Self {
        match mode {
            "live" => LlmMode::Live,
            _ => LlmMode::Mock,
        }
    }
}

/// Strips a surrounding markdown code fence so strict-JSON replies survive models
/// that wrap output in fenced json blocks.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Routes reasoning requests to a mock generator or a live messages API.
///
/// Live mode requires `SCRY_LLM_API_URL` and `SCRY_LLM_API_KEY`; when either is
/// missing the router falls back to mock generation so the rest of the pipeline
/// can be exercised without credentials.
pub struct LlmRouter {
    mode: LlmMode,
    http: reqwest::Client,
}

impl LlmRouter {
    pub fn new() -> Self {
        Self::with_mode(LlmMode::from_env())
    }

    pub fn with_mode(mode: LlmMode) -> Self {
        Self {
            mode,
            http: reqwest::Client::new(),
        }
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    fn live_credentials() -> Option<(String, String)> {
        let url = std::env::var(ENV_LLM_API_URL).ok()?;
        let key = std::env::var(ENV_LLM_API_KEY).ok()?;
        Some((url, key))
    }

    /// Deterministic findings derived from the request, for tests and for
    /// unconfigured live mode.
    fn mock_research(&self, request: &ResearchRequest) -> ResearchFindings {
        ResearchFindings {
            overview: format!(
                "# {}\n\nDomain: {}.\n\nGenerated locally without a model call; run in live \
                 mode for real research.\n",
                request.topic,
                request.domain.label()
            ),
            sources: format!(
                "# Sources\n\n1. https://example.com/{} (placeholder source entry)\n",
                request.slug
            ),
            notes: vec![NoteDraft {
                name: "key-findings".to_string(),
                content: format!("# Key findings\n\nPlaceholder note for '{}'.\n", request.topic),
            }],
            cost_usd: None,
        }
    }

    fn mock_follow_up(&self, request: &FollowUpRequest) -> FollowUpReply {
        FollowUpReply {
            answer: format!(
                "Answering from the stored notes for '{}': {} (mock reply, no model call).",
                request.topic, request.question
            ),
            note: None,
            cost_usd: None,
        }
    }

    fn mock_synthesis(&self, aggregate: &str) -> SynthesisReport {
        let topic_count = aggregate.matches("## Topic: ").count();
        SynthesisReport {
            connections: format!(
                "# Connections\n\nDrawn across {} topics (mock synthesis).\n",
                topic_count
            ),
            patterns: "# Patterns\n\nRecurring themes would be listed here.\n".to_string(),
            tensions: "# Tensions\n\nContradictions would be listed here.\n".to_string(),
            questions: "# Open Questions\n\nRemaining questions would be listed here.\n"
                .to_string(),
            cost_usd: None,
        }
    }

    /// Sends one prompt to the configured messages API and returns the text reply.
    async fn live_generate(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let (url, key) = Self::live_credentials()
            .ok_or("live mode requires SCRY_LLM_API_URL and SCRY_LLM_API_KEY")?;
        let model = std::env::var(ENV_LLM_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let body = serde_json::json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });
        tracing::debug!(
            target: "scry::router",
            model = %model,
            prompt_bytes = prompt.len(),
            "dispatching live model request"
        );
        let response = self
            .http
            .post(&url)
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let value: serde_json::Value = response.json().await?;
        let text = value
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|b| b.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        if text.is_empty() {
            return Err("model reply contained no text content".into());
        }
        Ok(text)
    }

    /// Resolved mode for this call: live only when credentials are present.
    fn effective_mode(&self) -> LlmMode {
        if self.mode == LlmMode::Live && Self::live_credentials().is_none() {
            tracing::warn!(
                target: "scry::router",
                "live mode unconfigured; falling back to mock generation"
            );
            return LlmMode::Mock;
        }
        self.mode
    }
}

impl Default for LlmRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Reasoner for LlmRouter {
    fn name(&self) -> &str {
        ROUTER_NAME
    }

    async fn research(
        &self,
        request: &ResearchRequest,
    ) -> Result<ResearchFindings, Box<dyn std::error::Error + Send + Sync>> {
        match self.effective_mode() {
            LlmMode::Mock => Ok(self.mock_research(request)),
            LlmMode::Live => {
                let text = self
                    .live_generate(&request.system_prompt, &request.prompt)
                    .await?;
                let findings = ResearchFindings::from_json(extract_json(&text))
                    .ok_or("model reply was not the expected research JSON")?;
                Ok(findings)
            }
        }
    }

    async fn follow_up(
        &self,
        request: &FollowUpRequest,
    ) -> Result<FollowUpReply, Box<dyn std::error::Error + Send + Sync>> {
        match self.effective_mode() {
            LlmMode::Mock => Ok(self.mock_follow_up(request)),
            LlmMode::Live => {
                let text = self
                    .live_generate(&request.system_prompt, &request.prompt)
                    .await?;
                let reply = FollowUpReply::from_json(extract_json(&text))
                    .ok_or("model reply was not the expected follow-up JSON")?;
                Ok(reply)
            }
        }
    }

    async fn synthesize(
        &self,
        aggregate: &str,
    ) -> Result<SynthesisReport, Box<dyn std::error::Error + Send + Sync>> {
        match self.effective_mode() {
            LlmMode::Mock => Ok(self.mock_synthesis(aggregate)),
            LlmMode::Live => {
                let prompt = build_synthesis_prompt(aggregate);
                let text = self.live_generate(SYNTHESIS_SYSTEM_PROMPT, &prompt).await?;
                let report = SynthesisReport::from_json(extract_json(&text))
                    .ok_or("model reply was not the expected synthesis JSON")?;
                Ok(report)
            }
        }
    }
}
