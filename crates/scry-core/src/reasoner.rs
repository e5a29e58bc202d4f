//! Opaque boundary to the external language-model reasoner.
//!
//! The core never performs research itself: it hands a prepared prompt to a
//! [`Reasoner`] and writes back whatever structured markdown comes out, without
//! inspecting it. Backends live in `scry-skills`.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};

/// One note the reasoner wants persisted under the entry's `notes/` directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDraft {
    /// Proposed note name; the session normalizes it into a slug before writing.
    pub name: String,
    pub content: String,
}

/// Sections returned by a research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchFindings {
    pub overview: String,
    pub sources: String,
    #[serde(default)]
    pub notes: Vec<NoteDraft>,
    /// Reported cost of the run, when the backend tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

impl ResearchFindings {
    /// Deserializes findings from a strict-JSON model reply.
    pub fn from_json(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Reply to a follow-up question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpReply {
    pub answer: String,
    /// Optional note worth persisting from this exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

impl FollowUpReply {
    pub fn from_json(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// The four synthesis sections, written verbatim to the fixed synthesis files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub connections: String,
    pub patterns: String,
    pub tensions: String,
    pub questions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

impl SynthesisReport {
    pub fn from_json(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Everything a backend needs for one research run. `prompt` and `system_prompt`
/// are fully built by the session; the remaining fields carry context for mock
/// generation and logging.
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    pub topic: String,
    pub slug: String,
    pub domain: Domain,
    pub prompt: String,
    pub system_prompt: String,
}

/// Everything a backend needs to answer one follow-up question.
#[derive(Debug, Clone)]
pub struct FollowUpRequest {
    pub topic: String,
    pub slug: String,
    pub question: String,
    pub prompt: String,
    pub system_prompt: String,
}

/// Trait implemented by all reasoner backends (mock or live model API).
#[async_trait::async_trait]
pub trait Reasoner: Send + Sync {
    /// Backend name for routing and logs.
    fn name(&self) -> &str;

    /// Performs one research run and returns the sections to persist.
    async fn research(
        &self,
        request: &ResearchRequest,
    ) -> Result<ResearchFindings, Box<dyn std::error::Error + Send + Sync>>;

    /// Answers a follow-up question against previously stored research.
    async fn follow_up(
        &self,
        request: &FollowUpRequest,
    ) -> Result<FollowUpReply, Box<dyn std::error::Error + Send + Sync>>;

    /// Produces the cross-topic synthesis sections from the labeled aggregate text.
    async fn synthesize(
        &self,
        aggregate: &str,
    ) -> Result<SynthesisReport, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn findings_parse_from_strict_json() {
        let findings = ResearchFindings::from_json(
            r#"{"overview": "o", "sources": "s", "notes": [{"name": "n", "content": "c"}]}"#,
        )
        .unwrap();
        assert_eq!(findings.overview, "o");
        assert_eq!(findings.notes.len(), 1);
        assert!(findings.cost_usd.is_none());
    }

    #[test]
    fn follow_up_note_is_optional() {
        let reply = FollowUpReply::from_json(r#"{"answer": "a"}"#).unwrap();
        assert!(reply.note.is_none());
    }

    #[test]
    fn malformed_reply_is_rejected() {
        assert!(SynthesisReport::from_json("not json").is_none());
        assert!(ResearchFindings::from_json(r#"{"overview": "o"}"#).is_none());
    }
}
