//! Editorial domains: a static lookup from topic keywords to prompt blobs.
//!
//! The four domains are fixed; classification is a keyword match over the topic
//! text with [`Domain::General`] as the fallback. Each domain maps to an immutable
//! source-credibility prompt compiled into the binary.

use crate::prompts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One of the four editorial domains a research topic can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Software, infrastructure, engineering practice.
    Tech,
    /// Regulation, governance, law.
    Policy,
    /// Industry direction, opinion, strategy.
    ThoughtLeadership,
    /// Everything else.
    General,
}

const TECH_KEYWORDS: &[&str] = &[
    "api",
    "framework",
    "library",
    "database",
    "server",
    "rust",
    "python",
    "javascript",
    "react",
    "kubernetes",
    "docker",
    "postgres",
    "mcp",
    "sdk",
    "protocol",
    "compiler",
    "cloud",
    "benchmark",
    "open source",
    "architecture",
];

const POLICY_KEYWORDS: &[&str] = &[
    "regulation",
    "policy",
    "law",
    "compliance",
    "gdpr",
    "legislation",
    "governance",
    "privacy",
    "antitrust",
    "copyright",
    "tariff",
    "government",
    "election",
    "court",
    "treaty",
];

const THOUGHT_LEADERSHIP_KEYWORDS: &[&str] = &[
    "future of",
    "trends",
    "opinion",
    "vision",
    "strategy",
    "predictions",
    "outlook",
    "state of",
    "best practices",
    "lessons learned",
    "industry direction",
];

impl Domain {
    /// Stable key for this domain ("tech", "policy", ...), matching config keys.
    pub fn key(&self) -> &'static str {
        match self {
            Domain::Tech => "tech",
            Domain::Policy => "policy",
            Domain::ThoughtLeadership => "thought-leadership",
            Domain::General => "general",
        }
    }

    /// Human-readable label for banners and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Tech => "Tech & Engineering",
            Domain::Policy => "Policy & Governance",
            Domain::ThoughtLeadership => "Thought Leadership",
            Domain::General => "General",
        }
    }

    /// The source-credibility prompt blob for this domain.
    pub fn prompt(&self) -> &'static str {
        match self {
            Domain::Tech => prompts::DOMAIN_TECH_PROMPT,
            Domain::Policy => prompts::DOMAIN_POLICY_PROMPT,
            Domain::ThoughtLeadership => prompts::DOMAIN_THOUGHT_LEADERSHIP_PROMPT,
            Domain::General => prompts::DOMAIN_GENERAL_PROMPT,
        }
    }

    /// Built-in classification keywords. General has none; it is the fallback.
    pub fn builtin_keywords(&self) -> &'static [&'static str] {
        match self {
            Domain::Tech => TECH_KEYWORDS,
            Domain::Policy => POLICY_KEYWORDS,
            Domain::ThoughtLeadership => THOUGHT_LEADERSHIP_KEYWORDS,
            Domain::General => &[],
        }
    }

    /// Creates a Domain from its key. Returns None for unknown keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "tech" => Some(Domain::Tech),
            "policy" => Some(Domain::Policy),
            "thought-leadership" => Some(Domain::ThoughtLeadership),
            "general" => Some(Domain::General),
            _ => None,
        }
    }

    /// All domains in classification order. General last so it never outranks a match.
    pub fn all() -> [Self; 4] {
        [
            Domain::Tech,
            Domain::Policy,
            Domain::ThoughtLeadership,
            Domain::General,
        ]
    }

    /// Classifies a topic using the built-in keyword tables only.
    pub fn detect(topic: &str) -> Self {
        Self::detect_with_extras(topic, &HashMap::new())
    }

    /// Classifies a topic with configured extra keywords merged on top of the
    /// built-ins. Ties go to the earlier domain in [`Domain::all`] order; a topic
    /// matching nothing is General.
    pub fn detect_with_extras(topic: &str, extras: &HashMap<String, Vec<String>>) -> Self {
        let topic_lower = topic.to_lowercase();
        let mut best = Domain::General;
        let mut best_score = 0usize;
        for domain in Self::all() {
            if domain == Domain::General {
                continue;
            }
            let builtin = domain
                .builtin_keywords()
                .iter()
                .filter(|kw| topic_lower.contains(**kw))
                .count();
            let configured = extras
                .get(domain.key())
                .map(|kws| {
                    kws.iter()
                        .filter(|kw| topic_lower.contains(&kw.to_lowercase()))
                        .count()
                })
                .unwrap_or(0);
            let score = builtin + configured;
            if score > best_score {
                best = domain;
                best_score = score;
            }
        }
        best
    }
}
