//! Research session orchestration: slugify, classify, delegate to the reasoner,
//! persist the returned sections.

use scry_core::{
    build_follow_up_prompt, build_research_prompt, resolve_slug, Domain, FollowUpRequest,
    KnowledgeError, KnowledgeStore, Reasoner, ResearchConfig, ResearchRequest,
    RESEARCHER_SYSTEM_PROMPT,
};
use uuid::Uuid;

/// Summary of one completed research run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub slug: String,
    pub domain: Domain,
    pub notes_written: usize,
    pub cost_usd: Option<f64>,
}

/// Result of one follow-up exchange.
#[derive(Debug, Clone)]
pub struct FollowUpSummary {
    pub slug: String,
    pub answer: String,
    /// Name of the note persisted from this exchange, when the reasoner returned one.
    pub note_written: Option<String>,
    pub cost_usd: Option<f64>,
}

/// Persists a note, retrying with numeric suffixes (`name-2`, `name-3`, ...) when
/// the store rejects a duplicate name. Returns the name actually written.
fn append_note_suffixed(
    store: &KnowledgeStore,
    slug: &str,
    name: &str,
    content: &str,
) -> Result<String, KnowledgeError> {
    match store.append_note(slug, name, content, false) {
        Ok(()) => return Ok(name.to_string()),
        Err(KnowledgeError::NoteConflict { .. }) => {}
        Err(e) => return Err(e),
    }
    for n in 2u32.. {
        let candidate = format!("{}-{}", name, n);
        match store.append_note(slug, &candidate, content, false) {
            Ok(()) => return Ok(candidate),
            Err(KnowledgeError::NoteConflict { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    unreachable!("suffix search is unbounded")
}

/// Runs one research pass for `topic`: classify the domain, delegate to `reasoner`,
/// persist overview, sources, and notes, then regenerate the index.
///
/// Re-running for an existing topic overwrites `overview.md` and `sources.md` and
/// feeds the prior overview back to the reasoner; notes accumulate.
pub async fn run_research(
    store: &KnowledgeStore,
    reasoner: &dyn Reasoner,
    config: &ResearchConfig,
    topic: &str,
) -> Result<RunSummary, Box<dyn std::error::Error + Send + Sync>> {
    let slug = resolve_slug(topic);
    let domain = Domain::detect_with_extras(topic, &config.domain_keywords);
    let correlation_id = Uuid::new_v4();
    tracing::info!(
        target: "scry::session",
        slug = %slug,
        domain = domain.key(),
        reasoner = reasoner.name(),
        correlation_id = %correlation_id,
        "research run started for '{}'",
        topic
    );

    let prior = if store.has_entry(&slug) {
        Some(store.read_entry(&slug)?)
    } else {
        None
    };
    let request = ResearchRequest {
        topic: topic.to_string(),
        slug: slug.clone(),
        domain,
        prompt: build_research_prompt(
            topic,
            domain,
            prior.as_ref(),
            config.max_search_results,
            config.max_sources_to_fetch,
        ),
        system_prompt: format!("{}\n\n{}", RESEARCHER_SYSTEM_PROMPT, domain.prompt()),
    };

    let findings = reasoner.research(&request).await?;
    store.write_overview(&slug, &findings.overview)?;
    store.write_sources(&slug, &findings.sources)?;

    let mut notes_written = 0;
    for draft in &findings.notes {
        let name = resolve_slug(&draft.name);
        append_note_suffixed(store, &slug, &name, &draft.content)?;
        notes_written += 1;
    }
    store.write_index()?;

    tracing::info!(
        target: "scry::session",
        slug = %slug,
        notes = notes_written,
        "research run finished"
    );
    Ok(RunSummary {
        slug,
        domain,
        notes_written,
        cost_usd: findings.cost_usd,
    })
}

/// Answers a follow-up question against the stored entry for `topic`.
///
/// Fails with the store's not-found error when the topic has never been
/// researched; the caller decides whether to start a fresh run instead.
pub async fn run_follow_up(
    store: &KnowledgeStore,
    reasoner: &dyn Reasoner,
    topic: &str,
    question: &str,
) -> Result<FollowUpSummary, Box<dyn std::error::Error + Send + Sync>> {
    let slug = resolve_slug(topic);
    let entry = store.read_entry(&slug)?;
    let request = FollowUpRequest {
        topic: topic.to_string(),
        slug: slug.clone(),
        question: question.to_string(),
        prompt: build_follow_up_prompt(topic, question, &entry),
        system_prompt: RESEARCHER_SYSTEM_PROMPT.to_string(),
    };
    let reply = reasoner.follow_up(&request).await?;

    let mut note_written = None;
    if let Some(draft) = &reply.note {
        let name = resolve_slug(&draft.name);
        note_written = Some(append_note_suffixed(store, &slug, &name, &draft.content)?);
    }

    tracing::info!(target: "scry::session", slug = %slug, "follow-up answered");
    Ok(FollowUpSummary {
        slug,
        answer: reply.answer,
        note_written,
        cost_usd: reply.cost_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_router::{LlmMode, LlmRouter};
    use tempfile::tempdir;

    fn test_config() -> ResearchConfig {
        ResearchConfig {
            app_name: "Test Researcher".to_string(),
            research_root: "unused".to_string(),
            llm_mode: "mock".to_string(),
            max_search_results: 10,
            max_sources_to_fetch: 5,
            domain_keywords: Default::default(),
        }
    }

    #[tokio::test]
    async fn research_run_persists_all_sections() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("research")).unwrap();
        let router = LlmRouter::with_mode(LlmMode::Mock);

        let summary = run_research(
            &store,
            &router,
            &test_config(),
            "Compare MCP servers for Postgres access",
        )
        .await
        .unwrap();

        assert_eq!(summary.slug, "compare-mcp-servers-for-postgres-access");
        assert_eq!(summary.domain, Domain::Tech);
        assert_eq!(summary.notes_written, 1);

        let entry = store.read_entry(&summary.slug).unwrap();
        assert!(entry.overview.contains("Compare MCP servers"));
        assert!(entry.sources.is_some());
        assert_eq!(entry.notes.len(), 1);

        let index = std::fs::read_to_string(store.root().join("index.md")).unwrap();
        assert!(index.contains(&summary.slug));
    }

    #[tokio::test]
    async fn rerun_suffixes_colliding_notes() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("research")).unwrap();
        let router = LlmRouter::with_mode(LlmMode::Mock);
        let config = test_config();

        run_research(&store, &router, &config, "Rust async runtimes")
            .await
            .unwrap();
        run_research(&store, &router, &config, "Rust async runtimes")
            .await
            .unwrap();

        let entry = store.read_entry("rust-async-runtimes").unwrap();
        let names: Vec<&str> = entry.notes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["key-findings", "key-findings-2"]);
    }

    #[tokio::test]
    async fn follow_up_requires_existing_entry() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("research")).unwrap();
        let router = LlmRouter::with_mode(LlmMode::Mock);

        let err = run_follow_up(&store, &router, "never researched", "why?")
            .await
            .unwrap_err();
        let knowledge = err.downcast_ref::<KnowledgeError>().expect("store error");
        assert!(matches!(knowledge, KnowledgeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn follow_up_answers_from_stored_entry() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("research")).unwrap();
        let router = LlmRouter::with_mode(LlmMode::Mock);
        let config = test_config();

        run_research(&store, &router, &config, "GDPR enforcement actions")
            .await
            .unwrap();
        let summary = run_follow_up(
            &store,
            &router,
            "GDPR enforcement actions",
            "Which regulator fined the most?",
        )
        .await
        .unwrap();

        assert_eq!(summary.slug, "gdpr-enforcement-actions");
        assert!(summary.answer.contains("Which regulator fined the most?"));
        assert!(summary.note_written.is_none());
    }
}
