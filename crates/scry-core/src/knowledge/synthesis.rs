//! Cross-topic synthesis: aggregate every overview, delegate the reasoning.

use super::store::{KnowledgeError, KnowledgeStore};
use crate::reasoner::Reasoner;

/// Outcome of a synthesis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// No topic had an overview; nothing was written and prior output is untouched.
    Empty,
    /// The four synthesis files were overwritten from this many topic overviews.
    Written { topics: usize },
}

/// Builds the aggregate text fed to the reasoner: every overview labeled by its
/// slug, in slug order.
fn aggregate_overviews(store: &KnowledgeStore) -> Result<(String, usize), KnowledgeError> {
    let slugs = store.list_topics()?;
    let mut aggregate = String::new();
    for slug in &slugs {
        let entry = store.read_entry(slug)?;
        aggregate.push_str(&format!(
            "## Topic: {}\n\n{}\n\n",
            slug,
            entry.overview.trim_end()
        ));
    }
    Ok((aggregate, slugs.len()))
}

/// Reads every topic overview, hands the labeled aggregate to `reasoner`, and
/// overwrites the four synthesis files with whatever it returns, verbatim.
///
/// With zero topics this is a no-op returning [`SynthesisOutcome::Empty`]; prior
/// synthesis output is never replaced with blank content.
pub async fn synthesize(
    store: &KnowledgeStore,
    reasoner: &dyn Reasoner,
) -> Result<SynthesisOutcome, Box<dyn std::error::Error + Send + Sync>> {
    let (aggregate, topics) = aggregate_overviews(store)?;
    if topics == 0 {
        tracing::info!(
            target: "scry::synthesis",
            "no topic overviews present; skipping synthesis"
        );
        return Ok(SynthesisOutcome::Empty);
    }
    let report = reasoner.synthesize(&aggregate).await?;
    store.write_synthesis(&report)?;
    tracing::info!(
        target: "scry::synthesis",
        topics = topics,
        "synthesis written across {} topics",
        topics
    );
    Ok(SynthesisOutcome::Written { topics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoner::{
        FollowUpReply, FollowUpRequest, ResearchFindings, ResearchRequest, SynthesisReport,
    };
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records the aggregate it was handed and returns a canned report.
    struct RecordingReasoner {
        seen: Mutex<Option<String>>,
    }

    impl RecordingReasoner {
        fn new() -> Self {
            Self {
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl Reasoner for RecordingReasoner {
        fn name(&self) -> &str {
            "RecordingReasoner"
        }

        async fn research(
            &self,
            _request: &ResearchRequest,
        ) -> Result<ResearchFindings, Box<dyn std::error::Error + Send + Sync>> {
            unimplemented!("not used by synthesis tests")
        }

        async fn follow_up(
            &self,
            _request: &FollowUpRequest,
        ) -> Result<FollowUpReply, Box<dyn std::error::Error + Send + Sync>> {
            unimplemented!("not used by synthesis tests")
        }

        async fn synthesize(
            &self,
            aggregate: &str,
        ) -> Result<SynthesisReport, Box<dyn std::error::Error + Send + Sync>> {
            *self.seen.lock().unwrap() = Some(aggregate.to_string());
            Ok(SynthesisReport {
                connections: "C".to_string(),
                patterns: "P".to_string(),
                tensions: "T".to_string(),
                questions: "Q".to_string(),
                cost_usd: None,
            })
        }
    }

    #[tokio::test]
    async fn empty_store_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("research")).unwrap();
        let reasoner = RecordingReasoner::new();
        let outcome = synthesize(&store, &reasoner).await.unwrap();
        assert_eq!(outcome, SynthesisOutcome::Empty);
        assert!(reasoner.seen.lock().unwrap().is_none());
        assert!(!store.synthesis_present());
    }

    #[tokio::test]
    async fn aggregate_labels_overviews_in_slug_order() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("research")).unwrap();
        store.write_overview("beta", "Beta overview.").unwrap();
        store.write_overview("alpha", "Alpha overview.").unwrap();

        let reasoner = RecordingReasoner::new();
        let outcome = synthesize(&store, &reasoner).await.unwrap();
        assert_eq!(outcome, SynthesisOutcome::Written { topics: 2 });

        let seen = reasoner.seen.lock().unwrap().clone().unwrap();
        let alpha = seen.find("## Topic: alpha").unwrap();
        let beta = seen.find("## Topic: beta").unwrap();
        assert!(alpha < beta);
        assert!(seen.contains("Alpha overview."));
    }

    #[tokio::test]
    async fn report_is_written_verbatim() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("research")).unwrap();
        store.write_overview("only", "Only overview.").unwrap();

        let reasoner = RecordingReasoner::new();
        synthesize(&store, &reasoner).await.unwrap();
        let connections =
            std::fs::read_to_string(store.root().join("synthesis/connections.md")).unwrap();
        assert_eq!(connections, "C");
    }
}
