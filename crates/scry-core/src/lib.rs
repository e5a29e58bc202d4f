//! scry-core: researcher core library (config, domain prompts, markdown knowledge base, synthesis).
//!
//! The actual research is performed by an external language-model reasoner behind the
//! [`Reasoner`] trait; this crate owns everything around it: classifying a topic into an
//! editorial domain, addressing the on-disk knowledge base, and aggregating the input
//! for cross-topic synthesis.

mod domain;
mod knowledge;
mod prompts;
mod reasoner;
mod shared;

// Shared configuration
pub use shared::ResearchConfig;

// Domain classification (static prompt lookup)
pub use domain::Domain;

// Knowledge base (markdown directory tree)
pub use knowledge::{
    resolve_slug, synthesize, Entry, KnowledgeError, KnowledgeStore, Note, StoreStatus,
    SynthesisOutcome,
};

// Prompt blobs and builders
pub use prompts::{
    build_follow_up_prompt, build_research_prompt, build_synthesis_prompt,
    RESEARCHER_SYSTEM_PROMPT, SYNTHESIS_SYSTEM_PROMPT,
};

// Reasoner boundary (opaque external model)
pub use reasoner::{
    FollowUpReply, FollowUpRequest, NoteDraft, Reasoner, ResearchFindings, ResearchRequest,
    SynthesisReport,
};
