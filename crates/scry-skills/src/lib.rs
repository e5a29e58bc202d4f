//! Reasoner backends and research-session orchestration.

pub use scry_core::Reasoner;

mod llm_router;
mod session;

pub use llm_router::{LlmMode, LlmRouter};
pub use session::{run_follow_up, run_research, FollowUpSummary, RunSummary};
