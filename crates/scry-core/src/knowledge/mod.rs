//! Markdown knowledge base: slug addressing, per-topic entries, cross-topic synthesis.
//!
//! ## Directory layout (fixed, relative to the configured root)
//!
//! ```text
//! {root}/topics/{slug}/overview.md
//! {root}/topics/{slug}/sources.md
//! {root}/topics/{slug}/notes/{note-name}.md
//! {root}/synthesis/connections.md
//! {root}/synthesis/patterns.md
//! {root}/synthesis/tensions.md
//! {root}/synthesis/questions.md
//! {root}/index.md
//! ```
//!
//! Every file is opaque UTF-8 markdown. Entries never reference each other;
//! synthesis reads every entry's overview and writes only its own four files.

mod slug;
mod store;
mod synthesis;

pub use slug::resolve_slug;
pub use store::{Entry, KnowledgeError, KnowledgeStore, Note, StoreStatus};
pub use synthesis::{synthesize, SynthesisOutcome};
