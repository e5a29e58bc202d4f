//! Prompt blobs and builders for the external reasoner.
//!
//! All policy text lives here as immutable constants loaded at startup; the rest of
//! the crate treats it as opaque. Builders interpolate the topic, budgets, and prior
//! context, and append the strict-JSON reply contract the router deserializes against.

use crate::domain::Domain;
use crate::knowledge::Entry;

/// System prompt for research and follow-up runs.
pub const RESEARCHER_SYSTEM_PROMPT: &str = r#"You are a project research assistant.

Your job, for every topic you are given:
1. Clarify scope first. If the request is ambiguous, ask what aspects matter most
   before searching; otherwise state the assumptions you are making.
2. Search the web for relevant, current sources within the stated budgets.
3. Extract the substance: concrete facts, numbers, version-specific behavior,
   direct quotes where wording matters.
4. Cite every nontrivial claim with its source URL and note the publication date.
5. Be explicit about uncertainty. Conflicting sources, stale data, and gaps in
   coverage belong in the output, not silently resolved.

Write markdown with human-readable section headers. Never pad: a short, dense
summary beats a long generic one."#;

/// System prompt for cross-topic synthesis runs.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = r#"You are a research synthesist.

You receive the overview of every topic in a personal knowledge base, each labeled
by its topic slug. Read all of them, then reason across topics, not within one:

- connections: where findings from different topics inform or depend on each other
- patterns: themes that recur across three or more topics
- tensions: places where the research disagrees with itself, with sources
- questions: what the accumulated research still cannot answer

Ground every observation in the overviews you were given; cite topics by slug.
Do not restate any single overview."#;

/// Credibility hierarchy for technical topics.
pub const DOMAIN_TECH_PROMPT: &str = r#"Domain guidance: technical research.

Trust sources in this order:
1. Official documentation, specifications, and release notes
2. Source repositories: code, changelogs, issue discussions by maintainers
3. Engineering blogs from teams operating the technology in production
4. Conference talks and peer benchmarks (prefer reproducible ones)
5. Aggregator threads and tutorials (use for leads, verify elsewhere)

Always record the version a claim applies to; behavior changes between releases.
Prefer primary benchmarks over quoted numbers."#;

/// Credibility hierarchy for policy and regulatory topics.
pub const DOMAIN_POLICY_PROMPT: &str = r#"Domain guidance: policy research.

Trust sources in this order:
1. Primary legal texts, regulator publications, and official gazettes
2. Peer-reviewed analysis and established policy institutes
3. Major outlets with dedicated legal or policy desks
4. Advocacy organizations (always label their stance)

Distinguish enacted law from proposals and from enforcement practice. Note the
jurisdiction and effective date of every rule you cite."#;

/// Credibility hierarchy for opinion and industry-direction topics.
pub const DOMAIN_THOUGHT_LEADERSHIP_PROMPT: &str = r#"Domain guidance: thought-leadership research.

Trust sources in this order:
1. Practitioners with a public track record in the area
2. Analysts who disclose their positions and methodology
3. Corporate publications (assume marketing intent until shown otherwise)

Separate evidence from opinion in everything you write down. When an author
predicts, record what they predicted before and how it aged."#;

/// Default guidance when no other domain matches.
pub const DOMAIN_GENERAL_PROMPT: &str = r#"Domain guidance: general research.

Trust sources in this order:
1. Reference works and primary documents
2. Reputable outlets with named authors and editorial standards
3. Specialist blogs and community resources

Triangulate: a claim backed by one source is a lead, not a finding. Prefer the
origin of a claim over places that merely repeat it."#;

const RESEARCH_REPLY_CONTRACT: &str = r#"Reply with strict JSON only, no other text:
{"overview": "<markdown>", "sources": "<markdown>", "notes": [{"name": "<short-hyphenated-name>", "content": "<markdown>"}]}"#;

const FOLLOW_UP_REPLY_CONTRACT: &str = r#"Reply with strict JSON only, no other text:
{"answer": "<markdown>", "note": {"name": "<short-hyphenated-name>", "content": "<markdown>"}}
Omit "note" unless the exchange produced something substantial enough to keep."#;

const SYNTHESIS_REPLY_CONTRACT: &str = r#"Reply with strict JSON only, no other text:
{"connections": "<markdown>", "patterns": "<markdown>", "tensions": "<markdown>", "questions": "<markdown>"}"#;

/// Builds the user prompt for one research run.
pub fn build_research_prompt(
    topic: &str,
    domain: Domain,
    prior: Option<&Entry>,
    max_search_results: u32,
    max_sources_to_fetch: u32,
) -> String {
    let mut prompt = format!(
        "Research topic: {}\nClassified domain: {}\n\n",
        topic,
        domain.label()
    );
    prompt.push_str(&format!(
        "Budgets: consult at most {} search results and fetch at most {} sources in full.\n\n",
        max_search_results, max_sources_to_fetch
    ));
    prompt.push_str(
        "Produce three markdown sections:\n\
         - overview: main summary and recommendations\n\
         - sources: every source consulted, with key excerpts\n\
         - notes: detailed notes on subtopics, each with a short hyphenated name\n\n",
    );
    if let Some(entry) = prior {
        prompt.push_str(&format!(
            "You have already researched this topic. Existing overview:\n\n{}\n\n\
             Build on the existing notes instead of repeating them.\n\n",
            entry.overview.trim_end()
        ));
    }
    prompt.push_str(RESEARCH_REPLY_CONTRACT);
    prompt
}

/// Builds the user prompt for a follow-up question, inlining the stored entry.
pub fn build_follow_up_prompt(topic: &str, question: &str, entry: &Entry) -> String {
    let mut prompt = format!(
        "Follow-up question about the researched topic '{}':\n\n{}\n\n",
        topic, question
    );
    prompt.push_str(&format!(
        "Stored overview:\n\n{}\n\n",
        entry.overview.trim_end()
    ));
    if let Some(sources) = &entry.sources {
        prompt.push_str(&format!("Stored sources:\n\n{}\n\n", sources.trim_end()));
    }
    for note in &entry.notes {
        prompt.push_str(&format!(
            "Stored note '{}':\n\n{}\n\n",
            note.name,
            note.content.trim_end()
        ));
    }
    prompt.push_str(
        "Answer from the stored research wherever possible; say so explicitly when it \
         cannot answer the question.\n\n",
    );
    prompt.push_str(FOLLOW_UP_REPLY_CONTRACT);
    prompt
}

/// Builds the user prompt for a synthesis run over the labeled aggregate text.
pub fn build_synthesis_prompt(aggregate: &str) -> String {
    format!(
        "Overviews of every researched topic follow, each labeled \"## Topic: <slug>\".\n\n{}\n\n{}",
        aggregate.trim_end(),
        SYNTHESIS_REPLY_CONTRACT
    )
}
