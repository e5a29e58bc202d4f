//! Interactive researcher CLI: entry point for Scry. Config-driven via ResearchConfig.
//!
//! Commands: `research <topic>`, `follow <topic>`, `synthesize`, `topics`,
//! `show <topic>`, `quit`. A bare line with no known verb is treated as a research
//! topic. `--verify` runs a pre-flight check and exits.

use scry_core::{
    resolve_slug, synthesize, KnowledgeStore, ResearchConfig, SynthesisOutcome,
};
use scry_skills::{run_follow_up, run_research, LlmMode, LlmRouter};
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BANNER_WIDTH: usize = 60;

/// One REPL command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Research { topic: String },
    Follow { topic: String },
    Synthesize,
    Topics,
    Show { topic: String },
    Help,
    Quit,
}

/// Parses a REPL line. Empty lines parse to None; a line with no known verb is a
/// research topic (matching the original interactive behavior).
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };
    let command = match verb.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        "synthesize" | "synth" => Command::Synthesize,
        "topics" | "list" => Command::Topics,
        "research" => {
            if rest.is_empty() {
                Command::Help
            } else {
                Command::Research {
                    topic: rest.to_string(),
                }
            }
        }
        "follow" => {
            if rest.is_empty() {
                Command::Help
            } else {
                Command::Follow {
                    topic: rest.to_string(),
                }
            }
        }
        "show" => {
            if rest.is_empty() {
                Command::Help
            } else {
                Command::Show {
                    topic: rest.to_string(),
                }
            }
        }
        _ => Command::Research {
            topic: line.to_string(),
        },
    };
    Some(command)
}

fn print_banner(config: &ResearchConfig) {
    let rule = "=".repeat(BANNER_WIDTH);
    println!("\n{}", rule);
    println!("{}", config.app_name);
    println!("{}", rule);
    println!("\nCommands:");
    println!("  research <topic>  - Start or refresh research on a topic");
    println!("  follow <topic>    - Ask follow-up questions against stored notes");
    println!("  synthesize        - Cross-topic synthesis over every overview");
    println!("  topics            - List researched topics");
    println!("  show <topic>      - Print a stored entry");
    println!("  quit              - Exit");
    println!("\nExamples:");
    println!("  research Compare MCP servers for Postgres access");
    println!("  follow compare-mcp-servers-for-postgres-access");
    println!();
}

async fn do_research(
    config: &ResearchConfig,
    store: &KnowledgeStore,
    router: &LlmRouter,
    topic: &str,
) {
    let rule = "=".repeat(BANNER_WIDTH);
    println!("\n{}", rule);
    println!("Research Topic: {}", topic);
    println!(
        "Output Directory: {}",
        store.entry_dir(&resolve_slug(topic)).display()
    );
    println!("{}\n", rule);

    match run_research(store, router, config, topic).await {
        Ok(summary) => {
            println!("Research complete!");
            println!(
                "  slug: {}\n  domain: {}\n  notes written: {}",
                summary.slug,
                summary.domain.label(),
                summary.notes_written
            );
            if let Some(cost) = summary.cost_usd {
                println!("  cost: ${:.4}", cost);
            }
        }
        Err(e) => eprintln!("research failed: {}", e),
    }
}

/// Interactive follow-up loop for one topic. Reads questions until `done`/`quit`
/// or an empty line.
async fn follow_session(
    store: &KnowledgeStore,
    router: &LlmRouter,
    topic: &str,
    lines: &mut Lines<BufReader<Stdin>>,
) {
    let slug = resolve_slug(topic);
    if !store.has_entry(&slug) {
        println!("No existing research found for topic: {}", topic);
        println!("Run initial research first.");
        return;
    }

    println!("\nFollow-up session for '{}'. Type 'done' to exit.\n", slug);
    loop {
        print!("Follow-up: ");
        std::io::stdout().flush().ok();
        let question = match lines.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) | Err(_) => break,
        };
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "done" | "quit" | "exit") {
            println!("Session ended.");
            break;
        }
        match run_follow_up(store, router, topic, &question).await {
            Ok(summary) => {
                println!("\n{}\n", summary.answer);
                if let Some(note) = summary.note_written {
                    println!("[Saved note: {}]", note);
                }
                if let Some(cost) = summary.cost_usd {
                    println!("[Cost: ${:.4}]", cost);
                }
            }
            Err(e) => eprintln!("follow-up failed: {}", e),
        }
    }
}

async fn do_synthesize(store: &KnowledgeStore, router: &LlmRouter) {
    match synthesize(store, router).await {
        Ok(SynthesisOutcome::Empty) => {
            println!("No topics researched yet; synthesis skipped.");
        }
        Ok(SynthesisOutcome::Written { topics }) => {
            println!("Synthesis written across {} topics.", topics);
            println!(
                "Reports: {}",
                store.root().join("synthesis").display()
            );
        }
        Err(e) => eprintln!("synthesis failed: {}", e),
    }
}

fn do_topics(store: &KnowledgeStore) {
    match store.list_topics() {
        Ok(slugs) if slugs.is_empty() => println!("No topics researched yet."),
        Ok(slugs) => {
            for slug in slugs {
                println!("  {}", slug);
            }
        }
        Err(e) => eprintln!("listing topics failed: {}", e),
    }
}

fn do_show(store: &KnowledgeStore, topic: &str) {
    let slug = resolve_slug(topic);
    match store.read_entry(&slug) {
        Ok(entry) => {
            println!("\n{}", entry.overview.trim_end());
            if entry.sources.is_some() {
                println!("\n[sources.md present]");
            }
            if !entry.notes.is_empty() {
                let names: Vec<&str> = entry.notes.iter().map(|n| n.name.as_str()).collect();
                println!("[notes: {}]", names.join(", "));
            }
            println!();
        }
        Err(e) => eprintln!("{}", e),
    }
}

/// Pre-flight check: config loads, knowledge root is writable, reasoner mode is sane.
fn run_verify() -> Result<(), String> {
    let config = ResearchConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking research root {} ... ", config.research_root);
    let store = KnowledgeStore::open_path(config.research_root_path())
        .map_err(|e| format!("research root inaccessible: {}", e))?;
    let status = store.status();
    println!(
        "OK ({} topics, synthesis {})",
        status.topic_count,
        if status.synthesis_present {
            "present"
        } else {
            "absent"
        }
    );

    print!("Checking write access... ");
    let probe = config.research_root_path().join(".scry_probe");
    std::fs::write(&probe, b"probe").map_err(|e| format!("research root not writable: {}", e))?;
    std::fs::remove_file(&probe).map_err(|e| format!("probe cleanup failed: {}", e))?;
    println!("OK");

    print!("Checking LLM mode '{}' ... ", config.llm_mode);
    match LlmMode::from_config(&config.llm_mode) {
        LlmMode::Live => println!("OK (live; requires SCRY_LLM_API_URL and SCRY_LLM_API_KEY)"),
        LlmMode::Mock => println!("OK (mock, no API calls)"),
    }

    println!("\n✅ SUCCESS: All systems GO. Ready to research.");
    Ok(())
}

async fn dispatch(
    command: Command,
    config: &ResearchConfig,
    store: &KnowledgeStore,
    router: &LlmRouter,
    lines: &mut Lines<BufReader<Stdin>>,
) -> bool {
    match command {
        Command::Quit => {
            println!("Goodbye!");
            return false;
        }
        Command::Help => print_banner(config),
        Command::Research { topic } => do_research(config, store, router, &topic).await,
        Command::Follow { topic } => follow_session(store, router, &topic, lines).await,
        Command::Synthesize => do_synthesize(store, router).await,
        Command::Topics => do_topics(store),
        Command::Show { topic } => do_show(store, &topic),
    }
    true
}

async fn interactive_session(
    config: &ResearchConfig,
    store: &KnowledgeStore,
    router: &LlmRouter,
    lines: &mut Lines<BufReader<Stdin>>,
) {
    print_banner(config);
    loop {
        print!(">>> ");
        std::io::stdout().flush().ok();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => {
                println!("\nGoodbye!");
                break;
            }
        };
        let command = match parse_command(&line) {
            Some(command) => command,
            None => continue,
        };
        if !dispatch(command, config, store, router, lines).await {
            break;
        }
        println!("\nReady for next command.\n");
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[scry-cli] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("❌ PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ResearchConfig::load().expect("load ResearchConfig");
    let store = KnowledgeStore::open_path(config.research_root_path())
        .expect("open knowledge base root");
    let router = LlmRouter::with_mode(LlmMode::from_config(&config.llm_mode));
    tracing::info!(
        target: "scry::cli",
        root = %store.root().display(),
        mode = ?router.mode(),
        "researcher ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if args.is_empty() {
        interactive_session(&config, &store, &router, &mut lines).await;
        return;
    }

    // One-shot mode: `scry-cli research <topic>`, `scry-cli follow <topic>`,
    // `scry-cli synthesize`, or a bare topic.
    let line = args.join(" ");
    if let Some(command) = parse_command(&line) {
        dispatch(command, &config, &store, &router, &mut lines).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_parse_to_commands() {
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("  exit  "), Some(Command::Quit));
        assert_eq!(parse_command("synthesize"), Some(Command::Synthesize));
        assert_eq!(parse_command("topics"), Some(Command::Topics));
        assert_eq!(
            parse_command("research Rust async runtimes"),
            Some(Command::Research {
                topic: "Rust async runtimes".to_string()
            })
        );
        assert_eq!(
            parse_command("follow rust-async-runtimes"),
            Some(Command::Follow {
                topic: "rust-async-runtimes".to_string()
            })
        );
        assert_eq!(
            parse_command("show rust-async-runtimes"),
            Some(Command::Show {
                topic: "rust-async-runtimes".to_string()
            })
        );
    }

    #[test]
    fn bare_line_is_a_research_topic() {
        assert_eq!(
            parse_command("Compare MCP servers for Postgres access"),
            Some(Command::Research {
                topic: "Compare MCP servers for Postgres access".to_string()
            })
        );
    }

    #[test]
    fn empty_line_parses_to_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn verbs_without_arguments_show_help() {
        assert_eq!(parse_command("research"), Some(Command::Help));
        assert_eq!(parse_command("follow"), Some(Command::Help));
        assert_eq!(parse_command("show"), Some(Command::Help));
    }
}
