//! Filesystem-backed knowledge base store: one directory per topic slug.

use crate::reasoner::SynthesisReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const TOPICS_DIR: &str = "topics";
const SYNTHESIS_DIR: &str = "synthesis";
const NOTES_DIR: &str = "notes";
const OVERVIEW_FILE: &str = "overview.md";
const SOURCES_FILE: &str = "sources.md";
const INDEX_FILE: &str = "index.md";

/// The fixed synthesis output files, in write order.
pub(crate) const SYNTHESIS_FILES: [&str; 4] = [
    "connections.md",
    "patterns.md",
    "tensions.md",
    "questions.md",
];

/// Errors surfaced by the knowledge base store. Never retried internally; retry
/// policy, if any, belongs to the caller.
#[derive(Debug)]
pub enum KnowledgeError {
    /// Read of a slug that has no overview on disk.
    NotFound { slug: String },
    /// A note with this name already exists and overwrite was not requested.
    NoteConflict { slug: String, note: String },
    /// Underlying filesystem failure (permissions, disk full, ...).
    Storage(io::Error),
}

impl fmt::Display for KnowledgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnowledgeError::NotFound { slug } => {
                write!(f, "no research entry found for topic '{}'", slug)
            }
            KnowledgeError::NoteConflict { slug, note } => write!(
                f,
                "note '{}' already exists for topic '{}' (pass overwrite to replace it)",
                note, slug
            ),
            KnowledgeError::Storage(e) => write!(f, "knowledge base storage failure: {}", e),
        }
    }
}

impl std::error::Error for KnowledgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KnowledgeError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for KnowledgeError {
    fn from(e: io::Error) -> Self {
        KnowledgeError::Storage(e)
    }
}

/// One note file under a topic's `notes/` directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// File stem: the `{note-name}` part of `notes/{note-name}.md`.
    pub name: String,
    pub content: String,
}

/// Everything stored for one topic slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub slug: String,
    pub overview: String,
    /// `sources.md`, when the topic has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    /// Notes sorted by name. May be empty.
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Status snapshot of the store, for pre-flight checks and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStatus {
    pub root: String,
    pub topic_count: usize,
    pub synthesis_present: bool,
}

/// Filesystem store addressing one directory per topic slug under `{root}/topics/`.
///
/// Contents are opaque UTF-8 markdown; the store never inspects what it writes.
/// Slugs are expected to come from [`resolve_slug`](crate::resolve_slug); the store
/// does not normalize them.
pub struct KnowledgeStore {
    root: PathBuf,
}

impl KnowledgeStore {
    /// Opens the store at `root`, creating `topics/` and `synthesis/` if absent.
    pub fn open_path<P: AsRef<Path>>(root: P) -> Result<Self, KnowledgeError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(TOPICS_DIR))?;
        fs::create_dir_all(root.join(SYNTHESIS_DIR))?;
        Ok(Self { root })
    }

    /// Root directory of the knowledge base.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn topics_dir(&self) -> PathBuf {
        self.root.join(TOPICS_DIR)
    }

    fn synthesis_dir(&self) -> PathBuf {
        self.root.join(SYNTHESIS_DIR)
    }

    /// Directory owning all files for `slug`.
    pub fn entry_dir(&self, slug: &str) -> PathBuf {
        self.topics_dir().join(slug)
    }

    fn notes_dir(&self, slug: &str) -> PathBuf {
        self.entry_dir(slug).join(NOTES_DIR)
    }

    fn overview_path(&self, slug: &str) -> PathBuf {
        self.entry_dir(slug).join(OVERVIEW_FILE)
    }

    fn sources_path(&self, slug: &str) -> PathBuf {
        self.entry_dir(slug).join(SOURCES_FILE)
    }

    fn note_path(&self, slug: &str, note: &str) -> PathBuf {
        self.notes_dir(slug).join(format!("{}.md", note))
    }

    fn write_entry_file(
        &self,
        slug: &str,
        path: &Path,
        file: &str,
        content: &str,
    ) -> Result<(), KnowledgeError> {
        // Entry tree (including notes/) is guaranteed before any write path.
        fs::create_dir_all(self.notes_dir(slug))?;
        let existed = path.exists();
        fs::write(path, content)?;
        tracing::info!(
            target: "scry::knowledge",
            slug = slug,
            file = file,
            bytes = content.len(),
            action = if existed { "UPDATE" } else { "CREATE" },
            "{} {} for '{}' ({} bytes)",
            if existed { "updated" } else { "created" },
            file,
            slug,
            content.len()
        );
        Ok(())
    }

    /// Overwrites `overview.md` for `slug`, creating the entry tree if absent.
    pub fn write_overview(&self, slug: &str, content: &str) -> Result<(), KnowledgeError> {
        self.write_entry_file(slug, &self.overview_path(slug), OVERVIEW_FILE, content)
    }

    /// Overwrites `sources.md` for `slug`, creating the entry tree if absent.
    pub fn write_sources(&self, slug: &str, content: &str) -> Result<(), KnowledgeError> {
        self.write_entry_file(slug, &self.sources_path(slug), SOURCES_FILE, content)
    }

    /// Writes `notes/{note}.md` for `slug`, creating `notes/` if absent.
    ///
    /// Duplicate names are rejected with [`KnowledgeError::NoteConflict`] unless
    /// `overwrite` is set; there is no version-suffixing at this layer.
    pub fn append_note(
        &self,
        slug: &str,
        note: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<(), KnowledgeError> {
        fs::create_dir_all(self.notes_dir(slug))?;
        let path = self.note_path(slug, note);
        let existed = path.exists();
        if existed && !overwrite {
            return Err(KnowledgeError::NoteConflict {
                slug: slug.to_string(),
                note: note.to_string(),
            });
        }
        fs::write(&path, content)?;
        tracing::info!(
            target: "scry::knowledge",
            slug = slug,
            note = note,
            bytes = content.len(),
            action = if existed { "UPDATE" } else { "CREATE" },
            "{} note '{}' for '{}' ({} bytes)",
            if existed { "updated" } else { "created" },
            note,
            slug,
            content.len()
        );
        Ok(())
    }

    /// True when `slug` has an overview on disk.
    pub fn has_entry(&self, slug: &str) -> bool {
        self.overview_path(slug).is_file()
    }

    /// All slugs that currently have an `overview.md`, in lexical order.
    pub fn list_topics(&self) -> Result<Vec<String>, KnowledgeError> {
        let mut slugs = Vec::new();
        for dirent in fs::read_dir(self.topics_dir())? {
            let dirent = dirent?;
            if !dirent.file_type()?.is_dir() {
                continue;
            }
            let slug = match dirent.file_name().into_string() {
                Ok(s) => s,
                Err(_) => continue,
            };
            if self.has_entry(&slug) {
                slugs.push(slug);
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    /// Reads the full entry for `slug`.
    ///
    /// Fails with [`KnowledgeError::NotFound`] when no overview exists; `sources`
    /// may be absent and `notes` empty.
    pub fn read_entry(&self, slug: &str) -> Result<Entry, KnowledgeError> {
        let overview_path = self.overview_path(slug);
        if !overview_path.is_file() {
            return Err(KnowledgeError::NotFound {
                slug: slug.to_string(),
            });
        }
        let overview = fs::read_to_string(&overview_path)?;
        let sources = match fs::read_to_string(self.sources_path(slug)) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let mut notes = Vec::new();
        let notes_dir = self.notes_dir(slug);
        if notes_dir.is_dir() {
            for dirent in fs::read_dir(&notes_dir)? {
                let dirent = dirent?;
                let path = dirent.path();
                if path.extension().and_then(|e| e.to_str()) != Some("md") {
                    continue;
                }
                let name = match path.file_stem().and_then(|s| s.to_str()) {
                    Some(s) => s.to_string(),
                    None => continue,
                };
                let content = fs::read_to_string(&path)?;
                notes.push(Note { name, content });
            }
        }
        notes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Entry {
            slug: slug.to_string(),
            overview,
            sources,
            notes,
        })
    }

    /// Overwrites the four synthesis files from `report`, in full.
    pub fn write_synthesis(&self, report: &SynthesisReport) -> Result<(), KnowledgeError> {
        fs::create_dir_all(self.synthesis_dir())?;
        let sections = [
            (SYNTHESIS_FILES[0], &report.connections),
            (SYNTHESIS_FILES[1], &report.patterns),
            (SYNTHESIS_FILES[2], &report.tensions),
            (SYNTHESIS_FILES[3], &report.questions),
        ];
        for (file, content) in sections {
            fs::write(self.synthesis_dir().join(file), content)?;
            tracing::info!(
                target: "scry::knowledge",
                file = file,
                bytes = content.len(),
                "synthesis file {} written ({} bytes)",
                file,
                content.len()
            );
        }
        Ok(())
    }

    /// True when all four synthesis files are present.
    pub fn synthesis_present(&self) -> bool {
        SYNTHESIS_FILES
            .iter()
            .all(|f| self.synthesis_dir().join(f).is_file())
    }

    /// Regenerates `{root}/index.md` from the current topic list.
    pub fn write_index(&self) -> Result<(), KnowledgeError> {
        let slugs = self.list_topics()?;
        let mut out = String::from("# Research Index\n\n");
        if slugs.is_empty() {
            out.push_str("No topics researched yet.\n");
        } else {
            for slug in &slugs {
                out.push_str(&format!("- [{}](topics/{}/overview.md)\n", slug, slug));
            }
        }
        fs::write(self.root.join(INDEX_FILE), out)?;
        Ok(())
    }

    /// Status snapshot used by the CLI and the pre-flight check.
    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            root: self.root.display().to_string(),
            topic_count: self.list_topics().map(|v| v.len()).unwrap_or(0),
            synthesis_present: self.synthesis_present(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store(dir: &tempfile::TempDir) -> KnowledgeStore {
        KnowledgeStore::open_path(dir.path().join("research")).unwrap()
    }

    #[test]
    fn open_creates_layout() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        assert!(store.root().join("topics").is_dir());
        assert!(store.root().join("synthesis").is_dir());
    }

    #[test]
    fn overview_round_trips() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("mcp-servers", "# Overview\n\nBody.\n").unwrap();
        let entry = store.read_entry("mcp-servers").unwrap();
        assert_eq!(entry.overview, "# Overview\n\nBody.\n");
        assert!(entry.sources.is_none());
        assert!(entry.notes.is_empty());
    }

    #[test]
    fn read_entry_of_unwritten_slug_is_not_found() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        match store.read_entry("ghost") {
            Err(KnowledgeError::NotFound { slug }) => assert_eq!(slug, "ghost"),
            other => panic!("expected NotFound, got {:?}", other.map(|e| e.slug)),
        }
    }

    #[test]
    fn overview_is_overwritten_on_update() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("t", "first").unwrap();
        store.write_overview("t", "second").unwrap();
        assert_eq!(store.read_entry("t").unwrap().overview, "second");
    }

    #[test]
    fn duplicate_note_is_rejected_and_unchanged() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("t", "o").unwrap();
        store.append_note("t", "findings", "first", false).unwrap();
        match store.append_note("t", "findings", "second", false) {
            Err(KnowledgeError::NoteConflict { slug, note }) => {
                assert_eq!(slug, "t");
                assert_eq!(note, "findings");
            }
            other => panic!("expected NoteConflict, got {:?}", other),
        }
        let entry = store.read_entry("t").unwrap();
        assert_eq!(entry.notes.len(), 1);
        assert_eq!(entry.notes[0].content, "first");
    }

    #[test]
    fn note_overwrite_is_explicit() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("t", "o").unwrap();
        store.append_note("t", "findings", "first", false).unwrap();
        store.append_note("t", "findings", "second", true).unwrap();
        assert_eq!(store.read_entry("t").unwrap().notes[0].content, "second");
    }

    #[test]
    fn notes_are_sorted_by_name() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("t", "o").unwrap();
        store.append_note("t", "zebra", "z", false).unwrap();
        store.append_note("t", "alpha", "a", false).unwrap();
        let names: Vec<String> = store
            .read_entry("t")
            .unwrap()
            .notes
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, ["alpha", "zebra"]);
    }

    #[test]
    fn list_topics_is_sorted_regardless_of_write_order() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("b", "o").unwrap();
        store.write_overview("a", "o").unwrap();
        assert_eq!(store.list_topics().unwrap(), ["a", "b"]);
    }

    #[test]
    fn list_topics_skips_directories_without_overview() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("real", "o").unwrap();
        // Sources alone do not make an entry listable.
        store.write_sources("draft", "s").unwrap();
        assert_eq!(store.list_topics().unwrap(), ["real"]);
    }

    #[test]
    fn synthesis_files_written_in_full() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        let report = SynthesisReport {
            connections: "c".to_string(),
            patterns: "p".to_string(),
            tensions: "t".to_string(),
            questions: "q".to_string(),
            cost_usd: None,
        };
        assert!(!store.synthesis_present());
        store.write_synthesis(&report).unwrap();
        assert!(store.synthesis_present());
        let read = fs::read_to_string(store.root().join("synthesis/patterns.md")).unwrap();
        assert_eq!(read, "p");
    }

    #[test]
    fn index_lists_topics_in_order() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("beta", "o").unwrap();
        store.write_overview("alpha", "o").unwrap();
        store.write_index().unwrap();
        let index = fs::read_to_string(store.root().join("index.md")).unwrap();
        let alpha = index.find("[alpha]").unwrap();
        let beta = index.find("[beta]").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn status_counts_topics() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.write_overview("a", "o").unwrap();
        let status = store.status();
        assert_eq!(status.topic_count, 1);
        assert!(!status.synthesis_present);
    }
}
