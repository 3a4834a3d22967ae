//! Chunk corpus shared by the lexical and vector retrievers
//!
//! Source files are split into pages on form feed (the page separator emitted
//! by PDF-to-text tools). Markdown pages are further cut into heading
//! sections. Each page or section is chunked with [`TextSplitter`], and every
//! chunk keeps its source path, page, heading path and per-source position.

pub mod markdown;
pub mod splitter;
pub mod tokenizer;

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::info;
use tracing::warn;

pub use markdown::HeaderSplitter;
pub use markdown::MarkdownSection;
pub use splitter::TextSplitter;
pub use tokenizer::tokenize;

use crate::errors::RagBenchError;
use crate::models::Document;
use crate::models::DocumentMetadata;
use crate::Result;

const PAGE_BREAK: char = '\u{c}';
const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];
const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    fingerprint: String,
    documents: Vec<Document>,
}

impl Corpus {
    /// Build a corpus from chunks, dropping repeated contents (first wins)
    pub fn new(documents: Vec<Document>) -> Self {
        let mut seen = HashSet::with_capacity(documents.len());
        let documents: Vec<Document> = documents
            .into_iter()
            .filter(|doc| !doc.content().trim().is_empty())
            .filter(|doc| seen.insert(doc.identity().to_string()))
            .collect();
        let fingerprint = fingerprint_of(&documents);
        Self {
            fingerprint,
            documents,
        }
    }

    /// Load and chunk every supported file under `dir`, in sorted path order
    pub fn from_directory(dir: &Path, splitter: &TextSplitter) -> Result<Self> {
        let files = collect_source_files(dir)?;
        if files.is_empty() {
            return Err(RagBenchError::InvalidParameter(format!(
                "no .txt or .md files found under {}",
                dir.display()
            )));
        }

        let mut documents = Vec::new();
        for path in &files {
            let text = std::fs::read_to_string(path)?;
            let source = path.display().to_string();
            let chunks = chunk_source(&source, &text, splitter);
            debug!("{}: {} chunks", source, chunks.len());
            documents.extend(chunks);
        }

        let corpus = Self::new(documents);
        if corpus.is_empty() {
            return Err(RagBenchError::InvalidParameter(format!(
                "source files under {} contain no text",
                dir.display()
            )));
        }

        info!(
            "Loaded {} chunks from {} files (fingerprint {})",
            corpus.len(),
            files.len(),
            corpus.short_fingerprint()
        );
        Ok(corpus)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagBenchError::AdapterUnavailable(format!(
                "corpus file {} not found; run `ragbench index` first",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let stored: Self = serde_json::from_str(&content)?;

        let expected = fingerprint_of(&stored.documents);
        if expected != stored.fingerprint {
            warn!(
                "Corpus file {} has a stale fingerprint; recomputing",
                path.display()
            );
        }
        Ok(Self {
            fingerprint: expected,
            documents: stored.documents,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        info!("Saved corpus ({} chunks) to {}", self.len(), path.display());
        Ok(())
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Hex SHA-256 over chunk contents in order
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn short_fingerprint(&self) -> &str {
        &self.fingerprint[..self.fingerprint.len().min(12)]
    }

    /// Token lists aligned 1:1 with [`Corpus::documents`]
    pub fn tokenized(&self) -> Vec<Vec<String>> {
        self.documents
            .iter()
            .map(|doc| tokenize(doc.content()))
            .collect()
    }
}

/// Chunk one source text, tagging each chunk with its provenance.
///
/// Markdown sources (by extension) record their heading path in
/// `metadata.extra` under "Header 1" .. "Header 3".
pub fn chunk_source(source: &str, text: &str, splitter: &TextSplitter) -> Vec<Document> {
    let mut headers =
        has_extension(Path::new(source), &MARKDOWN_EXTENSIONS).then(HeaderSplitter::new);
    let mut documents = Vec::new();
    let mut chunk_index = 0usize;

    for (page, page_text) in text.split(PAGE_BREAK).enumerate() {
        let sections = match headers.as_mut() {
            Some(headers) => headers.split(page_text),
            None => vec![MarkdownSection::plain(page_text)],
        };

        for section in sections {
            for chunk in splitter.split(&section.text) {
                let metadata = DocumentMetadata {
                    source: Some(source.to_string()),
                    page: Some(page as u32),
                    chunk_index: Some(chunk_index),
                    extra: section.heading_metadata(),
                };
                documents.push(Document::new(chunk, metadata));
                chunk_index += 1;
            }
        }
    }

    documents
}

fn fingerprint_of(documents: &[Document]) -> String {
    let mut hasher = Sha256::new();
    for doc in documents {
        hasher.update(doc.content().as_bytes());
        // Separator so ["ab", "c"] and ["a", "bc"] differ
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn collect_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(RagBenchError::InvalidParameter(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_supported(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    has_extension(path, &SUPPORTED_EXTENSIONS)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}
