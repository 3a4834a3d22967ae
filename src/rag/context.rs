//! Context assembly from retrieved documents

use crate::cli::output::truncate_str;
use crate::models::Document;

/// Assembler for creating the generator's context from retrieved chunks
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    #[must_use]
    pub const fn max_context_length(&self) -> usize {
        self.max_context_length
    }

    /// Concatenate `[Document i]` blocks until the character budget is spent.
    ///
    /// Blocks are never cut; the first one that does not fit ends the context.
    #[must_use]
    pub fn assemble(&self, documents: &[Document]) -> String {
        self.assemble_counted(documents).0
    }

    /// Same as [`ContextAssembler::assemble`], also returning how many
    /// documents made it into the context
    #[must_use]
    pub fn assemble_counted(&self, documents: &[Document]) -> (String, usize) {
        let mut context = String::new();
        let mut total_length = 0;
        let mut used = 0;

        for (idx, document) in documents.iter().enumerate() {
            let entry = format!("\n[Document {}]{}\n{}\n", idx + 1, provenance(document), document.content());
            let entry_length = entry.chars().count();

            if total_length + entry_length > self.max_context_length {
                break;
            }

            context.push_str(&entry);
            total_length += entry_length;
            used += 1;
        }

        (context, used)
    }

    /// Create a short listing of the retrieved chunks
    #[must_use]
    pub fn create_summary(&self, documents: &[Document]) -> String {
        if documents.is_empty() {
            return "No documents found.".to_string();
        }

        let mut summary = format!("Found {} relevant chunk(s):\n\n", documents.len());
        for (idx, document) in documents.iter().enumerate().take(5) {
            summary.push_str(&format!(
                "{}.{}\n   {}\n\n",
                idx + 1,
                provenance(document),
                truncate_str(document.content(), 100)
            ));
        }
        summary
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(crate::config::default_max_context_length())
    }
}

/// " (source, page N)" with 1-based page numbers, or nothing
fn provenance(document: &Document) -> String {
    let meta = document.metadata();
    match (&meta.source, meta.page) {
        (Some(source), Some(page)) => format!(" ({source}, page {})", page + 1),
        (Some(source), None) => format!(" ({source})"),
        (None, Some(page)) => format!(" (page {})", page + 1),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMetadata;

    #[test]
    fn test_blocks_are_numbered_with_provenance() {
        let mut meta = DocumentMetadata::with_source("guide.md");
        meta.page = Some(0);
        let docs = vec![
            Document::new("first chunk", meta),
            Document::from_content("second chunk"),
        ];

        let context = ContextAssembler::default().assemble(&docs);
        assert!(context.contains("[Document 1] (guide.md, page 1)\nfirst chunk"));
        assert!(context.contains("[Document 2]\nsecond chunk"));
    }

    #[test]
    fn test_budget_stops_at_whole_block() {
        let docs = vec![
            Document::from_content("x".repeat(30)),
            Document::from_content("y".repeat(30)),
        ];
        // One block is 30 chars plus "\n[Document 1]\n" and a trailing newline
        let (context, used) = ContextAssembler::new(60).assemble_counted(&docs);
        assert_eq!(used, 1);
        assert!(context.contains(&"x".repeat(30)));
        assert!(!context.contains('y'));
    }

    #[test]
    fn test_budget_counts_chars_not_bytes() {
        let docs = vec![Document::from_content("检索增强生成")];
        let (_, used) = ContextAssembler::new(25).assemble_counted(&docs);
        assert_eq!(used, 1);
    }

    #[test]
    fn test_summary() {
        assert_eq!(ContextAssembler::default().create_summary(&[]), "No documents found.");
        let summary = ContextAssembler::default().create_summary(&[Document::from_content("chunk")]);
        assert!(summary.starts_with("Found 1 relevant chunk(s)"));
    }
}
