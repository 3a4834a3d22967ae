//! Header-aware Markdown sectioning
//!
//! `#`, `##` and `###` headings open a new section. Each section remembers
//! its heading path ("Header 1" .. "Header 3") so chunks cut from it keep
//! their place in the document outline. Heading lines are removed from the
//! section text and lines inside fenced code blocks are never headings.

use std::collections::BTreeMap;

/// Deepest heading level that opens a section
pub const MAX_HEADING_LEVEL: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownSection {
    /// Enclosing headings as `(level, title)`, outermost first
    pub headings: Vec<(usize, String)>,
    pub text: String,
}

impl MarkdownSection {
    /// Section without any heading context
    pub fn plain(text: &str) -> Self {
        Self {
            headings: Vec::new(),
            text: text.to_string(),
        }
    }

    /// `"Header N" -> title` entries for [`DocumentMetadata::extra`](crate::models::DocumentMetadata)
    pub fn heading_metadata(&self) -> BTreeMap<String, String> {
        self.headings
            .iter()
            .map(|(level, title)| (format!("Header {level}"), title.clone()))
            .collect()
    }
}

/// Splits Markdown into sections, carrying the heading path across calls so
/// a document can be fed page by page
#[derive(Debug, Default)]
pub struct HeaderSplitter {
    headings: Vec<(usize, String)>,
    fence: Option<&'static str>,
}

impl HeaderSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn split(&mut self, text: &str) -> Vec<MarkdownSection> {
        let mut sections = Vec::new();
        let mut lines: Vec<&str> = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim_start();
            if let Some(marker) = fence_marker(trimmed) {
                self.fence = match self.fence {
                    Some(open) if open == marker => None,
                    None => Some(marker),
                    other => other,
                };
                lines.push(line);
                continue;
            }

            if self.fence.is_none() {
                if let Some((level, title)) = parse_heading(trimmed) {
                    self.flush(&mut sections, &mut lines);
                    self.headings.retain(|(open, _)| *open < level);
                    self.headings.push((level, title.to_string()));
                    continue;
                }
            }
            lines.push(line);
        }

        self.flush(&mut sections, &mut lines);
        sections
    }

    fn flush(&self, sections: &mut Vec<MarkdownSection>, lines: &mut Vec<&str>) {
        let text = lines.join("\n");
        lines.clear();
        if !text.trim().is_empty() {
            sections.push(MarkdownSection {
                headings: self.headings.clone(),
                text,
            });
        }
    }
}

fn fence_marker(line: &str) -> Option<&'static str> {
    if line.starts_with("```") {
        Some("```")
    } else if line.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &line[level..];
    // "#tag" is not a heading
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim_end();
    if title.is_empty() {
        None
    } else {
        Some((level, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUIDE: &str = "# RAG Project

## Module 1: Data Processing

Details about data processing.

### Step 1.1: Loading

PDF, TXT and Markdown are supported.

### Step 1.2: Splitting

Splitting is a key step.

## Module 2: Retrieval

Retrieval should be fast and accurate.
";

    fn titles(section: &MarkdownSection) -> Vec<&str> {
        section.headings.iter().map(|(_, title)| title.as_str()).collect()
    }

    #[test]
    fn test_sections_carry_heading_path() {
        let sections = HeaderSplitter::new().split(GUIDE);

        assert_eq!(sections.len(), 4);
        assert_eq!(titles(&sections[0]), vec!["RAG Project", "Module 1: Data Processing"]);
        assert_eq!(sections[0].text.trim(), "Details about data processing.");
        assert_eq!(
            titles(&sections[2]),
            vec!["RAG Project", "Module 1: Data Processing", "Step 1.2: Splitting"]
        );
        // A level-2 heading closes the open level-3 one
        assert_eq!(titles(&sections[3]), vec!["RAG Project", "Module 2: Retrieval"]);
        assert!(sections.iter().all(|s| !s.text.contains('#')));
    }

    #[test]
    fn test_heading_metadata_keys() {
        let sections = HeaderSplitter::new().split(GUIDE);
        let metadata = sections[1].heading_metadata();

        assert_eq!(metadata.get("Header 1").map(String::as_str), Some("RAG Project"));
        assert_eq!(metadata.get("Header 3").map(String::as_str), Some("Step 1.1: Loading"));
        assert_eq!(metadata.len(), 3);
    }

    #[test]
    fn test_code_fences_and_non_headings_stay_text() {
        let text = "# Setup\n\n```sh\n# install deps\nmake\n```\n#hashtag\n#### Deep heading\nbody";
        let sections = HeaderSplitter::new().split(text);

        assert_eq!(sections.len(), 1);
        assert!(sections[0].text.contains("# install deps"));
        assert!(sections[0].text.contains("#hashtag"));
        assert!(sections[0].text.contains("#### Deep heading"));
        assert_eq!(titles(&sections[0]), vec!["Setup"]);
    }

    #[test]
    fn test_headings_persist_across_calls() {
        let mut splitter = HeaderSplitter::new();
        splitter.split("# Chapter\n\nfirst page");
        let next = splitter.split("second page");

        assert_eq!(next.len(), 1);
        assert_eq!(titles(&next[0]), vec!["Chapter"]);
    }

    #[test]
    fn test_closing_hashes_trimmed() {
        assert_eq!(parse_heading("## Title ##"), Some((2, "Title")));
        assert_eq!(parse_heading("#"), None);
        assert_eq!(parse_heading("plain"), None);
    }
}
