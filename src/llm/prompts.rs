//! Prompt templates for answering, HyDE and query expansion

/// Build the answer prompt from assembled context
pub fn build_rag_prompt(question: &str, context: &str) -> String {
    format!(
        r"You are an assistant answering questions about a document collection.

Context: The following passages were retrieved from the collection:

{context}

Question: {question}

Instructions:
1. Answer using only the passages above
2. If the passages don't contain the answer, say so clearly
3. Be concise but complete

Answer:"
    )
}

/// Build the prompt asking for a hypothetical answer passage
pub fn build_hyde_prompt(question: &str) -> String {
    format!(
        r"Write a concise, clear and fact-rich paragraph that answers the question below.
The paragraph will be used to search for related documents.

Question: {question}

Paragraph:"
    )
}

/// Build the prompt asking for alternative phrasings of a question
pub fn build_expansion_prompt(question: &str, count: usize) -> String {
    format!(
        r"You are an information retrieval assistant.
Given the original question, write {count} different, more specific related questions
that cover other angles or keywords of the same information need.
Write one question per line, without numbering or prefixes.

Original question:
{question}

Related questions:"
    )
}

/// Split generated text into non-empty lines, dropping list markers
pub fn parse_line_list(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);

    // "1." / "2)" style numbering
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim();
        }
    }
    line.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_prompt_contains_inputs() {
        let prompt = build_rag_prompt("What is ARES?", "[Document 1]\nARES is a framework");
        assert!(prompt.contains("Question: What is ARES?"));
        assert!(prompt.contains("ARES is a framework"));
    }

    #[test]
    fn test_expansion_prompt_mentions_count() {
        assert!(build_expansion_prompt("q", 3).contains("write 3 different"));
    }

    #[test]
    fn test_parse_line_list() {
        let text = "1. How does BM25 work?\n\n- What is IDF?\n  2) Why fuse rankings?  \n   \nplain line";
        assert_eq!(
            parse_line_list(text),
            vec![
                "How does BM25 work?",
                "What is IDF?",
                "Why fuse rankings?",
                "plain line"
            ]
        );
    }

    #[test]
    fn test_parse_line_list_keeps_leading_numbers_without_marker() {
        assert_eq!(parse_line_list("2024 results?"), vec!["2024 results?"]);
    }
}
