//! Line-delimited JSON datasets

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::Result;

/// Parse every line of a JSONL file.
///
/// Blank lines are ignored. Lines that fail to parse are logged with their
/// line number and skipped.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                warn!("{}:{}: skipping malformed record: {}", path.display(), idx + 1, e);
            }
        }
    }

    debug!(
        "Read {} records from {} ({} skipped)",
        records.len(),
        path.display(),
        skipped
    );
    Ok(records)
}

/// Appends one compact JSON object per line
pub struct JsonlWriter {
    writer: BufWriter<File>,
}

impl JsonlWriter {
    /// Open `path` for appending, creating it if needed
    pub fn append(path: &Path) -> Result<Self> {
        Self::open(path, OpenOptions::new().create(true).append(true))
    }

    /// Create or truncate `path`
    pub fn create(path: &Path) -> Result<Self> {
        Self::open(path, OpenOptions::new().create(true).write(true).truncate(true))
    }

    fn open(path: &Path, options: &OpenOptions) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            writer: BufWriter::new(options.open(path)?),
        })
    }

    /// Write one record and flush it to disk
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvaluationRecord;
    use crate::models::GoldenRecord;

    fn record(question: &str) -> EvaluationRecord {
        EvaluationRecord {
            question: question.to_string(),
            ground_truth_contexts: vec!["上下文".to_string()],
            ground_truth_answer: "答案".to_string(),
            retrieved_contexts: vec!["检索结果".to_string()],
            generated_answer: "生成的答案".to_string(),
        }
    }

    #[test]
    fn test_writer_keeps_non_ascii_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        let mut writer = JsonlWriter::create(&path).unwrap();
        writer.write_record(&record("什么是RRF?")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("什么是RRF?"));
        assert!(!content.contains("\\u"));
        assert!(content.starts_with(
            r#"{"question":"什么是RRF?","ground_truth_contexts":["上下文"],"ground_truth_answer":"答案","retrieved_contexts":"#
        ));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_append_vs_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.jsonl");

        JsonlWriter::create(&path).unwrap().write_record(&record("q1")).unwrap();
        JsonlWriter::append(&path).unwrap().write_record(&record("q2")).unwrap();
        let records: Vec<EvaluationRecord> = read_jsonl(&path).unwrap();
        assert_eq!(records.len(), 2);

        JsonlWriter::create(&path).unwrap().write_record(&record("q3")).unwrap();
        let records: Vec<EvaluationRecord> = read_jsonl(&path).unwrap();
        assert_eq!(records, vec![record("q3")]);
    }

    #[test]
    fn test_reader_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("golden.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"question":"Q1","ground_truth_contexts":["c"],"ground_truth_answer":"A1"}"#,
                "\n",
                "not json\n",
                "\n",
                r#"{"question":"Q2"}"#,
                "\n",
                r#"{"question":"Q3","ground_truth_contexts":[],"ground_truth_answer":"A3"}"#,
                "\n"
            ),
        )
        .unwrap();

        let records: Vec<GoldenRecord> = read_jsonl(&path).unwrap();
        let questions: Vec<&str> = records.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["Q1", "Q3"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Vec<GoldenRecord>> = read_jsonl(&dir.path().join("missing.jsonl"));
        assert!(matches!(result, Err(crate::errors::RagBenchError::Io(_))));
    }
}
