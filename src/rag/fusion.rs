//! Reciprocal Rank Fusion: score = Σ 1/(k + rank_i)
//!
//! Combines ranked lists from heterogeneous retrievers into a single ranking
//! without normalizing their native scores. A document found by several
//! retrievers accumulates one contribution per list.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::Document;
use crate::models::RankedList;

/// Standard RRF damping constant
pub const DEFAULT_RRF_K: u32 = 60;

/// A document after fusion together with its accumulated score
#[derive(Debug, Clone, PartialEq)]
pub struct FusedDocument {
    pub document: Document,
    pub score: f64,
}

/// Fuse ranked lists and return the deduplicated documents, best first.
///
/// The full ranking is returned; truncation is up to the caller.
pub fn fuse(lists: &[RankedList], k_constant: u32) -> Vec<Document> {
    fuse_scored(lists, k_constant)
        .into_iter()
        .map(|fused| fused.document)
        .collect()
}

/// Same ordering as [`fuse`], keeping the fused scores.
///
/// Equal scores keep first-encounter order: lists are scanned in input order
/// and each list in rank order. When the same content carries different
/// metadata in two lists, the first occurrence is the one returned.
pub fn fuse_scored(lists: &[RankedList], k_constant: u32) -> Vec<FusedDocument> {
    let k = f64::from(k_constant);

    // Slot per identity in first-encounter order
    let mut slots: Vec<FusedDocument> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for list in lists {
        for (rank, doc) in list.ranked() {
            let contribution = 1.0 / (k + rank as f64);
            match positions.get(doc.identity()) {
                Some(&slot) => slots[slot].score += contribution,
                None => {
                    positions.insert(doc.identity(), slots.len());
                    slots.push(FusedDocument {
                        document: doc.clone(),
                        score: contribution,
                    });
                }
            }
        }
    }

    // Stable sort keeps first-encounter order among ties
    slots.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMetadata;

    fn list(source: &str, contents: &[&str]) -> RankedList {
        RankedList::new(
            source,
            contents.iter().map(|c| Document::from_content(*c)).collect(),
        )
        .unwrap()
    }

    fn contents(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(Document::content).collect()
    }

    #[test]
    fn test_consensus_bonus() {
        let lists = vec![list("bm25", &["A", "B", "C"]), list("vector", &["A", "D", "E"])];
        let fused = fuse_scored(&lists, DEFAULT_RRF_K);

        let order: Vec<&str> = fused.iter().map(|f| f.document.content()).collect();
        assert_eq!(order, vec!["A", "B", "D", "C", "E"]);
        assert!((fused[0].score - 2.0 / 61.0).abs() < 1e-12);
        assert!((fused[1].score - 1.0 / 62.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_tie_uses_first_encounter() {
        let lists = vec![list("bm25", &["X", "Y"]), list("vector", &["Y", "X"])];
        let fused = fuse_scored(&lists, DEFAULT_RRF_K);

        assert_eq!(fused[0].score, fused[1].score);
        assert_eq!(fused[0].document.content(), "X");
        assert_eq!(fused[1].document.content(), "Y");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(fuse(&[], DEFAULT_RRF_K).is_empty());

        let lists = vec![RankedList::empty("bm25"), list("vector", &["A"])];
        assert_eq!(contents(&fuse(&lists, DEFAULT_RRF_K)), vec!["A"]);
    }

    #[test]
    fn test_single_list_keeps_order() {
        let input = list("bm25", &["c", "a", "d", "b"]);
        let fused = fuse(std::slice::from_ref(&input), DEFAULT_RRF_K);
        assert_eq!(fused, input.documents());
    }

    #[test]
    fn test_first_occurrence_metadata_wins() {
        let first = Document::new("same", DocumentMetadata::with_source("page-1"));
        let second = Document::new("same", DocumentMetadata::with_source("page-2"));
        let lists = vec![
            RankedList::new("bm25", vec![first.clone()]).unwrap(),
            RankedList::new("vector", vec![second]).unwrap(),
        ];

        let fused = fuse(&lists, DEFAULT_RRF_K);
        assert_eq!(fused, vec![first]);
    }

    #[test]
    fn test_k_constant_is_configurable() {
        // With k = 0 every identity here scores exactly 1.0, so encounter order decides
        let lists = vec![list("a", &["top", "mid"]), list("b", &["other", "mid"])];
        let fused = fuse_scored(&lists, 0);
        assert_eq!(fused[0].document.content(), "top");
        assert!((fused[0].score - 1.0).abs() < 1e-12);
        assert_eq!(fused[1].document.content(), "mid");
        assert_eq!(fused[2].document.content(), "other");
    }
}
