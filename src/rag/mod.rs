//! RAG (Retrieval-Augmented Generation) module
//!
//! - Reciprocal rank fusion of ranked lists from several retrievers
//! - Context assembly from retrieved chunks
//! - LLM-based answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use ragbench::rag::fusion::fuse;
//! use ragbench::rag::fusion::DEFAULT_RRF_K;
//! use ragbench::models::Document;
//! use ragbench::models::RankedList;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bm25 = RankedList::new("bm25", vec![Document::from_content("A"), Document::from_content("B")])?;
//!     let dense = RankedList::new("vector", vec![Document::from_content("B"), Document::from_content("C")])?;
//!
//!     let fused = fuse(&[bm25, dense], DEFAULT_RRF_K);
//!     println!("Top document: {}", fused[0].content());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod fusion;
pub mod pipeline;

pub use context::ContextAssembler;
pub use fusion::fuse;
pub use fusion::fuse_scored;
pub use fusion::FusedDocument;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
