//! Content-based article recommendation over a fixed corpus.
//!
//! [`ArticleIndex::build`] turns a [`Corpus`] into TF-IDF vectors and a dense cosine
//! similarity matrix; [`ArticleIndex::recommend`] ranks against it. Hosts that deal in
//! untyped input go through [`recommend_articles`], which reports failures as values.

pub mod config;
pub mod corpus;
pub mod error;
pub mod handle;
pub mod index;
pub mod ranker;
pub mod similarity;
pub mod tokenizer;

pub use config::{IdfMode, IndexConfig, TokenizerConfig, DEFAULT_TOP_N, MAX_TOP_N};
pub use corpus::{load_corpus, Article, Corpus};
pub use error::{FailureKind, IndexError, LoadError, QueryError};
pub use handle::IndexHandle;
pub use index::{build_index, ArticleIndex, IndexStats, TermId, TermVector, Vocabulary};
pub use ranker::{parse_top_n, recommend_articles, Outcome, QueryInput, Recommendation};
