use crate::config::IndexConfig;
use crate::corpus::Corpus;
use crate::index::ArticleIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to the active index. Readers take an `Arc` snapshot; a reload
/// builds the replacement first and swaps it in only once construction succeeded.
#[derive(Clone)]
pub struct IndexHandle {
    inner: Arc<RwLock<Arc<ArticleIndex>>>,
}

impl IndexHandle {
    pub fn new(index: ArticleIndex) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(index))) }
    }

    pub fn current(&self) -> Arc<ArticleIndex> { self.inner.read().clone() }

    /// Replace the active index with an already built one.
    pub fn swap(&self, index: ArticleIndex) -> Arc<ArticleIndex> {
        let next = Arc::new(index);
        std::mem::replace(&mut *self.inner.write(), next)
    }

    /// Build from `corpus` off to the side, then swap. Returns the previous index.
    pub fn reload(&self, corpus: Corpus, config: &IndexConfig) -> Arc<ArticleIndex> {
        let next = ArticleIndex::build(corpus, config);
        tracing::info!(articles = next.len(), "swapping in rebuilt index");
        self.swap(next)
    }

    /// Run a fallible corpus producer and reload only if it succeeds.
    pub fn try_reload<E, F>(&self, load: F, config: &IndexConfig) -> Result<Arc<ArticleIndex>, E>
    where
        F: FnOnce() -> Result<Corpus, E>,
        E: std::fmt::Display,
    {
        match load() {
            Ok(corpus) => Ok(self.reload(corpus, config)),
            Err(e) => {
                tracing::warn!(error = %e, "reload failed, keeping current index");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;

    fn index(pairs: &[(&str, &str)]) -> ArticleIndex {
        ArticleIndex::build(Corpus::from_pairs(pairs.iter().copied()).unwrap(), &IndexConfig::default())
    }

    #[test]
    fn readers_keep_their_snapshot_across_reload() {
        let handle = IndexHandle::new(index(&[("A", "cats"), ("B", "dogs")]));
        let before = handle.current();
        handle.reload(Corpus::from_pairs([("X", "rockets"), ("Y", "planes"), ("Z", "cats")]).unwrap(), &IndexConfig::default());
        assert_eq!(before.len(), 2);
        assert_eq!(handle.current().len(), 3);
        assert!(handle.current().position("A").is_none());
    }

    #[test]
    fn failed_reload_leaves_index_untouched() {
        let handle = IndexHandle::new(index(&[("A", "cats"), ("B", "dogs")]));
        let res = handle.try_reload(|| Corpus::from_pairs(Vec::<(String, String)>::new()), &IndexConfig::default());
        assert_eq!(res.unwrap_err(), IndexError::EmptyCorpus);
        assert_eq!(handle.current().recommend("A", 5).unwrap(), vec!["B"]);
    }
}
