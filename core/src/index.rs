use crate::config::IndexConfig;
use crate::corpus::{Article, Corpus};
use crate::error::IndexError;
use crate::similarity::SimilarityMatrix;
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::HashMap;

pub type TermId = u32;

/// Ordered set of index terms with their document frequencies.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    idf: Vec<f32>,
}

impl Vocabulary {
    pub fn len(&self) -> usize { self.terms.len() }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
    /// Terms in first-seen order; position is the vector dimension.
    pub fn terms(&self) -> &[String] { &self.terms }
    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }
    pub fn df(&self, id: TermId) -> u32 { self.df[id as usize] }
    pub fn idf(&self, id: TermId) -> f32 { self.idf[id as usize] }

    fn intern(&mut self, term: String) -> TermId {
        if let Some(&id) = self.dictionary.get(&term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(term.clone());
        self.dictionary.insert(term, id);
        self.df.push(0);
        id
    }
}

/// Sparse L2-normalized weights, entries sorted by term id.
#[derive(Debug, Clone, PartialEq)]
pub struct TermVector {
    dim: usize,
    entries: Vec<(TermId, f32)>,
}

impl TermVector {
    pub fn from_entries(dim: usize, mut entries: Vec<(TermId, f32)>) -> Self {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_by_key(|&(t, _)| t);
        Self { dim, entries }
    }

    pub fn dim(&self) -> usize { self.dim }
    pub fn entries(&self) -> &[(TermId, f32)] { &self.entries }
    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt()
    }

    pub fn weight(&self, term: TermId) -> f32 {
        self.entries
            .binary_search_by_key(&term, |&(t, _)| t)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Dense form, one coordinate per vocabulary term.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.dim];
        for &(t, w) in &self.entries {
            out[t as usize] = w;
        }
        out
    }

    fn normalize(&mut self) {
        let n = self.norm();
        if n > 0.0 {
            for (_, w) in self.entries.iter_mut() {
                *w /= n;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub articles: usize,
    pub vocabulary: usize,
    pub zero_vectors: usize,
    pub built_at: String,
    pub config: IndexConfig,
}

/// Vocabulary, per-article vectors and the all-pairs similarity matrix for one
/// corpus snapshot. Immutable once built.
#[derive(Debug, Clone)]
pub struct ArticleIndex {
    articles: Vec<Article>,
    positions: HashMap<String, usize>,
    vocabulary: Vocabulary,
    vectors: Vec<TermVector>,
    matrix: SimilarityMatrix,
    config: IndexConfig,
    built_at: String,
}

impl ArticleIndex {
    pub fn build(corpus: Corpus, config: &IndexConfig) -> Self {
        let articles = corpus.into_articles();
        let mut vocabulary = Vocabulary::default();

        // term counts per article, first-seen term order
        let mut counts: Vec<Vec<(TermId, u32)>> = Vec::with_capacity(articles.len());
        for article in &articles {
            let mut tf: HashMap<TermId, u32> = HashMap::new();
            let mut order: Vec<TermId> = Vec::new();
            for term in tokenize(&article.text, &config.tokenizer) {
                let id = vocabulary.intern(term);
                let c = tf.entry(id).or_insert(0);
                if *c == 0 {
                    order.push(id);
                    vocabulary.df[id as usize] += 1;
                }
                *c += 1;
            }
            counts.push(order.into_iter().map(|id| (id, tf[&id])).collect());
        }

        let n = articles.len();
        vocabulary.idf = vocabulary.df.iter().map(|&df| config.idf.idf(n, df as usize)).collect();

        let dim = vocabulary.len();
        let vectors: Vec<TermVector> = counts
            .into_iter()
            .map(|doc| {
                let entries = doc
                    .into_iter()
                    .map(|(id, c)| (id, config.tf(c) * vocabulary.idf[id as usize]))
                    .collect();
                let mut v = TermVector::from_entries(dim, entries);
                v.normalize();
                v
            })
            .collect();

        let matrix = SimilarityMatrix::from_vectors(&vectors);
        let positions = articles.iter().enumerate().map(|(i, a)| (a.title.clone(), i)).collect();
        let built_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into());

        tracing::info!(articles = n, terms = dim, "built article index");
        Self { articles, positions, vocabulary, vectors, matrix, config: config.clone(), built_at }
    }

    pub fn len(&self) -> usize { self.articles.len() }
    pub fn is_empty(&self) -> bool { self.articles.is_empty() }
    pub fn articles(&self) -> &[Article] { &self.articles }
    pub fn titles(&self) -> impl Iterator<Item = &str> { self.articles.iter().map(|a| a.title.as_str()) }
    pub fn title(&self, pos: usize) -> &str { &self.articles[pos].title }
    pub fn position(&self, title: &str) -> Option<usize> { self.positions.get(title).copied() }
    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }
    pub fn vector(&self, pos: usize) -> &TermVector { &self.vectors[pos] }
    pub fn matrix(&self) -> &SimilarityMatrix { &self.matrix }
    pub fn similarity(&self, i: usize, j: usize) -> f32 { self.matrix.get(i, j) }
    pub fn config(&self) -> &IndexConfig { &self.config }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            articles: self.len(),
            vocabulary: self.vocabulary.len(),
            zero_vectors: self.vectors.iter().filter(|v| v.is_zero()).count(),
            built_at: self.built_at.clone(),
            config: self.config.clone(),
        }
    }
}

/// Validate (title, text) pairs and build an index over them.
pub fn build_index<I, T, B>(articles: I, config: &IndexConfig) -> Result<ArticleIndex, IndexError>
where
    I: IntoIterator<Item = (T, B)>,
    T: Into<String>,
    B: Into<String>,
{
    let corpus = Corpus::from_pairs(articles)?;
    Ok(ArticleIndex::build(corpus, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArticleIndex {
        build_index(
            [("A", "cats and dogs"), ("B", "cats and birds"), ("C", "airplanes and rockets")],
            &IndexConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn vocabulary_excludes_stopwords_in_first_seen_order() {
        let idx = sample();
        assert_eq!(idx.vocabulary().terms(), &["cats", "dogs", "birds", "airplanes", "rockets"]);
        assert_eq!(idx.vocabulary().df(idx.vocabulary().term_id("cats").unwrap()), 2);
    }

    #[test]
    fn every_vector_has_vocabulary_dimension() {
        let idx = sample();
        for i in 0..idx.len() {
            assert_eq!(idx.vector(i).dim(), idx.vocabulary().len());
            assert_eq!(idx.vector(i).to_dense().len(), idx.vocabulary().len());
        }
    }

    #[test]
    fn rare_terms_weigh_more() {
        let idx = sample();
        let v = idx.vector(0);
        let cats = idx.vocabulary().term_id("cats").unwrap();
        let dogs = idx.vocabulary().term_id("dogs").unwrap();
        assert!(v.weight(dogs) > v.weight(cats));
        assert!((v.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn text_without_terms_yields_zero_vector() {
        let idx = build_index([("A", "cats"), ("B", "the and of")], &IndexConfig::default()).unwrap();
        assert!(idx.vector(1).is_zero());
        assert_eq!(idx.stats().zero_vectors, 1);
        assert_eq!(idx.stats().config, IndexConfig::default());
        assert_eq!(idx.similarity(1, 1), 0.0);
    }

    #[test]
    fn empty_input_fails() {
        let empty: Vec<(String, String)> = Vec::new();
        assert_eq!(build_index(empty, &IndexConfig::default()).unwrap_err(), IndexError::EmptyCorpus);
    }
}
