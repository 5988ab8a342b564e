//! Article records and the host-side corpus loader.
//!
//! A corpus is a non-empty ordered list of articles with unique titles.
//! Records arrive as JSON objects carrying `Title` and `Article` string fields
//! (`title` / `text` are accepted as well). Files are `.json` (an array or a single
//! object) or `.jsonl` (one object per line); a directory is walked recursively.

use crate::error::{IndexError, LoadError};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub text: String,
}

impl Article {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { title: title.into(), text: text.into() }
    }
}

#[derive(Debug, Clone)]
pub struct Corpus {
    articles: Vec<Article>,
}

impl Corpus {
    /// Validate a list of articles: non-empty, unique titles.
    pub fn new(articles: Vec<Article>) -> Result<Self, IndexError> {
        if articles.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(articles.len());
        for (i, a) in articles.iter().enumerate() {
            if let Some(&first) = seen.get(a.title.as_str()) {
                return Err(IndexError::DuplicateTitle { title: a.title.clone(), first, second: i });
            }
            seen.insert(&a.title, i);
        }
        Ok(Self { articles })
    }

    /// Build from (title, text) pairs.
    pub fn from_pairs<I, T, B>(pairs: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (T, B)>,
        T: Into<String>,
        B: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(t, b)| Article::new(t, b)).collect())
    }

    /// Build from loosely typed records, checking the required fields of each.
    pub fn from_records(records: Vec<Value>) -> Result<Self, IndexError> {
        if records.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        let articles = records
            .iter()
            .enumerate()
            .map(|(i, r)| article_from_record(i, r))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(articles)
    }

    pub fn articles(&self) -> &[Article] { &self.articles }
    pub fn into_articles(self) -> Vec<Article> { self.articles }
    pub fn len(&self) -> usize { self.articles.len() }
    pub fn is_empty(&self) -> bool { self.articles.is_empty() }
}

fn article_from_record(record: usize, value: &Value) -> Result<Article, IndexError> {
    let title = field(value, &["Title", "title"]).ok_or(IndexError::Schema { record, field: "Title" })?;
    let text = field(value, &["Article", "text"]).ok_or(IndexError::Schema { record, field: "Article" })?;
    Ok(Article::new(title, text))
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|n| value.get(*n).and_then(Value::as_str))
}

/// Load a corpus from a `.json`/`.jsonl` file or a directory of them.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Corpus, LoadError> {
    let path = path.as_ref();
    let files = if path.is_dir() { corpus_files(path)? } else { vec![path.to_path_buf()] };

    let mut records = Vec::new();
    for file in &files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(file, &mut records)?;
        } else {
            read_json(file, &mut records)?;
        }
    }
    tracing::debug!(files = files.len(), records = records.len(), "read corpus records");
    Ok(Corpus::from_records(records)?)
}

/// `.json`/`.jsonl` files under `root` in file name order. An unreadable entry fails the
/// whole load rather than shrinking the corpus.
fn corpus_files(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            tracing::warn!(path = %path.display(), error = %e, "cannot read corpus entry");
            LoadError::Io { path, source: e.into() }
        })?;
        let p = entry.path();
        if p.is_file() && is_corpus_file(p) {
            files.push(p.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(LoadError::NoFiles(root.to_path_buf()));
    }
    Ok(files)
}

fn is_corpus_file(p: &Path) -> bool {
    matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl"))
}

fn open(file: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(file)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io { path: file.to_path_buf(), source })
}

fn read_jsonl(file: &Path, out: &mut Vec<Value>) -> Result<(), LoadError> {
    for (i, line) in open(file)?.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io { path: file.to_path_buf(), source })?;
        if line.trim().is_empty() { continue; }
        let v = serde_json::from_str(&line)
            .map_err(|source| LoadError::Parse { path: file.to_path_buf(), line: i + 1, source })?;
        out.push(v);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<Value>) -> Result<(), LoadError> {
    let json: Value = serde_json::from_reader(open(file)?)
        .map_err(|source| LoadError::Parse { path: file.to_path_buf(), line: source.line(), source })?;
    match json {
        Value::Array(arr) => out.extend(arr),
        other => out.push(other),
    }
    Ok(())
}
