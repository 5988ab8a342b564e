use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use recommend_core::{
    load_corpus, recommend_articles, ArticleIndex, IdfMode, IndexConfig, Outcome, TokenizerConfig, DEFAULT_TOP_N,
};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recommend")]
#[command(about = "Recommend articles similar to a given title", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Corpus path (.json / .jsonl file or a directory of them)
    #[arg(long)]
    corpus: String,
    /// Stem tokens with the English Snowball stemmer
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Use IDF = ln(N/df) instead of the smoothed ln((1+N)/(1+df)) + 1
    #[arg(long, default_value_t = false)]
    plain_idf: bool,
    /// Use TF = 1 + ln(count) instead of the raw count
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
    /// Drop tokens shorter than this many characters
    #[arg(long, default_value_t = 2)]
    min_token_len: usize,
}

impl IndexArgs {
    fn config(&self) -> IndexConfig {
        IndexConfig {
            tokenizer: TokenizerConfig { min_token_len: self.min_token_len, stem: self.stem },
            idf: if self.plain_idf { IdfMode::Plain } else { IdfMode::Smoothed },
            sublinear_tf: self.sublinear_tf,
        }
    }

    fn build(&self) -> Result<ArticleIndex> {
        tracing::debug!(corpus = %self.corpus, "loading corpus");
        let corpus = load_corpus(&self.corpus).with_context(|| format!("loading corpus from {}", self.corpus))?;
        Ok(ArticleIndex::build(corpus, &self.config()))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print recommendations for one title
    Query {
        #[command(flatten)]
        index: IndexArgs,
        /// Exact article title
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
        /// Show similarity scores next to titles
        #[arg(long, default_value_t = false)]
        scores: bool,
    },
    /// Print corpus and vocabulary statistics
    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Prompt for titles on stdin until EOF
    Interactive {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { index, title, top_n, scores } => {
            let index = index.build()?;
            let mut out = io::stdout().lock();
            if scores {
                match index.recommend_scored(&title, top_n) {
                    Ok(recs) => {
                        for (i, r) in recs.iter().enumerate() {
                            writeln!(out, "{}. {} ({:.4})", i + 1, r.title, r.score)?;
                        }
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
            } else {
                let outcome = recommend_articles(&index, &title.as_str().into(), top_n);
                print_outcome(&mut out, outcome)?;
            }
            Ok(())
        }
        Commands::Stats { index } => {
            let index = index.build()?;
            println!("{}", serde_json::to_string_pretty(&index.stats())?);
            Ok(())
        }
        Commands::Interactive { index, top_n } => {
            let index = index.build()?;
            interactive(&index, top_n, io::stdin().lock(), io::stdout().lock())
        }
    }
}

fn print_outcome<W: Write>(out: &mut W, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Recommendations { titles } => {
            for (i, t) in titles.iter().enumerate() {
                writeln!(out, "{}. {}", i + 1, t)?;
            }
        }
        Outcome::Failure { message, .. } => writeln!(out, "{message}")?,
    }
    Ok(())
}

fn interactive<R: BufRead, W: Write>(index: &ArticleIndex, top_n: usize, input: R, mut out: W) -> Result<()> {
    writeln!(out, "Enter an article title to get recommendations (Ctrl-D to quit).")?;
    write!(out, "> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let title = line.trim_end_matches(['\r', '\n']);
        let outcome = recommend_articles(index, &title.into(), top_n);
        if outcome.is_success() {
            writeln!(out, "Here are some recommendations:")?;
        }
        print_outcome(&mut out, outcome)?;
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommend_core::build_index;

    fn index() -> ArticleIndex {
        build_index(
            [("A", "cats and dogs"), ("B", "cats and birds"), ("C", "airplanes and rockets")],
            &IndexConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn interactive_numbers_results_and_reports_failures() {
        let mut out = Vec::new();
        interactive(&index(), 2, "A\n\nZ\n".as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1. B\n2. C\n"));
        assert!(text.contains("Please enter an article title\n"));
        assert_eq!(text.matches("Here are some recommendations:").count(), 1);
        assert!(text.contains("Article not found: 'Z'\n"));
    }

    #[test]
    fn flags_map_to_config() {
        let args = IndexArgs { corpus: "x".into(), stem: true, plain_idf: true, sublinear_tf: false, min_token_len: 3 };
        let config = args.config();
        assert!(config.tokenizer.stem);
        assert_eq!(config.tokenizer.min_token_len, 3);
        assert_eq!(config.idf, IdfMode::Plain);
    }
}
