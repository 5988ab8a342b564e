use anyhow::Result;
use axum::Router;
use clap::Parser;
use recommend_core::{IdfMode, IndexConfig, TokenizerConfig};
use server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus path (.json / .jsonl file or a directory of them)
    #[arg(long, default_value = "./articles.jsonl")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Stem tokens with the English Snowball stemmer
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Use IDF = ln(N/df) instead of the smoothed variant
    #[arg(long, default_value_t = false)]
    plain_idf: bool,
    /// Use TF = 1 + ln(count) instead of the raw count
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = IndexConfig {
        tokenizer: TokenizerConfig { stem: args.stem, ..TokenizerConfig::default() },
        idf: if args.plain_idf { IdfMode::Plain } else { IdfMode::Smoothed },
        sublinear_tf: args.sublinear_tf,
    };
    let app: Router = build_app(&args.corpus, config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
