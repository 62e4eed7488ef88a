use anyhow::{Context, Result};
use clap::Parser;
use simkernel::cli::io::load_token_stream;
use simkernel::cli::opts::Cli;
use simkernel::{mark_base_code_on, normalize, preprocess_base_code, SimilarityConfig, Token, TokenList};
use std::time::Instant;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let start = Instant::now();
    let opt = Cli::parse();
    let config = SimilarityConfig::new(opt.minimum_token_match as usize);

    let mut first = load_token_stream(&opt.first).context("loading --first")?;
    let mut second = load_token_stream(&opt.second).context("loading --second")?;

    if !opt.no_normalize {
        first = renormalize(first).context("normalizing --first")?;
        second = renormalize(second).context("normalizing --second")?;
    }

    if let Some(base_path) = &opt.base_code {
        let mut base = load_token_stream(base_path).context("loading --base-code")?;
        log::debug!("pre-hashing base code ({} tokens)", base.len());
        let base_index = preprocess_base_code(&mut base, config.minimum_token_match);
        mark_base_code_on(&mut first, &mut base, &base_index);
        mark_base_code_on(&mut second, &mut base, &base_index);
    }

    let comparison = simkernel::compare(
        opt.first.display().to_string(),
        &mut first,
        opt.second.display().to_string(),
        &mut second,
        &config,
    );

    let json = serde_json::to_string_pretty(&comparison).context("serializing comparison")?;
    println!("{json}");

    log::debug!(
        "compared {} vs {} in {:.2?}, {} matches",
        comparison.first_id,
        comparison.second_id,
        start.elapsed(),
        comparison.matches.len()
    );
    Ok(())
}

fn renormalize(tokens: TokenList) -> Result<TokenList> {
    let reordered: Vec<Token> = normalize(tokens.tokens()).context("building normalization graph")?;
    TokenList::new(reordered).context("rebuilding token list after normalization")
}
