//! Search command

use crate::app::{OutputFormat, SearchArgs};
use anyhow::Result;
use prezzario_core::{
    parse_activities, Activity, Config, CorpusIndex, HttpEmbedder, HttpQueryRefiner,
    HttpRelevanceJudge, OpenAiClient, Retriever,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct SearchReport<'a> {
    query: &'a str,
    title: &'a str,
    relevance: u8,
    retried: bool,
    judged_candidates: usize,
    activities: Vec<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        anyhow::bail!("empty query");
    }

    // One client shared by all three oracle roles so the completion and
    // embedding caches are shared too
    let client = Arc::new(OpenAiClient::new(config.llm_service.clone())?);
    let embedder = HttpEmbedder::new(client.clone());
    let refiner = HttpQueryRefiner::new(client.clone());
    let judge = HttpRelevanceJudge::new(client);

    let corpus = CorpusIndex::load(
        &config.corpus.chunks_path,
        &config.corpus.embeddings_path,
        &embedder,
    )
    .await?;

    let mut retrieval = config.retrieval.clone();
    if let Some(top_k) = args.top_k {
        retrieval.top_k = top_k;
    }
    if let Some(alpha) = args.alpha {
        retrieval.alpha = alpha;
    }
    if let Some(threshold) = args.threshold {
        retrieval.confidence_threshold = threshold;
    }

    let retriever = Retriever::new(&corpus, &embedder, &refiner, &judge, retrieval);
    let outcome = retriever.retrieve_best(&query).await?;

    let Some(best) = outcome.best else {
        match format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Cli => println!("No matching activity found"),
        }
        return Ok(());
    };

    let activities = parse_activities(&best.text)?;

    match format {
        OutputFormat::Json => {
            let report = SearchReport {
                query: &query,
                title: &best.title,
                relevance: best.relevance,
                retried: outcome.retried,
                judged_candidates: outcome.judged.len(),
                activities,
                text: if args.full { Some(&best.text) } else { None },
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Cli => {
            println!("{}", best.title);
            println!(
                "accuracy {}  ({} candidates judged{})",
                best.relevance,
                outcome.judged.len(),
                if outcome.retried { ", retried" } else { "" }
            );

            for activity in &activities {
                println!();
                println!("Activity: {}", activity.title);
                for resource in &activity.resources {
                    println!(
                        "  {}  [{}]  {} euro/{}",
                        resource.description, resource.code, resource.price, resource.unit
                    );
                }
            }

            if args.full {
                println!();
                println!("{}", best.text);
            }
        }
    }

    Ok(())
}
