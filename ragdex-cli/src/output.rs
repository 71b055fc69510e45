use anyhow::Result;
use clap::ValueEnum;
use ragdex::{BuildResult, Health, Hit, QueryResponse};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Characters of chunk text shown per table row.
const PREVIEW_CHARS: usize = 80;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

#[derive(Tabled)]
struct HitRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Page")]
    page: u32,
    #[tabled(rename = "Chunk")]
    chunk_id: String,
    #[tabled(rename = "Text")]
    text: String,
}

#[derive(Tabled)]
struct KeyValueRow {
    #[tabled(rename = "Property")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_key_values(rows: Vec<(&str, String)>) {
    let rows: Vec<KeyValueRow> = rows
        .into_iter()
        .map(|(key, value)| KeyValueRow {
            key: key.to_string(),
            value,
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Print search hits.
pub fn print_hits(hits: &[Hit], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(hits),
        OutputFormat::Table => {
            if hits.is_empty() {
                println!("No results found.");
                return Ok(());
            }
            let rows: Vec<HitRow> = hits
                .iter()
                .enumerate()
                .map(|(i, hit)| HitRow {
                    rank: i + 1,
                    score: format!("{:.4}", hit.score),
                    page: hit.record.page,
                    chunk_id: hit.record.chunk_id.clone(),
                    text: preview(&hit.record.text),
                })
                .collect();
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
            Ok(())
        }
    }
}

/// Print a query answer followed by its sources.
pub fn print_query_response(response: &QueryResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(response),
        OutputFormat::Table => {
            println!("{}\n", response.answer);
            print_hits(&response.sources, format)?;
            println!(
                "{} of top {} found ({} search, {:.1} ms)",
                response.meta.num_found,
                response.meta.top_k,
                response.meta.mode,
                response.meta.latency_ms
            );
            Ok(())
        }
    }
}

pub fn print_build_result(result: &BuildResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            print_key_values(vec![
                ("Location", result.location.display().to_string()),
                ("Records", result.count.to_string()),
                ("Dimension", result.dimension.to_string()),
                ("Accelerated", result.accelerated.to_string()),
            ]);
            Ok(())
        }
    }
}

pub fn print_health(health: &Health, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(health),
        OutputFormat::Table => {
            let mut rows = vec![
                ("OK", health.ok.to_string()),
                ("Index size", health.index_size.to_string()),
            ];
            if let Some(error) = &health.error {
                rows.push(("Error", error.clone()));
            }
            print_key_values(rows);
            Ok(())
        }
    }
}
