use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::persist::{export_json, load_catalog, save_catalog, IndexPaths};
use engine::{BatchSummary, CatalogIndex, ChunkedIngest, MapVectors, RawRecord, Scalar, DEFAULT_CHUNK_SIZE};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Column names a tabular input must carry, in any order.
const REQUIRED_COLUMNS: [&str; 7] = [
    "appid",
    "name",
    "short_description",
    "header_image",
    "metacritic_score",
    "recommendations_total",
    "is_free",
];

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and export the catalog search index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from CSV/JSON/JSONL catalog files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Word-vector JSON file enabling the semantic ranking term
        #[arg(long)]
        vectors: Option<String>,
        /// Records ingested per chunk between progress reports
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Also write the human-readable JSON artifacts
        #[arg(long, default_value_t = false)]
        export: bool,
    },
    /// Write the JSON artifacts for an existing index directory
    Export {
        /// Index directory produced by `build`
        #[arg(long)]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, vectors, chunk_size, export } => {
            build_index(&input, &output, vectors.as_deref(), chunk_size, export)
        }
        Commands::Export { index } => export_index(&index),
    }
}

fn build_index(
    input: &str,
    output: &str,
    vectors: Option<&str>,
    chunk_size: usize,
    export: bool,
) -> Result<()> {
    let mut catalog = match vectors {
        Some(path) => {
            let vectors = MapVectors::from_json_file(path)?;
            tracing::info!(words = vectors.len(), "loaded word vectors");
            CatalogIndex::with_vectors(Arc::new(vectors))
        }
        None => {
            tracing::warn!("no word vectors file, semantic scoring disabled");
            CatalogIndex::new()
        }
    };

    let files = collect_input_files(Path::new(input));
    if files.is_empty() {
        bail!("no .csv/.json/.jsonl input files under {input}");
    }

    let mut totals = BatchSummary::default();
    for file in &files {
        // A malformed file aborts only itself; the batch carries on.
        match ingest_file(&mut catalog, file, chunk_size) {
            Ok(summary) => {
                totals.added += summary.added;
                totals.duplicates += summary.duplicates;
                totals.unidentified += summary.unidentified;
                tracing::info!(
                    file = %file.display(),
                    added = summary.added,
                    duplicates = summary.duplicates,
                    unidentified = summary.unidentified,
                    "ingested file"
                );
            }
            Err(err) => {
                tracing::error!(file = %file.display(), error = %err, "skipping input file");
            }
        }
    }
    tracing::info!(
        files = files.len(),
        added = totals.added,
        duplicates = totals.duplicates,
        unidentified = totals.unidentified,
        "ingest complete"
    );

    let paths = IndexPaths::new(output);
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = save_catalog(&paths, &catalog, created_at)?;
    if export {
        export_json(&paths, &catalog)?;
    }

    tracing::info!(output, num_docs = meta.num_docs, terms = catalog.term_count(), "index build complete");
    Ok(())
}

fn export_index(index: &str) -> Result<()> {
    let paths = IndexPaths::new(index);
    let catalog = load_catalog(&paths, None)?;
    export_json(&paths, &catalog)?;
    tracing::info!(index, num_docs = catalog.len(), "wrote JSON artifacts");
    Ok(())
}

fn collect_input_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "csv" | "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn ingest_file(catalog: &mut CatalogIndex, file: &Path, chunk_size: usize) -> Result<BatchSummary> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let records = parse_records(&text, file)?;
    let total = records.len();

    let mut run = ChunkedIngest::new(records.into_iter(), chunk_size);
    let mut processed = 0;
    while let Some(consumed) = run.process_chunk(catalog) {
        processed += consumed;
        tracing::info!(file = %file.display(), processed, total, "ingest progress");
    }
    Ok(run.summary())
}

/// Routes a file's text to the right parser: `.jsonl` by extension,
/// otherwise by content (JSON starts with `[` or `{`, everything else
/// is treated as CSV).
fn parse_records(text: &str, file: &Path) -> Result<Vec<RawRecord>> {
    let body = text.trim_start_matches('\u{feff}').trim_start();
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        records_from_jsonl(body)
    } else if body.starts_with('[') || body.starts_with('{') {
        records_from_json(body)
    } else {
        records_from_csv(body)
    }
}

fn records_from_json(text: &str) -> Result<Vec<RawRecord>> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    let records = match json {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<RawRecord>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => bail!("expected a record object or an array of records"),
    };
    Ok(records)
}

fn records_from_jsonl(text: &str) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: RawRecord =
            serde_json::from_str(line).with_context(|| format!("line {}", number + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn records_from_csv(text: &str) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, col) in REQUIRED_COLUMNS.iter().enumerate() {
        match headers.iter().position(|h| h == col) {
            Some(idx) => columns[slot] = idx,
            None => bail!("missing required column {col:?}"),
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let field = |slot: usize| -> Scalar {
            Scalar::Str(row.get(columns[slot]).unwrap_or("").trim().to_string())
        };
        records.push(RawRecord {
            app_id: Some(field(0)),
            name: Some(field(1)),
            description: Some(field(2)),
            header_image: Some(field(3)),
            metacritic_score: Some(field(4)),
            recommendations: Some(field(5)),
            is_free: Some(field(6)),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_columns_resolve_in_any_order() {
        let text = "name,is_free,appid,short_description,header_image,recommendations_total,metacritic_score\n\
                    Portal Quest,true,42,puzzles and lasers,img.png,1200,88\n";
        let records = records_from_csv(text).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.app_id_text(), "42");
        assert_eq!(r.name_text(), "Portal Quest");
        assert_eq!(r.recommendations_value(), 1200);
        assert_eq!(r.metacritic_value(), 88);
        assert!(r.is_free_value());
    }

    #[test]
    fn csv_quoted_commas_stay_in_one_field() {
        let text = "appid,name,short_description,header_image,metacritic_score,recommendations_total,is_free\n\
                    7,\"Hello, World\",\"run, jump, repeat\",img,0,0,false\n";
        let records = records_from_csv(text).unwrap();
        assert_eq!(records[0].name_text(), "Hello, World");
        assert_eq!(records[0].description_text(), "run, jump, repeat");
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let text = "appid,name\n1,Nameless\n";
        let err = records_from_csv(text).unwrap_err();
        assert!(err.to_string().contains("short_description"));
    }

    #[test]
    fn csv_blank_rows_and_garbage_numbers_are_tolerated() {
        let text = "appid,name,short_description,header_image,metacritic_score,recommendations_total,is_free\n\
                    1,Alpha,,,not-a-number,,maybe\n\
                    ,,,,,,\n\
                    2,Beta,,,70,10,TRUE\n";
        let records = records_from_csv(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metacritic_value(), 0);
        assert_eq!(records[0].recommendations_value(), 0);
        assert!(!records[0].is_free_value());
        assert!(records[1].is_free_value());
    }

    #[test]
    fn json_accepts_arrays_objects_and_aliases() {
        let array = r#"[{"appId": "9", "title": "Alias Game", "shortDescription": "desc", "recommendationsTotal": 5}]"#;
        let records = records_from_json(array).unwrap();
        assert_eq!(records[0].app_id_text(), "9");
        assert_eq!(records[0].name_text(), "Alias Game");
        assert_eq!(records[0].recommendations_value(), 5);

        let single = r#"{"id": 3, "name": "Solo"}"#;
        let records = records_from_json(single).unwrap();
        assert_eq!(records[0].app_id_text(), "3");

        assert!(records_from_json("\"just a string\"").is_err());
    }

    #[test]
    fn jsonl_skips_blank_lines_and_reports_bad_ones() {
        let text = "{\"appid\": 1, \"name\": \"One\"}\n\n{\"appid\": 2, \"name\": \"Two\"}\n";
        let records = records_from_jsonl(text).unwrap();
        assert_eq!(records.len(), 2);

        let bad = "{\"appid\": 1}\nnot json\n";
        let err = records_from_jsonl(bad).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn detection_prefers_extension_then_content() {
        let jsonl = "{\"appid\": 1, \"name\": \"A\"}\n{\"appid\": 2, \"name\": \"B\"}\n";
        let records = parse_records(jsonl, Path::new("data.jsonl")).unwrap();
        assert_eq!(records.len(), 2);

        let json = "[{\"appid\": 1, \"name\": \"A\"}]";
        let records = parse_records(json, Path::new("data.txt")).unwrap();
        assert_eq!(records.len(), 1);

        let csv = "appid,name,short_description,header_image,metacritic_score,recommendations_total,is_free\n1,A,,,,,\n";
        let records = parse_records(csv, Path::new("data.csv")).unwrap();
        assert_eq!(records.len(), 1);
    }
}
