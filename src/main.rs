use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use machinery_diag::data::splitter::DEFAULT_SEED;
use machinery_diag::loaders::metallicadour::load_drifts_metadata;
use machinery_diag::{
    load_arrays, load_metadata, load_split_arrays, split_metadata, ClassMapping, DatasetKind,
    MetadataTable,
};

/// Inspect machinery diagnostic datasets.
#[derive(Debug, Parser)]
#[command(name = "machinery-diag", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a dataset tree and print its metadata summary.
    Scan {
        dataset: DatasetKind,
        /// Extracted dataset root; downloaded into ./data when omitted.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Print every metadata row as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load feature arrays and print their shapes.
    Load {
        dataset: DatasetKind,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Split into train/test with this test proportion.
        #[arg(long)]
        test_size: Option<f64>,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Extra grouping columns for the split (`Case` is always used).
        #[arg(long)]
        group_by: Vec<String>,
    },
    /// Write the metadata table to a CSV file.
    Export {
        dataset: DatasetKind,
        output: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// File-level metadata for any dataset: the drifts subcases are expanded
/// into their tool measurement files.
fn file_metadata(
    dataset: DatasetKind,
    data_dir: Option<&std::path::Path>,
) -> Result<(MetadataTable, ClassMapping)> {
    if dataset == DatasetKind::MetallicadourDrifts {
        let drifts = load_drifts_metadata(data_dir).context("scanning drifts dataset")?;
        return Ok((drifts.tool, drifts.classes));
    }
    load_metadata(data_dir, dataset).with_context(|| format!("scanning {dataset}"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan {
            dataset,
            data_dir,
            json,
        } => {
            let (table, classes) = load_metadata(data_dir.as_deref(), dataset)
                .with_context(|| format!("scanning {dataset}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            }
            let summary = json!({
                "dataset": dataset,
                "rows": table.len(),
                "columns": table.columns(),
                "classes": classes.iter().map(|(i, l)| json!({"index": i, "label": l})).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Load {
            dataset,
            data_dir,
            test_size,
            seed,
            group_by,
        } => {
            let (table, _) = file_metadata(dataset, data_dir.as_deref())?;
            match test_size {
                Some(test_size) => {
                    let group_by: Vec<&str> = group_by.iter().map(String::as_str).collect();
                    let (train, test) = split_metadata(&table, &group_by, test_size, seed)?;
                    let arrays = load_split_arrays(&train, &test).context("loading arrays")?;
                    println!("{}", serde_json::to_string_pretty(&arrays.shapes())?);
                }
                None => {
                    let (x, y) = load_arrays(&table).context("loading arrays")?;
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "x": x.shape(),
                            "y": y.shape(),
                        }))?
                    );
                }
            }
        }
        Command::Export {
            dataset,
            output,
            data_dir,
        } => {
            let (table, _) = file_metadata(dataset, data_dir.as_deref())?;
            table
                .write_csv(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Wrote {} rows to {}", table.len(), output.display());
        }
    }
    Ok(())
}
