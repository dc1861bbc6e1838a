//! objmatch - object matcher CLI tool
//!
//! Strips nulls from documents and computes three-way patches between an
//! original, a modified and a current document. Inputs may be YAML or JSON.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use object_matcher::catalog::{MergeMetadataSource, SchemaCatalog};
use object_matcher::json::delete_null_in_value;
use object_matcher::merge::{create_three_way_json_merge_patch, create_three_way_merge_patch};
use object_matcher::object::TypeMeta;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "objmatch")]
#[command(author, version, about = "Three-way patch and match tool for object documents")]
struct Cli {
    /// Output location. Use '-' for stdout
    #[arg(long, short = 'o', global = true, default_value = "-")]
    output: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remove null fields from a document
    StripNulls {
        file: PathBuf,
    },

    /// Print the three-way patch turning current into modified
    Patch(PatchArgs),

    /// Exit with status 0 if current already reflects modified, 1 otherwise
    Match(PatchArgs),
}

#[derive(Args)]
struct PatchArgs {
    /// Last applied configuration. A missing original means nothing was
    /// applied before
    #[arg(long)]
    original: Option<PathBuf>,

    /// Desired state
    #[arg(long)]
    modified: PathBuf,

    /// Live state
    #[arg(long)]
    current: PathBuf,

    /// Extra catalog merged over the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Kind of the documents. Without a kind a JSON merge patch is computed
    #[arg(long, short = 'k')]
    kind: Option<String>,

    #[arg(long, default_value = "v1")]
    api_version: String,

    /// Fail when the patch would overwrite changes made to the live state
    #[arg(long)]
    no_overwrite: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };

    match cli.command {
        Command::StripNulls { file } => {
            strip_nulls(&file, &mut output)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Patch(args) => {
            let patch = three_way_patch(&args)?;
            writeln!(output, "{}", serde_json::to_string_pretty(&patch)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Match(args) => {
            let patch = three_way_patch(&args)?;
            if is_empty_patch(&patch) {
                writeln!(output, "match")?;
                Ok(ExitCode::SUCCESS)
            } else {
                writeln!(output, "differs:\n{}", serde_json::to_string_pretty(&patch)?)?;
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn strip_nulls(file: &Path, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = read_document(file)?;
    let removed = delete_null_in_value(&mut doc);
    writeln!(output, "{}", serde_json::to_string_pretty(&doc)?)?;
    if !removed.is_empty() {
        writeln!(output, "Removed:")?;
        for path in removed {
            writeln!(output, "  - {}", path)?;
        }
    }
    Ok(())
}

fn three_way_patch(args: &PatchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let original = match &args.original {
        Some(file) => read_document(file)?,
        None => Value::Object(Default::default()),
    };
    let mut modified = read_document(&args.modified)?;
    delete_null_in_value(&mut modified);
    let current = read_document(&args.current)?;

    let original = serde_json::to_vec(&original)?;
    let modified = serde_json::to_vec(&modified)?;
    let current = serde_json::to_vec(&current)?;

    let patch = match &args.kind {
        Some(kind) => {
            let type_meta = TypeMeta::new(args.api_version.as_str(), kind.as_str());
            let catalog = load_catalog(args.catalog.as_deref())?;
            let meta = catalog.lookup_merge_metadata(&type_meta)?;
            debug!(type_meta = %type_meta, "computing strategic merge patch");
            create_three_way_merge_patch(&original, &modified, &current, &meta, !args.no_overwrite)
                .map_err(|e| format!("Failed to create strategic merge patch: {}", e))?
        }
        None => {
            debug!("computing json merge patch");
            create_three_way_json_merge_patch(&original, &modified, &current)
                .map_err(|e| format!("Failed to create json merge patch: {}", e))?
        }
    };
    Ok(serde_json::from_slice(&patch)?)
}

fn load_catalog(file: Option<&Path>) -> Result<SchemaCatalog, Box<dyn std::error::Error>> {
    let mut catalog = SchemaCatalog::builtin().as_ref().clone();
    if let Some(file) = file {
        let content = fs::read_to_string(file)
            .map_err(|e| format!("Failed to read catalog file {:?}: {}", file, e))?;
        let extra = SchemaCatalog::from_yaml(&content)
            .map_err(|e| format!("Failed to parse catalog: {}", e))?;
        catalog.extend(&extra);
    }
    Ok(catalog)
}

fn read_document(file: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read file {:?}: {}", file, e))?;
    let doc: Value = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse file {:?}: {}", file, e))?;
    Ok(doc)
}

fn is_empty_patch(patch: &Value) -> bool {
    patch.as_object().is_some_and(|m| m.is_empty())
}
