//! SNOMED CT IS-A graph command line tool.
//!
//! `build` turns the release under `{data-dir}/RawData` into the binary pair
//! under `{data-dir}/ParsedRecords`; every other command loads that pair.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snomed_types::{EffectiveTime, SctId};
use snomed_graph::{discover_rf2_files, BuildConfig, ConceptStore, DataLayout, TerminologyBuilder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "snomed-query", version, about)]
struct Cli {
    /// Directory holding RawData/ and ParsedRecords/
    #[arg(long, env = "SNOMED_DATA_PATH", default_value = ".", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the IS-A graph from the raw release and persist it
    Build {
        /// Fully specified name of the root concept
        #[arg(long)]
        root_label: Option<String>,

        /// Preferred language for names
        #[arg(long)]
        language: Option<String>,

        /// Resolve versions as of this date (YYYYMMDD); defaults to today
        #[arg(long, value_parser = parse_date)]
        as_of: Option<EffectiveTime>,
    },
    /// Write the transitive closure as tab-separated (ancestor, descendant) rows
    Closure {
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List all ancestors of a concept
    Ancestors {
        /// Concept id
        id: SctId,
    },
    /// List all descendants of a concept
    Descendants {
        /// Concept id
        id: SctId,
    },
    /// Test whether CHILD is a descendant of PARENT
    IsDescendant {
        /// Ancestor candidate
        parent: SctId,
        /// Descendant candidate
        child: SctId,
    },
    /// Show one concept with its direct parents and children
    Show {
        /// Concept id
        id: SctId,
    },
}

fn parse_date(value: &str) -> Result<EffectiveTime, String> {
    EffectiveTime::from_yyyymmdd(value).ok_or_else(|| format!("'{value}' is not a YYYYMMDD date"))
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging();

    let layout = DataLayout::new(&cli.data_dir);
    match cli.command {
        Command::Build {
            root_label,
            language,
            as_of,
        } => build(&layout, root_label, language, as_of),
        Command::Closure { output } => closure(&layout, output),
        Command::Ancestors { id } => {
            let store = ConceptStore::load(&layout)?;
            let ancestors = store.find_ancestors(id)?;
            print_concepts(&store, ancestors)
        }
        Command::Descendants { id } => {
            let store = ConceptStore::load(&layout)?;
            let descendants = store.find_descendants(id)?;
            print_concepts(&store, descendants)
        }
        Command::IsDescendant { parent, child } => {
            let store = ConceptStore::load(&layout)?;
            println!("{}", store.is_descendant(parent, child)?);
            Ok(())
        }
        Command::Show { id } => show(&layout, id),
    }
}

fn build(
    layout: &DataLayout,
    root_label: Option<String>,
    language: Option<String>,
    as_of: Option<EffectiveTime>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = BuildConfig {
        evaluation_date: as_of,
        ..BuildConfig::default()
    };
    if let Some(label) = root_label {
        config.root_label = label;
    }
    if let Some(language) = language {
        config.language_code = language;
    }

    let raw = layout.raw_data_dir();
    tracing::info!("Loading SNOMED CT release from: {}", raw.display());
    let files = discover_rf2_files(&raw)?;

    let graph = TerminologyBuilder::new(config).load_files(&files)?;
    graph.store.save(layout)?;

    println!(
        "Built {} concepts under root {} into {}",
        graph.store.len(),
        graph.root_id,
        layout.parsed_records_dir().display()
    );
    Ok(())
}

fn closure(layout: &DataLayout, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let store = ConceptStore::load(layout)?;
    let rows = match output {
        Some(path) => store.create_closure_table(BufWriter::new(File::create(&path)?))?,
        None => store.create_closure_table(BufWriter::new(io::stdout().lock()))?,
    };
    tracing::info!("Wrote {} closure rows", rows);
    Ok(())
}

fn show(layout: &DataLayout, id: SctId) -> Result<(), Box<dyn std::error::Error>> {
    let store = ConceptStore::load(layout)?;
    let concept = store.concept(id)?.value().clone();

    let mut out = io::stdout().lock();
    writeln!(out, "{concept}")?;
    writeln!(out, "  module:            {}", concept.module)?;
    writeln!(out, "  definition status: {}", concept.definition_status)?;
    writeln!(out, "  effective time:    {}", concept.effective_time)?;
    for synonym in &concept.synonyms {
        writeln!(out, "  synonym:           {synonym}")?;
    }
    for parent in concept.is_a_parents.ids() {
        writeln!(out, "  is a:              {}", label(&store, parent))?;
    }
    for child in concept.is_a_children.ids() {
        writeln!(out, "  has subtype:       {}", label(&store, child))?;
    }
    Ok(())
}

fn print_concepts(
    store: &ConceptStore,
    ids: impl IntoIterator<Item = SctId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ids: Vec<SctId> = ids.into_iter().collect();
    ids.sort_unstable();

    let mut out = BufWriter::new(io::stdout().lock());
    for id in ids {
        writeln!(out, "{}", label(store, id))?;
    }
    out.flush()?;
    Ok(())
}

fn label(store: &ConceptStore, id: SctId) -> String {
    store
        .get(id)
        .map(|concept| concept.to_string())
        .unwrap_or_else(|| format!("[{id}]"))
}
