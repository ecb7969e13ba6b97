use clap::Parser;
use inkfeat::{FeatureConfig, Symbol, SymbolInput};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "inkfeat", about = "Handwritten symbol strokes to feature vector datasets")]
struct Cli {
    /// Input JSON: an array of {"id", "truth", "strokes": [[[x, y], ...], ...]}
    #[arg(short, long)]
    input: PathBuf,

    /// Output dataset (type header, then one "v; v; ...; label" row per symbol)
    #[arg(short, long)]
    output: PathBuf,

    /// Feature configuration JSON (defaults for missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write one SVG per symbol into this directory
    #[arg(long)]
    svg_dir: Option<PathBuf>,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Treat the input as one page and compute size ratios across it
    #[arg(long)]
    size_ratios: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let t_start = Instant::now();

    let config = match &cli.config {
        Some(path) => serde_json::from_str::<FeatureConfig>(&fs::read_to_string(path)?)?,
        None => FeatureConfig::default(),
    };
    config.validate()?;

    if let Some(jobs) = cli.jobs {
        rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global()?;
    }

    eprintln!();
    eprintln!("  inkfeat \u{00b7} {}", cli.input.display());
    eprintln!();

    // ── Load ──────────────────────────────────────────────
    let inputs: Vec<SymbolInput> = serde_json::from_str(&fs::read_to_string(&cli.input)?)?;
    let n_strokes: usize = inputs.iter().map(|i| i.strokes.len()).sum();
    eprintln!("  Load        {} symbols, {} strokes", inputs.len(), n_strokes);

    // ── Preprocess ────────────────────────────────────────
    let mut symbols: Vec<Symbol> = Vec::with_capacity(inputs.len());
    for (input, result) in inputs.iter().zip(inkfeat::prepare_batch(&inputs)) {
        match result {
            Ok(symbol) => symbols.push(symbol),
            Err(e) => log::warn!("skipping symbol {}: {}", input.id, e),
        }
    }
    let n_points: usize = symbols.iter().map(Symbol::point_count).sum();
    eprintln!(
        "  Prepare     {} symbols ({} skipped) \u{00b7} {} points",
        symbols.len(),
        inputs.len() - symbols.len(),
        n_points,
    );
    if cli.size_ratios {
        inkfeat::assign_size_ratios(&mut symbols);
    }

    // ── Extract ───────────────────────────────────────────
    let features = inkfeat::extract_features(&symbols, &config)?;
    let types = inkfeat::feature_types(&config);
    write_dataset(&cli.output, &symbols, &features, &types)?;
    eprintln!(
        "  Extract     {} features per symbol  ({}ms)",
        types.len(),
        t_start.elapsed().as_millis(),
    );

    // ── SVG ───────────────────────────────────────────────
    if let Some(dir) = &cli.svg_dir {
        fs::create_dir_all(dir)?;
        for symbol in &mut symbols {
            symbol.classify_segments();
            fs::write(dir.join(format!("{}.svg", symbol.id())), symbol.to_svg())?;
        }
        eprintln!("  SVG         {}", dir.display());
    }

    eprintln!();
    eprintln!("  \u{2713} {}", cli.output.display());
    eprintln!();

    Ok(())
}

/// Header of `C`/`D` tags, then one `v; v; ...; label` row per symbol.
fn write_dataset(
    path: &Path,
    symbols: &[Symbol],
    features: &[Vec<f64>],
    types: &[inkfeat::FeatureType],
) -> std::io::Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);

    let header: Vec<String> = types.iter().map(|t| t.tag().to_string()).collect();
    write!(out, "{}\r\n", header.join("; "))?;

    for (symbol, row) in symbols.iter().zip(features) {
        for v in row {
            write!(out, "{v:?}; ")?;
        }
        write!(out, "{}\r\n", symbol.truth())?;
    }
    out.flush()
}
