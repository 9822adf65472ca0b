use clap::{Args, Parser, Subcommand};
use picture_synth::columns::parse_column_spans;
use picture_synth::repository::ManifestRepository;
use picture_synth::sizes::sizes_clauses;
use picture_synth::{PictureRequest, Synthesizer, config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picture-synth")]
#[command(about = "Responsive <picture> markup from grid column classes")]
#[command(long_about = "\
Responsive <picture> markup from grid column classes

Images are looked up in a JSON asset manifest:

  {
    \"images\": {
      \"42\": {
        \"alt\": \"Harbour at dawn\",
        \"sizes\": {
          \"medium\": { \"url\": \"/media/harbour-300.jpg\", \"width\": 300, \"height\": 200 },
          \"full\":   { \"url\": \"/media/harbour.jpg\", \"width\": 2048, \"height\": 1365 }
        }
      }
    }
  }

The sizes attribute is derived from the column classes of the element the
image is placed in (--columns \"col-12 col-md-6\").

Run 'picture-synth gen-config' to generate a documented picture-synth.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "picture-synth.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// What to render: one image placement.
#[derive(Args, Clone)]
struct RequestArgs {
    /// JSON asset manifest
    #[arg(long, default_value = "assets.json")]
    manifest: PathBuf,

    /// Image id in the manifest
    image: String,

    /// Size variant keyword
    #[arg(long, default_value = "full")]
    size: String,

    /// Grid column classes the sizes attribute is derived from
    #[arg(long)]
    columns: Option<String>,

    /// Explicit sizes attribute (wins over --columns)
    #[arg(long)]
    sizes: Option<String>,

    /// Explicit source as BREAKPOINT=VARIANT, repeatable
    #[arg(long = "source", value_parser = parse_source)]
    sources: Vec<(String, String)>,

    /// Class for the <img>, repeatable
    #[arg(long = "class")]
    classes: Vec<String>,

    /// Inline style for the <img>
    #[arg(long)]
    style: Option<String>,

    /// Alt text override
    #[arg(long)]
    alt: Option<String>,

    /// Extra <img> attribute as NAME=VALUE, repeatable
    #[arg(long = "attr", value_parser = parse_source)]
    attributes: Vec<(String, String)>,

    /// Offer the configured alternate format ahead of the originals
    #[arg(long)]
    alternate: bool,

    /// Defer loading (data-src/data-srcset/data-sizes)
    #[arg(long)]
    lazy: bool,

    /// Skip the <noscript> fallback when deferring
    #[arg(long, requires = "lazy")]
    no_noscript: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the <picture> markup for an image
    Render(RequestArgs),
    /// Print the sizes attribute for a column class string
    Sizes {
        /// Grid column classes, e.g. "col-12 col-md-6"
        columns: String,
    },
    /// Show column spans, sizes clauses and sources for an image
    Explain(RequestArgs),
    /// Print a stock picture-synth.toml with all options documented
    GenConfig,
}

fn parse_source(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

fn build_request(args: &RequestArgs, config: &config::SynthConfig) -> PictureRequest {
    let mut builder = PictureRequest::builder(args.image.as_str(), &args.size);
    if !args.sources.is_empty() {
        builder = builder.sources(args.sources.clone());
    }
    if let Some(sizes) = &args.sizes {
        builder = builder.sizes(sizes);
    }
    if let Some(columns) = &args.columns {
        builder = builder.auto_sizes(columns);
    }
    for class in &args.classes {
        builder = builder.class(class);
    }
    if let Some(style) = &args.style {
        builder = builder.style(style);
    }
    if let Some(alt) = &args.alt {
        builder = builder.alt(alt);
    }
    for (name, value) in &args.attributes {
        builder = builder.attribute(name, value);
    }
    if args.alternate {
        builder = builder.alternate_format(config.alternate_format.clone());
    }
    if args.lazy {
        builder = builder
            .lazy_load(&config.lazy_load.marker_class)
            .noscript_fallback(config.lazy_load.noscript_fallback && !args.no_noscript);
    }
    builder.build()
}

fn load_manifest(path: &std::path::Path) -> Result<ManifestRepository, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(ManifestRepository::from_json(&json)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    let synth = Synthesizer::from_config(&config);

    match cli.command {
        Command::Render(args) => {
            let repo = load_manifest(&args.manifest)?;
            let request = build_request(&args, &config);
            match synth.try_synthesize(&request, &repo)? {
                Some(tree) => println!("{}", tree.into_string()),
                None => {
                    return Err(format!("image '{}' size '{}' not found", args.image, args.size).into());
                }
            }
        }
        Command::Sizes { columns } => {
            let spans = parse_column_spans(&columns, synth.table(), config.span_policy())?;
            let clauses = sizes_clauses(&spans, synth.table(), synth.options());
            println!("{}", clauses.join(", "));
        }
        Command::Explain(args) => {
            let repo = load_manifest(&args.manifest)?;
            let request = build_request(&args, &config);
            let columns = args.columns.as_deref().unwrap_or_default();
            let spans = parse_column_spans(columns, synth.table(), config.span_policy())?;
            let clauses = synth.sizes_clauses(&request)?;
            let sources = synth.sources(&request, &repo)?;
            output::print_explain(&spans, synth.table(), synth.options(), &clauses, &sources);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
