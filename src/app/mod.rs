use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use geo_types::Coord;
use std::io::Write;
use std::path::{Path, PathBuf};

use osmquery::config::ClientConfig;
use osmquery::dsl::parse_predicates;
use osmquery::geocode::{NominatimGeocoder, rings_from_geojson};
use osmquery::presets::{PresetNetwork, PresetQuery, QueryArea};
use osmquery::query::{BoundingBox, OutputFormat, Sequence};
use osmquery::Client;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Street network preset
    #[arg(short, long, value_enum, default_value_t = PresetNetwork::Drive)]
    pub preset: PresetNetwork,

    /// Way tag predicates, e.g. 'highway & area!~yes' (replaces the preset's)
    #[arg(long)]
    pub way_tags: Option<String>,

    /// Relation tag predicates (replaces the preset's)
    #[arg(long)]
    pub relation_tags: Option<String>,

    /// Response format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Xml)]
    pub format: OutputFormat,

    /// Header options for csv, e.g. '(::id,::lat,::lon)'
    #[arg(long)]
    pub csv_options: Option<String>,

    /// Also print element metadata (out meta)
    #[arg(long)]
    pub metadata: bool,

    /// Availability probe rounds before giving up (overrides the config file)
    #[arg(long, env = "OSMQUERY_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Response destination; '-' writes to stdout
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// Print the compiled query and exit without submitting it
    #[arg(long)]
    pub print_query: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub area: AreaCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AreaCommand {
    /// Everything inside a bounding box
    Bbox {
        #[arg(long, allow_negative_numbers = true)]
        south: f64,
        #[arg(long, allow_negative_numbers = true)]
        west: f64,
        #[arg(long, allow_negative_numbers = true)]
        north: f64,
        #[arg(long, allow_negative_numbers = true)]
        east: f64,
    },
    /// Everything within a radius (metres) of a point
    Radius {
        #[arg(long)]
        radius: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Everything inside the polygons of a GeoJSON file
    Polygon { file: PathBuf },
    /// Everything inside a place, resolved by name through the geocoder
    Place { name: String },
}

/// Client config from `--config` (or defaults) with CLI overrides applied.
pub fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Config: Failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(max_attempts) = cli.max_attempts {
        config.max_attempts = max_attempts;
    }
    Ok(config)
}

pub fn preset_query(cli: &Cli) -> Result<PresetQuery> {
    let mut preset = PresetQuery::new(cli.preset, cli.format).with_metadata(cli.metadata);
    if let Some(options) = &cli.csv_options {
        preset = preset.with_format_options(options.clone());
    }
    if let Some(tags) = &cli.way_tags {
        preset.way_predicates =
            parse_predicates(tags).map_err(|e| anyhow!("CLI: Invalid --way-tags: {}", e))?;
    }
    if let Some(tags) = &cli.relation_tags {
        preset.relation_predicates =
            parse_predicates(tags).map_err(|e| anyhow!("CLI: Invalid --relation-tags: {}", e))?;
    }
    Ok(preset)
}

pub fn query_area(command: &AreaCommand) -> Result<QueryArea> {
    let area = match command {
        AreaCommand::Bbox {
            south,
            west,
            north,
            east,
        } => QueryArea::BoundingBox(BoundingBox::new(*south, *west, *north, *east)),
        AreaCommand::Radius { radius, lat, lon } => QueryArea::Radius {
            radius: *radius,
            center: Coord { x: *lon, y: *lat },
        },
        AreaCommand::Polygon { file } => {
            let document = std::fs::read_to_string(file)
                .with_context(|| format!("CLI: Failed to read {}", file.display()))?;
            let rings = rings_from_geojson(&document)
                .map_err(|e| anyhow!("CLI: {}: {}", file.display(), e))?;
            tracing::info!("Read {} polygon(s) from {}", rings.len(), file.display());
            QueryArea::Polygon(rings)
        }
        AreaCommand::Place { name } => QueryArea::PlaceName(name.clone()),
    };
    Ok(area)
}

pub fn build_sequence(cli: &Cli, config: &ClientConfig) -> Result<Sequence> {
    let preset = preset_query(cli)?;
    let area = query_area(&cli.area)?;
    let geocoder = NominatimGeocoder::new(config);
    let sequence = preset
        .build(&area, &geocoder)
        .context("Query: Failed to build query")?;
    tracing::info!("Query: {}", sequence);
    Ok(sequence)
}

/// Submit `sequence` and write the response to `output` (or stdout for `-`).
pub fn submit(sequence: &Sequence, config: &ClientConfig, output: &Path) -> Result<()> {
    let client = Client::new(config);
    let start = std::time::Instant::now();

    if output == Path::new("-") {
        let body = sequence.execute_bytes(&client)?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&body)
            .context("Output: Failed to write response")?;
        stdout.flush().context("Output: Failed to write response")?;
        tracing::info!(
            "Received {} bytes in {:.2}s",
            body.len(),
            start.elapsed().as_secs_f64()
        );
    } else {
        let body = sequence.execute_and_export(&client, output)?;
        tracing::info!(
            "Wrote {} bytes to {} in {:.2}s",
            body.len(),
            output.display(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
