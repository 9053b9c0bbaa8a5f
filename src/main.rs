use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use zone_geometry::read_polygon;
use zone_geometry::request::{DEFAULT_BUFFER, ExportDocument, SimulationRequest};
use zone_geometry::zone::{ParameterKind, ZONE_SPECS};
use zone_geometry::{
    AssemblyOptions, ParameterSet, Zone, ZoneKind, ellipsoidal_area, geodesic_area,
    to_feature_collection,
};

#[derive(Parser)]
#[command(author, version, about = "Zone polygon areas and GeoJSON for the land-use simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// KML, GPX, GeoJSON or drawn-zone JSON file, or a directory of them
    path: PathBuf,
    /// Zone classification for rings from KML/GPX/GeoJSON files
    #[arg(short, long)]
    zone: Option<ZoneKind>,
    /// Flat JSON object of zone parameters, applied to rings from KML/GPX/GeoJSON files
    #[arg(short, long, value_name = "FILE")]
    params: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the area of every ring
    Area {
        path: PathBuf,
    },
    /// Print the zones as a GeoJSON FeatureCollection
    Feature {
        #[command(flatten)]
        input: Input,
        /// Attach the geodesic area to every feature
        #[arg(long)]
        area: bool,
        #[arg(long, env = "ZONEGEO_AREA_DECIMALS", default_value_t = 2)]
        area_decimals: u32,
        #[arg(long, env = "ZONEGEO_COORDINATE_DECIMALS")]
        coordinate_decimals: Option<u32>,
    },
    /// Print one simulation request body per zone
    Request {
        #[command(flatten)]
        input: Input,
        /// Sampling radius around the zone, in meters
        #[arg(short, long, env = "ZONEGEO_BUFFER", default_value_t = DEFAULT_BUFFER)]
        buffer: u32,
    },
    /// Print an export document with every zone and the total area
    Export {
        #[command(flatten)]
        input: Input,
    },
    /// List the zone kinds with their preset, colour and parameters
    Zones,
}

fn fmt_area(m2: f64) -> String {
    if m2 < 10000.0 {
        format!("{} m²", m2.round())
    } else {
        format!("{:.2} ha", m2 / 10000.0)
    }
}

fn zone_table() -> String {
    let mut out = String::new();
    for spec in &ZONE_SPECS {
        out += &format!("{} ({}) preset={} color={}\n", spec.name, spec.kind, spec.preset, spec.color);
        for p in spec.parameters {
            let kind = match p.kind {
                ParameterKind::Range { min, max } => format!("{}..{}", min, max),
                ParameterKind::Flag => "yes/no".to_string(),
                ParameterKind::Choices(c) => format!("any of {} industries", c.len()),
            };
            out += &format!("  {:<16}{} [{}]\n", p.key, p.label, kind);
        }
    }
    out
}

fn load_parameters(path: &Option<PathBuf>) -> anyhow::Result<ParameterSet> {
    match path {
        None => Ok(ParameterSet::new()),
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read parameters: {}", p.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse parameters: {}", p.display()))
        }
    }
}

fn load_zones(input: &Input) -> anyhow::Result<Vec<Zone>> {
    let parameters = load_parameters(&input.params)?;
    let mut zones = Vec::new();
    for file in read_polygon::input_files(&input.path)? {
        let mut z = read_polygon::read_zones(&file, input.zone, &parameters)
            .with_context(|| format!("failed to read zones: {}", file.display()))?;
        zones.append(&mut z);
    }
    log::info!("zones: {}", zones.len());
    Ok(zones)
}

fn area(path: &Path) -> anyhow::Result<()> {
    for file in read_polygon::input_files(path)? {
        let rings = read_polygon::read_rings(&file)?;
        for (i, ring) in rings.iter().enumerate() {
            ring.info();
            let spherical = geodesic_area(ring)
                .with_context(|| format!("{} ring {}", file.display(), i))?;
            let ellipsoidal = ellipsoidal_area(ring)?;
            println!("{} [{}]", file.display(), i);
            println!("   spherical: {:.1} m² ({})", spherical, fmt_area(spherical));
            println!(" ellipsoidal: {:.1} m² (geo crate)", ellipsoidal);
            println!(
                "  difference: {:+.2}%",
                (spherical / ellipsoidal - 1f64) * 100f64
            );
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    match args.command {
        Commands::Area { path } => area(&path)?,
        Commands::Feature {
            input,
            area,
            area_decimals,
            coordinate_decimals,
        } => {
            let zones = load_zones(&input)?;
            let mut options = AssemblyOptions::default().with_area_decimals(area_decimals);
            if area {
                options = options.with_area();
            }
            if let Some(d) = coordinate_decimals {
                options = options.with_coordinate_decimals(d);
            }
            let fc = to_feature_collection(&zones, &options)?;
            println!("{}", serde_json::to_string_pretty(&fc)?);
        }
        Commands::Request { input, buffer } => {
            let zones = load_zones(&input)?;
            let requests = zones
                .iter()
                .map(|z| SimulationRequest::from_zone(z, buffer))
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&requests)?);
        }
        Commands::Export { input } => {
            let zones = load_zones(&input)?;
            let doc = ExportDocument::from_zones(&zones)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Commands::Zones => print!("{}", zone_table()),
    }
    Ok(())
}
