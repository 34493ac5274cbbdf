use std::error::Error;
use std::fs;

use clap::Parser;

use plate_generator::codec;
use plate_generator::noisegen::{
    self, CellType, DistanceFunction, NoiseParams, PerlinParams, SimplexParams, WorleyParams,
};
use plate_generator::plates::{self, Complexity, PlateRequest};
use plate_generator::raster::Raster;
use plate_generator::validation;

#[derive(Parser, Debug)]
#[command(name = "plate_generator")]
#[command(about = "Generate noise fields and tectonic plate maps on a hexagonal grid")]
struct Args {
    /// Noise algorithm: perlin, simplex, or worley
    #[arg(short, long, default_value = "perlin")]
    algorithm: String,

    /// Preset variant (perlin: continental, oceanic; simplex: ridged,
    /// turbulence, shelf; worley: plates, boundaries, volcanic, fractures)
    #[arg(long)]
    variant: Option<String>,

    /// Width of the noise field in pixels
    #[arg(short = 'W', long, default_value = "256")]
    width: usize,

    /// Height of the noise field in pixels
    #[arg(short = 'H', long, default_value = "256")]
    height: usize,

    /// Detail scale (perlin/simplex)
    #[arg(long)]
    scale: Option<f64>,

    /// Fractal octave count (perlin/simplex)
    #[arg(long)]
    octaves: Option<u32>,

    /// Per-octave amplitude falloff (perlin/simplex)
    #[arg(long)]
    persistence: Option<f64>,

    /// Per-octave frequency multiplier (perlin/simplex)
    #[arg(long)]
    lacunarity: Option<f64>,

    /// Cell frequency (worley)
    #[arg(long)]
    frequency: Option<f64>,

    /// Distance metric: euclidean, manhattan, chebyshev (worley)
    #[arg(long, default_value = "euclidean")]
    distance_function: String,

    /// Cell value mode: F1, F2, F1-F2 (worley)
    #[arg(long, default_value = "F1")]
    cell_type: String,

    /// Random seed (entropy-drawn if not specified)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Write the generated field as a grayscale PNG
    #[arg(long)]
    export_field: Option<String>,

    /// Run plate segmentation and write the plate model JSON to this path
    #[arg(long)]
    export_plates: Option<String>,

    /// Hex grid width for plate segmentation
    #[arg(long, default_value = "100")]
    grid_width: usize,

    /// Hex grid height for plate segmentation
    #[arg(long, default_value = "100")]
    grid_height: usize,

    /// Plate growth sensitivity
    #[arg(long, default_value = "0.15")]
    sensitivity: f64,

    /// Minimum plate count
    #[arg(long, default_value = "4")]
    min_plates: usize,

    /// Maximum plate count
    #[arg(long, default_value = "20")]
    max_plates: usize,

    /// Boundary complexity: low, medium, high
    #[arg(long, default_value = "medium")]
    complexity: String,

    /// Wrap the hex grid edges (toroidal topology)
    #[arg(long)]
    wrap_edges: bool,
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let params = build_params(&args)?;
    validation::validate_noise_request(&params, args.width, args.height, args.seed)?;

    println!(
        "Generating {} noise field ({}x{}, seed: {})",
        params.algorithm_name(),
        args.width,
        args.height,
        args.seed.map_or("entropy".to_string(), |s| s.to_string()),
    );

    let field = generate_field(&args, &params);
    let (min_v, max_v) = field.min_max();
    println!("Field range: {min_v:.4} to {max_v:.4}");

    if let Some(path) = &args.export_field {
        codec::field_to_gray_image(&field).save(path)?;
        println!("Exported field to {path}");
    }

    if let Some(path) = &args.export_plates {
        println!(
            "Segmenting {}x{} hex grid into {}-{} plates...",
            args.grid_width, args.grid_height, args.min_plates, args.max_plates
        );

        let request = PlateRequest {
            noise_data: codec::encode_field(&field)?,
            grid_width: args.grid_width,
            grid_height: args.grid_height,
            sensitivity: args.sensitivity,
            min_plates: args.min_plates,
            max_plates: args.max_plates,
            complexity: Complexity::parse_lenient(&args.complexity),
            wrap_edges: args.wrap_edges,
            seed: args.seed,
        };

        let model = plates::generate_plates(&request)?;
        println!(
            "Created {} plates over {} hexagons",
            model.metadata.plate_count, model.metadata.total_hexagons
        );
        for plate in &model.plates {
            println!(
                "  Plate {:>2}: {:>5} cells, {} neighbors, {}",
                plate.id,
                plate.size,
                plate.neighbors.len(),
                plate.color
            );
        }

        fs::write(path, serde_json::to_string_pretty(&model)?)?;
        println!("Exported plate model to {path}");
    }

    Ok(())
}

fn build_params(args: &Args) -> Result<NoiseParams, Box<dyn Error>> {
    let defaults_perlin = PerlinParams::default();
    let defaults_simplex = SimplexParams::default();
    let defaults_worley = WorleyParams::default();

    match args.algorithm.to_lowercase().as_str() {
        "perlin" => Ok(NoiseParams::Perlin(PerlinParams {
            scale: args.scale.unwrap_or(defaults_perlin.scale),
            octaves: args.octaves.unwrap_or(defaults_perlin.octaves),
            persistence: args.persistence.unwrap_or(defaults_perlin.persistence),
            lacunarity: args.lacunarity.unwrap_or(defaults_perlin.lacunarity),
        })),
        "simplex" => Ok(NoiseParams::Simplex(SimplexParams {
            scale: args.scale.unwrap_or(defaults_simplex.scale),
            octaves: args.octaves.unwrap_or(defaults_simplex.octaves),
            persistence: args.persistence.unwrap_or(defaults_simplex.persistence),
            lacunarity: args.lacunarity.unwrap_or(defaults_simplex.lacunarity),
        })),
        "worley" => Ok(NoiseParams::Worley(WorleyParams {
            frequency: args.frequency.unwrap_or(defaults_worley.frequency),
            distance_function: DistanceFunction::parse_lenient(&args.distance_function),
            cell_type: CellType::parse_lenient(&args.cell_type),
        })),
        other => Err(format!("unsupported algorithm: {other}").into()),
    }
}

fn generate_field(args: &Args, params: &NoiseParams) -> Raster<f64> {
    let (w, h, seed) = (args.width, args.height, args.seed);

    match (params, args.variant.as_deref()) {
        (NoiseParams::Perlin(p), Some("continental")) => {
            noisegen::generate_perlin_continental(w, h, p, seed)
        }
        (NoiseParams::Perlin(p), Some("oceanic")) => {
            noisegen::generate_perlin_oceanic(w, h, p, seed)
        }
        (NoiseParams::Simplex(p), Some("ridged")) => {
            noisegen::generate_simplex_ridged(w, h, p, seed)
        }
        (NoiseParams::Simplex(p), Some("turbulence")) => {
            noisegen::generate_simplex_turbulence(w, h, p, seed)
        }
        (NoiseParams::Simplex(p), Some("shelf")) => {
            noisegen::generate_simplex_continental_shelf(w, h, p, seed)
        }
        (NoiseParams::Worley(p), Some("plates")) => {
            noisegen::generate_worley_plates(w, h, p, seed)
        }
        (NoiseParams::Worley(p), Some("boundaries")) => {
            noisegen::generate_worley_plate_boundaries(w, h, p, seed)
        }
        (NoiseParams::Worley(p), Some("volcanic")) => {
            noisegen::generate_worley_volcanic(w, h, p, seed)
        }
        (NoiseParams::Worley(p), Some("fractures")) => {
            noisegen::generate_worley_fracture_zones(w, h, p, seed)
        }
        _ => noisegen::generate(w, h, params, seed),
    }
}
