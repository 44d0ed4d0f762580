mod config;

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{LevelFilter, info, warn};
use simplelog::WriteLogger;
use terrane_blocks::{BlockType, TextureAtlas};
use terrane_grid::VoxelIndex;
use terrane_mesh_cpu::VoxelBody;

use config::SceneConfig;

/// Builds an adaptive voxel body from a scene file and reports its exposed-face mesh.
#[derive(Parser, Debug)]
#[command(name = "terrane")]
struct Args {
    /// Scene TOML file.
    scene: PathBuf,

    /// Atlas TOML file; overrides the scene's atlas.
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Break the voxel at U,V,W. Repeatable.
    #[arg(long = "break", value_name = "U,V,W")]
    breaks: Vec<VoxelIndex>,

    /// Place a block at U,V,W. Repeatable.
    #[arg(long = "place", value_name = "U,V,W=BLOCK", value_parser = parse_placement)]
    places: Vec<(VoxelIndex, BlockType)>,

    /// Print the occupied neighbors of U,V,W. Repeatable.
    #[arg(long, value_name = "U,V,W")]
    neighbors: Vec<VoxelIndex>,

    /// Merge all voxel meshes and report the combined buffer.
    #[arg(long)]
    combine: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_placement(s: &str) -> Result<(VoxelIndex, BlockType), String> {
    let (ix, block) = s
        .split_once('=')
        .ok_or_else(|| format!("expected 'U,V,W=BLOCK', got '{}'", s))?;
    Ok((ix.parse()?, block.trim().parse()?))
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        Some(path) => {
            WriteLogger::init(LevelFilter::Debug, simplelog::Config::default(), File::create(path)?)?
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init()
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    init_logging(args.log_file.as_deref())?;

    let scene = SceneConfig::from_path(&args.scene)?;
    let base_dir = args.scene.parent().unwrap_or(Path::new("."));
    let atlas = match &args.atlas {
        Some(path) => TextureAtlas::from_path(path)?,
        None => scene.atlas(base_dir)?,
    };
    let grid = scene.build_grid()?;
    info!(
        "loaded {} ({} grid, voxel size {:?})",
        args.scene.display(),
        grid.geometry(),
        scene.grid.voxel_size
    );
    let mut body = VoxelBody::new(grid, atlas);

    for ix in &args.breaks {
        let broke = body.grid().handle(*ix).is_some_and(|h| body.break_voxel(h));
        if broke {
            info!("broke {}", ix);
        } else {
            warn!("no voxel to break at {}", ix);
        }
    }
    for (ix, block) in &args.places {
        if body.place_voxel(*ix, *block) {
            info!("placed {} at {}", block, ix);
        } else {
            warn!("cannot place {} at {}: occupied or not a cell", block, ix);
        }
    }
    for ix in &args.neighbors {
        let existing = body.grid().neighbors_existing(*ix);
        let listed: Vec<String> = existing.iter().map(|n| n.to_string()).collect();
        println!("neighbors of {}: [{}]", ix, listed.join(", "));
    }

    let stats = body.stats();
    let bounds = body.grid().resolution_boundaries();
    println!("geometry:          {}", body.grid().geometry());
    println!("voxels:            {}", stats.voxels);
    println!("exposed voxels:    {}", stats.exposed_voxels);
    println!("triangles:         {}", stats.triangles);
    println!("colliders:         {}", stats.colliders);
    println!("azimuth doublings: {:?}", bounds.azimuth);
    println!("polar doublings:   {:?}", bounds.polar);

    if args.combine {
        let mesh = body.combine();
        println!(
            "combined mesh:     {} vertices, {} triangles, {} uv channels, bounds {:?}..{:?}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.channels(),
            mesh.bbox.min,
            mesh.bbox.max
        );
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
