use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use flyscene_assets::{AssetLoader, DirSource, PendingLoad};
use flyscene_input::KeyEvent;
use flyscene_render::{DebugTextRenderer, DemoConfig, ManualClock, SceneContext};
use flyscene_scene::{AssetPaths, Light, LightRig, ObjectName, ScenePopulation};
use futures::executor::block_on;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flyscene-cli", about = "Headless tool for the flyscene demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset root directory, overriding the config
    #[arg(long)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, lights, bindings and tunables
    Info,
    /// Run the frame loop headless and print the last frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Keys held for the whole run, e.g. `w,ArrowLeft`
        #[arg(long, value_delimiter = ',')]
        hold: Vec<String>,
        /// Simulated time per frame in milliseconds
        #[arg(long, default_value = "16")]
        dt_ms: u64,
        #[arg(long, default_value = "1280")]
        width: u32,
        #[arg(long, default_value = "720")]
        height: u32,
        /// Skip loading textures and the model
        #[arg(long)]
        no_assets: bool,
        /// Print a frame summary every N frames (0 = last frame only)
        #[arg(long, default_value = "0")]
        print_every: u64,
    },
    /// Load each scene asset and report what was decoded
    Assets,
    /// Write the effective config as YAML
    DumpConfig {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    if let Some(root) = cli.assets {
        config.assets.root = root;
    }

    match cli.command {
        Commands::Info => info(&config),
        Commands::Simulate {
            ticks,
            hold,
            dt_ms,
            width,
            height,
            no_assets,
            print_every,
        } => {
            let run = SimulateArgs {
                ticks,
                hold,
                dt: Duration::from_millis(dt_ms),
                width,
                height,
                load_assets: !no_assets,
                print_every,
            };
            simulate(&config, &run)?;
        }
        Commands::Assets => assets(&config),
        Commands::DumpConfig { out } => {
            match out {
                Some(path) => {
                    config.save(&path)?;
                    println!("wrote {}", path.display());
                }
                None => print!("{}", config.to_yaml_string()?),
            }
        }
    }

    Ok(())
}

fn info(config: &DemoConfig) {
    println!("flyscene-cli v{}", env!("CARGO_PKG_VERSION"));

    let mut rig = LightRig::demo();
    rig.ambient.color = config.params.ambient_color;
    println!("Lights:");
    let names = ["primary", "secondary", "tertiary", "ambient"];
    for (name, light) in names.iter().zip(rig.lights()) {
        match light {
            Light::Point(point) => {
                let p = point.position;
                println!(
                    "  {name:<9} color={} intensity={} pos=({}, {}, {})",
                    point.color, point.intensity, p.x, p.y, p.z
                );
            }
            Light::Ambient(ambient) => println!(
                "  {name:<9} color={} intensity={}",
                ambient.color, ambient.intensity
            ),
        }
    }

    let m = &config.motion;
    println!(
        "Motion: speed={} rotation_step={} max_pitch={:.4} time_scaled={} reference_hz={}",
        m.speed, m.rotation_step, m.max_pitch, m.time_scaled, m.reference_hz
    );
    let p = &config.params;
    println!(
        "Params: cube={} plane={} spin_velocity={}",
        p.cube_color, p.plane_color, p.spin_velocity
    );

    println!("Bindings:");
    for (key, movement) in config.bindings.iter() {
        println!("  {key:<10} -> {movement:?}");
    }

    println!("Assets (root {}):", config.assets.root.display());
    let paths = &config.assets.paths;
    for path in [&paths.wood_floor, &paths.brick, &paths.model] {
        println!("  {path}");
    }

    let names: Vec<&str> = ObjectName::ALL.iter().map(|n| n.as_str()).collect();
    println!("Objects: {}", names.join(", "));
}

struct SimulateArgs {
    ticks: u64,
    hold: Vec<String>,
    dt: Duration,
    width: u32,
    height: u32,
    load_assets: bool,
    print_every: u64,
}

fn simulate(config: &DemoConfig, run: &SimulateArgs) -> anyhow::Result<()> {
    let clock = ManualClock::new();
    let aspect = run.width as f32 / run.height.max(1) as f32;
    let mut ctx = SceneContext::new(config, aspect).with_clock(clock.clone());
    let mut renderer = DebugTextRenderer::new(run.width, run.height);

    if run.load_assets {
        let loader = AssetLoader::new(DirSource::new(&config.assets.root));
        ctx.set_population(load_blocking(&loader, &config.assets.paths));
    }

    for key in &run.hold {
        if ctx.handle_key(&KeyEvent::pressed(key.as_str())).is_none() {
            tracing::warn!(key = %key, "held key has no binding");
        }
    }

    for _ in 0..run.ticks {
        clock.advance(run.dt);
        let stats = ctx.frame(&mut renderer)?;
        if stats.population.ready.is_some() {
            tracing::info!(frame = stats.frame, "scene objects ready");
        }
        if run.print_every > 0 && stats.frame % run.print_every == 0 {
            print!("{}", renderer.last_output());
        }
    }

    if run.print_every == 0 || run.ticks % run.print_every != 0 {
        print!("{}", renderer.last_output());
    }
    println!(
        "Registry: {} of {} objects present, ready={}",
        ctx.registry.len(),
        ObjectName::ALL.len(),
        ctx.objects_ready()
    );
    Ok(())
}

/// Resolve every load before the first frame so runs are deterministic.
fn load_blocking(loader: &AssetLoader, paths: &AssetPaths) -> ScenePopulation {
    let wood = block_on(loader.load_texture(&paths.wood_floor));
    let brick = block_on(loader.load_texture(&paths.brick));
    let model = block_on(loader.load_model(&paths.model));
    ScenePopulation::new(
        PendingLoad::ready(&paths.wood_floor, wood),
        PendingLoad::ready(&paths.brick, brick),
        PendingLoad::ready(&paths.model, model),
    )
}

fn assets(config: &DemoConfig) {
    let loader = AssetLoader::new(DirSource::new(&config.assets.root));
    let paths = &config.assets.paths;
    println!("Asset root: {}", config.assets.root.display());

    for path in [&paths.wood_floor, &paths.brick] {
        match block_on(loader.load_texture(path)) {
            Ok(tex) => println!(
                "  ok   {path}: {}x{} texture, id {}",
                tex.width, tex.height, tex.id
            ),
            Err(e) => println!("  FAIL {path}: {e}"),
        }
    }
    match block_on(loader.load_model(&paths.model)) {
        Ok(model) => println!(
            "  ok   {}: {} meshes, {} triangles, id {}",
            paths.model,
            model.meshes.len(),
            model.triangle_count(),
            model.id
        ),
        Err(e) => println!("  FAIL {}: {e}", paths.model),
    }
}
