use std::path::PathBuf;
use std::sync::Arc;

use browserworld_assets::ModelLibrary;
use browserworld_common::{ActivityRef, AssetManagerRef};
use browserworld_host::{HostRuntime, RecordingHost};
use browserworld_render::HeadlessContext;
use browserworld_world::{BrowserWorld, WorldConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "browserworld-cli", about = "Headless driver for browserworld sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run a session against the headless engine and a recording host
    Run {
        /// Number of frames to draw
        #[arg(short, long, default_value = "240")]
        frames: u32,
        /// Viewport width in pixels
        #[arg(long, default_value = "1920")]
        width: f32,
        /// Viewport height in pixels
        #[arg(long, default_value = "1080")]
        height: f32,
        /// World config file (.json, .yaml or .yml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Model library JSON file; the built-in models are used otherwise
        #[arg(long)]
        models: Option<PathBuf>,
        /// Fail the first N GL initializations
        #[arg(long, default_value = "0")]
        gl_failures: u32,
        /// Run without a host callback
        #[arg(long)]
        detached: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the default world config as YAML
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("browserworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", browserworld_render::crate_info());
            println!("assets: {}", browserworld_assets::crate_info());
        }
        Commands::Run {
            frames,
            width,
            height,
            config,
            models,
            gl_failures,
            detached,
            json,
        } => {
            let config = match config {
                Some(path) => WorldConfig::load(&path)?,
                None => WorldConfig::default(),
            };
            let library = match models {
                Some(path) => ModelLibrary::load(&path)?,
                None => ModelLibrary::with_builtin_models(),
            };
            let host = Arc::new(RecordingHost::new());

            let mut world = BrowserWorld::with_config(
                HeadlessContext::with_gl_failures(gl_failures),
                Box::new(library),
                config,
            );
            let runtime: Option<Arc<dyn HostRuntime>> = if detached {
                None
            } else {
                Some(host.clone())
            };
            world.attach_host_environment(runtime, Some(ActivityRef(1)), Some(AssetManagerRef(1)));
            world.set_viewport(width, height);
            world.initialize_graphics();
            world.resume();
            for _ in 0..frames {
                world.draw_frame();
            }
            tracing::info!(frames, state = ?world.state(), "session finished");

            let summary = world.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
                if let Some(frame) = world.context().last_frame() {
                    print!("{frame}");
                }
            }

            world.shutdown();
            for call in host.calls() {
                let surface = call
                    .surface
                    .map_or_else(|| "null".to_owned(), |s| s.to_string());
                println!(
                    "host: setSurfaceTexture({}, {surface}, {}, {})",
                    call.name, call.width, call.height
                );
            }
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&WorldConfig::default())?);
        }
    }

    Ok(())
}
