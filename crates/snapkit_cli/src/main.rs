//! Snapkit CLI
//!
//! Resolve snap targets for a scene and replay scripted scroll sessions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use snapkit_core::{
    ElementId, EngineConfig, LogicalAxis, PhysicalAxis, Point, SnapTree, StyleAndGeometryProvider,
};
use snapkit_events::SnapTargetResolver;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod scene;

use scene::{replay, Scene};

#[derive(Parser)]
#[command(name = "snapkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scroll-snap target resolution and change notifications", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the snap targets of a scene's container
    Resolve {
        /// Scene file
        scene: PathBuf,

        /// Horizontal scroll offset to resolve at
        #[arg(long, default_value = "0")]
        scroll_left: f32,

        /// Vertical scroll offset to resolve at
        #[arg(long, default_value = "0")]
        scroll_top: f32,

        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay a scene's scripted steps and print every notification
    Replay {
        /// Scene file
        scene: PathBuf,

        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Resolve {
            scene,
            scroll_left,
            scroll_top,
            config,
        } => cmd_resolve(&scene, Point::new(scroll_left, scroll_top), config.as_deref()),

        Commands::Replay { scene, config } => cmd_replay(&scene, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            info!("Using engine config {}", path.display());
            Ok(EngineConfig::load(path)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn display_name(tree: &SnapTree, id: Option<ElementId>) -> String {
    match id {
        Some(id) => tree
            .name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", id)),
        None => "-".to_string(),
    }
}

fn cmd_resolve(path: &Path, offset: Point, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let scene = Scene::load(path)?;
    let (mut tree, container) = scene.build()?;

    let applied = tree.set_scroll_offset(container, offset);
    if applied != offset {
        info!("Scroll offset clamped to ({}, {})", applied.x, applied.y);
    }

    let resolver = SnapTargetResolver::new(config.resolver);
    let writing_mode = tree
        .style(container)
        .map(|style| style.writing_mode)
        .unwrap_or_default();

    println!("container: {}", display_name(&tree, Some(container)));
    println!("writing-mode: {}", writing_mode);
    for axis in [PhysicalAxis::X, PhysicalAxis::Y] {
        let target = resolver.resolve_physical(&tree, container, axis);
        println!("{:?}: {}", axis, display_name(&tree, target));
    }
    for axis in [LogicalAxis::Block, LogicalAxis::Inline] {
        let target = resolver.resolve(&tree, container, axis);
        println!("{:?}: {}", axis, display_name(&tree, target));
    }

    Ok(())
}

fn cmd_replay(path: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let scene = Scene::load(path)?;
    info!(
        "Replaying {} steps on '{}'",
        scene.steps.len(),
        scene.container.name
    );

    let notifications = replay(&scene, config)?;
    if notifications.is_empty() {
        info!("No notifications");
    }
    for notification in notifications {
        println!(
            "{:>6} ms  {:<18}  block={}  inline={}",
            notification.at.as_millis(),
            notification.kind.event_type(),
            notification.block.as_deref().unwrap_or("-"),
            notification.inline.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
