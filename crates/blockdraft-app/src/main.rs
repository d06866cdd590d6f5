//! Main application entry point.

use std::path::PathBuf;

use anyhow::Result;
use blockdraft_app::{App, AppConfig, ShortcutRegistry, demo_registry};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "blockdraft")]
#[command(about = "Drive the BlockDraft page editor from layout and script files")]
struct Cli {
    /// Application config (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session script and print the resulting layout
    Run {
        /// Starting layout; an empty container when omitted
        #[arg(long)]
        layout: Option<PathBuf>,
        /// Session script (JSON array of steps)
        #[arg(long)]
        script: PathBuf,
        /// Write the layout here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print each block of a layout as the demo renderer draws it
    Outline {
        #[arg(long)]
        layout: PathBuf,
    },
    /// List keyboard shortcuts
    Shortcuts,
    /// List the demo components
    Components,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    log::info!("Starting {}", config.title);

    match cli.command {
        Command::Run {
            layout,
            script,
            output,
        } => {
            let mut app = App::new(config)?;
            if let Some(layout) = layout {
                app.load_layout(&layout)?;
            }
            app.run_script_file(&script)?;
            match output {
                Some(path) => app.save_layout(&path)?,
                None => println!("{}", app.layout_json()?),
            }
        }
        Command::Outline { layout } => {
            let mut app = App::new(config)?;
            app.load_layout(&layout)?;
            for line in app.outline()? {
                println!("{line}");
            }
        }
        Command::Shortcuts => ShortcutRegistry::print_all(),
        Command::Components => {
            let registry = demo_registry();
            for (key, component) in registry.components() {
                let capability = registry.resize_capability(key);
                println!(
                    "  {key:14} {:16} {:12} handles={}",
                    component.label,
                    registry.preview(key)?,
                    capability.handles().len()
                );
            }
        }
    }
    Ok(())
}
