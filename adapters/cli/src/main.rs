#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a map, selects an actor and walks it.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{CliConfig, OutputFormat, DEFAULT_MAPS_DIR};
use session::Session;
use tactics_grid_core::{ActorId, Command, MapCoord, MovementBudget};
use tactics_grid_system_bootstrap::{MapCatalog, ScatterObstacles};
use tactics_grid_world::Topology;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SCATTER_MAP: &str = "scatter";

/// Explore reachability and movement on tactics grid maps.
#[derive(Debug, Parser)]
#[command(name = "tactics-grid", version)]
struct Cli {
    /// Optional TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory containing `*.toml` map documents.
    #[arg(long, global = true)]
    maps: Option<PathBuf>,
    /// Map to load from the catalog.
    #[arg(long, global = true)]
    map: Option<String>,
    /// Output format for frames.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// List the maps found in the catalog.
    Maps,
    /// Select an actor and show the tiles it can reach.
    Reach {
        /// Actor identifier from the map document.
        #[arg(long)]
        actor: u32,
    },
    /// Select an actor and walk it to a reachable tile.
    Move {
        /// Actor identifier from the map document.
        #[arg(long)]
        actor: u32,
        /// Destination as `x,y`.
        #[arg(long, value_parser = parse_coord)]
        to: MapCoord,
    },
    /// Generate a seeded obstacle map and show one actor's reach.
    Scatter {
        /// Map width in tiles.
        #[arg(long, default_value_t = 12)]
        columns: u32,
        /// Map height in tiles.
        #[arg(long, default_value_t = 8)]
        rows: u32,
        /// Probability that a tile is an obstacle.
        #[arg(long, default_value_t = 0.25)]
        density: f64,
        /// Generator seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Starting tile of the actor as `x,y`.
        #[arg(long, value_parser = parse_coord, default_value = "0,0")]
        at: MapCoord,
        /// Movement budget of the actor.
        #[arg(long, default_value_t = 4)]
        budget: u32,
        /// Use hex adjacency instead of orthogonal.
        #[arg(long)]
        hex: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(&config)?;

    let format = cli.format.or(config.format).unwrap_or_default();
    let maps_dir = cli
        .maps
        .clone()
        .or_else(|| config.maps_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPS_DIR));
    let map_name = cli.map.clone().or_else(|| config.default_map.clone());

    match cli.command {
        Action::Maps => {
            let catalog = MapCatalog::from_dir(&maps_dir)?;
            list_maps(&catalog, format)
        }
        Action::Reach { actor } => {
            let mut session = open_catalog_map(&maps_dir, map_name.as_deref())?;
            let reachable = session.select(ActorId::new(actor))?;
            print_reach(&session, ActorId::new(actor), reachable, format)
        }
        Action::Move { actor, to } => {
            let actor = ActorId::new(actor);
            let mut session = open_catalog_map(&maps_dir, map_name.as_deref())?;
            let _ = session.select(actor)?;
            let mut taken = 0_usize;
            let steps = session.walk(to, |session, cell| {
                taken += 1;
                if format == OutputFormat::Text {
                    println!("step {taken}: {actor} -> {cell}");
                }
                print_frame(session, format)
            })?;
            if format == OutputFormat::Text {
                let cell = session
                    .actor_cell(actor)
                    .with_context(|| format!("actor {actor} vanished during the move"))?;
                println!("{actor} arrived at {cell} after {steps} steps");
            }
            Ok(())
        }
        Action::Scatter {
            columns,
            rows,
            density,
            seed,
            at,
            budget,
            hex,
        } => {
            let topology = if hex {
                Topology::HexOddRow
            } else {
                Topology::Orthogonal
            };
            let grid = ScatterObstacles {
                columns,
                rows,
                density,
                seed,
            }
            .into_grid(SCATTER_MAP)
            .with_topology(topology);
            let actor = ActorId::new(1);
            let spawn = Command::SpawnActor {
                actor,
                cell: at,
                budget: MovementBudget::new(budget),
            };
            let mut session = Session::start(&grid, SCATTER_MAP, vec![spawn])?;
            let reachable = session.select(actor)?;
            print_reach(&session, actor, reachable, format)
        }
    }
}

fn init_tracing(config: &CliConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.log_filter())
            .with_context(|| format!("invalid log filter `{}`", config.log_filter()))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}

fn open_catalog_map(maps_dir: &std::path::Path, map: Option<&str>) -> Result<Session> {
    let Some(name) = map else {
        bail!("no map selected; pass --map or set default_map in the config file");
    };
    let catalog = MapCatalog::from_dir(maps_dir)?;
    let spawns = match catalog.document(name) {
        Some(document) => document
            .spawn_commands()
            .with_context(|| format!("map `{name}` lists an invalid actor"))?,
        None => Vec::new(),
    };
    let session = Session::start(&catalog, name, spawns)?;
    info!(map = name, dir = %maps_dir.display(), "session_started");
    Ok(session)
}

fn list_maps(catalog: &MapCatalog, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for name in catalog.names() {
                println!("{name}");
            }
        }
        OutputFormat::Json => {
            let names: Vec<&str> = catalog.names().collect();
            println!("{}", serde_json::to_string(&names)?);
        }
    }
    Ok(())
}

fn print_reach(
    session: &Session,
    actor: ActorId,
    reachable: usize,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Text {
        let cell = session
            .actor_cell(actor)
            .with_context(|| format!("actor {actor} is not on the map"))?;
        println!(
            "map {}: actor {actor} at {cell} reaches {reachable} tiles",
            session.map_name()
        );
    }
    print_frame(session, format)
}

fn print_frame(session: &Session, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if let Some(frame) = session.frame() {
                print!("{frame}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&session.report())?),
    }
    Ok(())
}

fn parse_coord(value: &str) -> Result<MapCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|error| format!("invalid coordinate `{part}` in `{value}`: {error}"))
    };
    Ok(MapCoord::new(parse(x)?, parse(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_with_optional_spaces() {
        assert_eq!(parse_coord("2, -3"), Ok(MapCoord::new(2, -3)));
        assert!(parse_coord("2").is_err());
        assert!(parse_coord("a,1").is_err());
    }

    #[test]
    fn move_arguments_parse() {
        let cli = Cli::try_parse_from([
            "tactics-grid",
            "--map",
            "open_field",
            "move",
            "--actor",
            "1",
            "--to",
            "2,4",
        ])
        .expect("arguments parse");

        assert_eq!(cli.map.as_deref(), Some("open_field"));
        assert!(matches!(
            cli.command,
            Action::Move { actor: 1, to } if to == MapCoord::new(2, 4)
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
