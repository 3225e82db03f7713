//! Production Chain Planner
//!
//! Command-line front end for the chain resolution engine.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use regex::Regex;
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use chain_planner::report::{ChainSummary, format_chain};
use chain_planner::{FanInPolicy, Planner, PlannerConfig, Recipe, RecipeCatalog, Target};
use chain_planner::{db, import};

#[derive(Parser)]
#[command(name = "chain-planner")]
#[command(about = "Production chain planner for multi-stage crafting recipes")]
struct Cli {
    /// Path to the SQLite catalog store
    #[arg(short, long, default_value = "recipes.db", global = true)]
    database: PathBuf,

    /// Read recipes from a catalog JSON file instead of the store
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    /// Log more (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Import a catalog JSON file, or every *.json under a directory
    Import {
        /// Catalog file or directory
        source: PathBuf,

        /// Clear stored recipes before importing
        #[arg(long)]
        clear: bool,
    },

    /// Load a small built-in catalog for trying things out
    LoadSample,

    /// List all recipes in catalog order
    ListRecipes,

    /// List known products
    ListProducts {
        /// Only products matching this regular expression
        #[arg(short, long)]
        filter: Option<String>,

        /// Only raw materials (products no recipe makes)
        #[arg(long)]
        raw: bool,
    },

    /// Show one recipe and the alternatives for its outputs
    Recipe {
        /// Recipe ID
        id: String,
    },

    /// Resolve the production chain for a target product
    Calc {
        /// Target product (e.g. "Gear")
        product: String,

        /// Target rate in units per minute
        #[arg(short, long, default_value = "60.0")]
        rate: f64,

        /// Use this recipe for the target
        #[arg(long)]
        target_recipe: Option<String>,

        /// Sticky recipe choice, PRODUCT=RECIPE_ID (repeatable)
        #[arg(long = "recipe-for", value_name = "PRODUCT=RECIPE_ID")]
        recipe_for: Vec<String>,

        /// Sticky building choice, PRODUCT=BUILDING (repeatable)
        #[arg(long = "building-for", value_name = "PRODUCT=BUILDING")]
        building_for: Vec<String>,

        /// Expand upstream from a node, NODE_ID=HOPS (repeatable)
        #[arg(short, long, value_name = "NODE_ID=HOPS")]
        expand: Vec<String>,

        /// Expand every root as far as the catalog goes
        #[arg(long)]
        expand_all: bool,

        /// Collapse the branch feeding a node (repeatable)
        #[arg(long, value_name = "NODE_ID")]
        collapse: Vec<String>,

        /// Swap a node's recipe, NODE_ID=RECIPE_ID (repeatable)
        #[arg(long, value_name = "NODE_ID=RECIPE_ID")]
        swap: Vec<String>,

        /// How demand is counted when several steps share a supplier
        #[arg(long, value_enum, default_value_t = FanInArg::Summed)]
        fan_in: FanInArg,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Show the production tree
        #[arg(short, long)]
        tree: bool,
    },
}

/// `--fan-in` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FanInArg {
    /// Count a shared step only for the consumer that reached it first
    FirstWins,
    /// Sum the demand of every consumer
    Summed,
}

impl From<FanInArg> for FanInPolicy {
    fn from(arg: FanInArg) -> Self {
        match arg {
            FanInArg::FirstWins => FanInPolicy::FirstWins,
            FanInArg::Summed => FanInPolicy::Summed,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Init => {
            open_store(&cli)?;
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::Import { source, clear } => {
            let conn = open_store(&cli)?;
            if *clear {
                println!("Clearing stored recipes...");
                db::clear_catalog(&conn)?;
            }
            let stats = import::import_to_database(&conn, source)?;
            println!("{}", stats);
        }

        Commands::LoadSample => {
            let conn = open_store(&cli)?;
            db::clear_catalog(&conn)?;
            let recipes = sample_recipes();
            for recipe in &recipes {
                db::insert_recipe(&conn, recipe)?;
            }
            println!("Loaded {} sample recipes", recipes.len());
        }

        Commands::ListRecipes => {
            let catalog = load_catalog(&cli)?;
            if catalog.is_empty() {
                println!("No recipes loaded. Run 'import' or 'load-sample' first.");
            } else {
                println!("{:<24} {:<16} {:>8}  {}", "Recipe", "Building", "Time (s)", "Outputs");
                println!("{}", "-".repeat(70));
                for r in catalog.recipes() {
                    let outputs: Vec<_> = r.outputs.iter().map(|o| o.name.as_str()).collect();
                    println!(
                        "{:<24} {:<16} {:>8.1}  {}",
                        r.recipe_id,
                        r.building,
                        r.time_sec,
                        outputs.join(", ")
                    );
                }
            }
        }

        Commands::ListProducts { filter, raw } => {
            let catalog = load_catalog(&cli)?;
            let pattern = filter
                .as_deref()
                .map(|f| Regex::new(&format!("(?i){}", f)))
                .transpose()
                .context("Invalid --filter pattern")?;

            let products = if *raw {
                catalog.raw_materials()
            } else {
                catalog.products()
            };
            for name in products
                .into_iter()
                .filter(|p| pattern.as_ref().is_none_or(|re| re.is_match(p)))
            {
                let marker = if catalog.is_craftable(name) { "" } else { " (raw)" };
                println!("  {}{}", name, marker);
            }
        }

        Commands::Recipe { id } => {
            let catalog = load_catalog(&cli)?;
            if let Some(r) = catalog.recipe(id) {
                println!("Recipe: {}", r.recipe_id);
                println!("  Building: {}", r.building);
                println!("  Cycle: {}s", r.time_sec);
                if !r.inputs.is_empty() {
                    println!("  Inputs:");
                    for i in &r.inputs {
                        println!("    {} x{}", i.name, i.qty_per_cycle);
                    }
                }
                println!("  Outputs:");
                for o in &r.outputs {
                    println!(
                        "    {} x{} ({:.2}/min)",
                        o.name,
                        o.qty_per_cycle,
                        catalog.output_rate_per_min(r, &o.name)
                    );
                    let others: Vec<_> = catalog
                        .producers(&o.name)
                        .into_iter()
                        .filter(|p| p.recipe_id != r.recipe_id)
                        .map(|p| format!("{} ({})", p.recipe_id, p.building))
                        .collect();
                    if !others.is_empty() {
                        println!("      also made by: {}", others.join(", "));
                    }
                }
            } else {
                println!("Recipe '{}' not found", id);
            }
        }

        Commands::Calc {
            product,
            rate,
            target_recipe,
            recipe_for,
            building_for,
            expand,
            expand_all,
            collapse,
            swap,
            fan_in,
            json,
            tree,
        } => {
            let catalog = load_catalog(&cli)?;
            let config = PlannerConfig {
                fan_in: FanInPolicy::from(*fan_in),
                ..PlannerConfig::default()
            };
            let mut planner = Planner::with_config(&catalog, config);

            for choice in recipe_for {
                let (product, recipe_id) = parse_assignment(choice)?;
                planner.set_choice_recipe(&product, Some(recipe_id.as_str()))?;
            }
            for choice in building_for {
                let (product, building) = parse_assignment(choice)?;
                planner.set_choice_building(&product, &building);
            }

            let mut target = Target::new(product.as_str(), *rate)?;
            if let Some(recipe_id) = target_recipe {
                target = target.with_recipe(recipe_id.as_str());
            }
            planner.set_target(target)?;

            for arg in expand {
                let (node, hops) = parse_assignment(arg)?;
                let hops: u32 = hops
                    .parse()
                    .with_context(|| format!("Invalid hop count in '{}'", arg))?;
                planner.expand_branch_by(&node, hops);
            }
            if *expand_all {
                let roots: Vec<String> = planner
                    .snapshot()
                    .graph_nodes
                    .iter()
                    .filter(|n| n.depth == 0)
                    .map(|n| n.id.clone())
                    .collect();
                for root in roots {
                    planner.expand_branch_all(&root);
                }
            }
            for node in collapse {
                planner.collapse_branch(node);
            }
            for arg in swap {
                let (node, recipe_id) = parse_assignment(arg)?;
                planner.swap_node_recipe(&node, &recipe_id)?;
            }

            let snapshot = planner.snapshot();
            if *json {
                println!("{}", serde_json::to_string_pretty(snapshot)?);
            } else {
                if snapshot.graph_nodes.is_empty() {
                    println!("'{}' has no producing recipe; it is a raw material.", product);
                }
                if *tree {
                    println!("Production chain:\n");
                    println!("{}", format_chain(snapshot));
                }
                println!("{}", ChainSummary { snapshot });
            }
        }
    }

    Ok(())
}

/// Initialize tracing subscriber, logging to stderr
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(cli: &Cli) -> Result<Connection> {
    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn load_catalog(cli: &Cli) -> Result<RecipeCatalog> {
    match &cli.catalog {
        Some(path) => import::read_catalog_file(path),
        None => db::load_catalog(&open_store(cli)?),
    }
}

/// Split `KEY=VALUE`, trimming both sides
fn parse_assignment(arg: &str) -> Result<(String, String)> {
    let re = Regex::new(r"^\s*([^=]+?)\s*=\s*(.+?)\s*$")?;
    let caps = re
        .captures(arg)
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", arg))?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Small smelting/assembly catalog with one alternate recipe
fn sample_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("iron-plate", "Furnace", 3.2)
            .with_input("Iron Ore", 1.0)
            .with_output("Iron Plate", 1.0),
        Recipe::new("iron-plate-press", "Press", 2.0)
            .with_input("Iron Ore", 2.0)
            .with_output("Iron Plate", 1.0)
            .with_output("Slag", 1.0),
        Recipe::new("copper-plate", "Furnace", 3.2)
            .with_input("Copper Ore", 1.0)
            .with_output("Copper Plate", 1.0),
        Recipe::new("steel", "Furnace", 16.0)
            .with_input("Iron Plate", 5.0)
            .with_output("Steel", 1.0),
        Recipe::new("gear", "Assembler", 0.5)
            .with_input("Iron Plate", 2.0)
            .with_output("Gear", 1.0),
        Recipe::new("cable", "Assembler", 0.5)
            .with_input("Copper Plate", 1.0)
            .with_output("Copper Cable", 2.0),
        Recipe::new("circuit", "Assembler", 0.5)
            .with_input("Iron Plate", 1.0)
            .with_input("Copper Cable", 3.0)
            .with_output("Circuit", 1.0),
        Recipe::new("motor", "Assembler", 10.0)
            .with_input("Gear", 1.0)
            .with_input("Steel", 1.0)
            .with_input("Circuit", 2.0)
            .with_output("Motor", 1.0),
        Recipe::new("robot", "Assembler", 20.0)
            .with_input("Motor", 2.0)
            .with_input("Circuit", 3.0)
            .with_output("Robot", 1.0),
    ]
}
