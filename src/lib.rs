//! Production chain planner
//!
//! Resolves the upstream recipe chain needed to sustain a target output
//! rate, one visible hop at a time, with per-node expansion budgets.

pub mod aggregate;
pub mod catalog;
pub mod db;
pub mod error;
pub mod expansion;
pub mod graph;
pub mod import;
pub mod models;
pub mod planner;
pub mod preferences;
pub mod rate;
pub mod report;

pub use catalog::RecipeCatalog;
pub use error::{CatalogError, PlannerError};
pub use graph::{ChainState, FanInPolicy, PlannerConfig, resolve};
pub use models::{GraphEdge, GraphNode, Recipe, Snapshot, Target};
pub use planner::Planner;
