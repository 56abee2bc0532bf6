pub mod build;
pub mod card;
pub mod config;
pub mod eval;
pub mod output;
pub mod rng;
pub mod simulation;
pub mod tags;
