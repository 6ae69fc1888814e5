// src/core/mod.rs — Concolic iteration engine

pub mod controller;
pub mod executor;
pub mod state;
pub mod types;
