// src/lib.rs — Library root for catg

pub mod cli;
pub mod core;
pub mod infra;
pub mod workspace;
