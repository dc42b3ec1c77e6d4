// src/pipeline/mod.rs
//! The four pipelines, one module each. Every location is hard-coded;
//! there is no CLI surface or configuration layer, and the binaries just
//! call `run()`.

pub mod banks;
pub mod cars;
pub mod films;
pub mod people;
