#[macro_use]
extern crate tracing;

pub mod buffer;
pub mod cli;
pub mod geometry;
pub mod params;
pub mod recognizer;
pub mod replay;
