//! `BestPhoto`: pick the best photo of a batch with a hosted vision model, then
//! upscale it or remove its background through a hosted image CDN.

pub mod adapters;
pub mod api;
pub mod cassette;
pub mod category;
pub mod cli;
pub mod config;
pub mod context;
pub mod encoder;
pub mod error;
pub mod model;
pub mod ports;
pub mod processing;
pub mod selection;
pub mod session;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use category::Category;
pub use error::PhotoError;
