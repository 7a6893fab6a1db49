use std::path::Path;

pub mod config;
pub mod error;
pub mod geojson_export;
pub mod output;
pub mod overpass;
pub mod partitioner;
pub mod pipeline;
pub mod way_nodes;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::RunSummary;

/// Converts `<workdir>/raw-osm.json` into `nodes.geojson`, `ways.geojson` and `way_nodes.sql`
/// in the same directory.
pub fn process_workdir(workdir: &Path) -> Result<RunSummary> {
    pipeline::run(&Config::new(workdir))
}
