//! The whole run: load, partition, convert, tabulate, write.

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::geojson_export::{ConvertOptions, GeoJsonConverter, NodeLocations, OsmGeoJson};
use crate::output::{write_geojson, write_way_nodes};
use crate::overpass::OverpassDocument;
use crate::partitioner::split_nodes_and_ways;
use crate::way_nodes::way_node_rows;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub elements: usize,
    pub nodes: usize,
    pub ways: usize,
    pub node_features: usize,
    pub way_features: usize,
    pub way_node_rows: usize,
}

/// Runs with the built-in converter, keeping every tag. Ways resolve their coordinates
/// against every node in the export, since the ways partition carries none.
pub fn run(config: &Config) -> Result<RunSummary> {
    let document = load(config)?;
    let locations = NodeLocations::from_document(&document);
    let converter = OsmGeoJson::new(ConvertOptions::keep_all_tags()).with_node_locations(locations);
    process(config, &document, &converter)
}

/// Runs with a caller-supplied converter.
pub fn run_with(config: &Config, converter: &dyn GeoJsonConverter) -> Result<RunSummary> {
    let document = load(config)?;
    process(config, &document, converter)
}

fn load(config: &Config) -> Result<OverpassDocument> {
    let input = config.input_path();
    info!("Loading {}", input.display());
    let document = OverpassDocument::load(&input)?;
    document.log_summary();
    Ok(document)
}

pub fn process(
    config: &Config,
    document: &OverpassDocument,
    converter: &dyn GeoJsonConverter,
) -> Result<RunSummary> {
    let (nodes, ways) = split_nodes_and_ways(document);
    let rows = way_node_rows(&ways);

    let node_collection = converter.convert(&nodes);
    let way_collection = converter.convert(&ways);

    write_geojson(&config.nodes_path(), &node_collection)?;
    write_geojson(&config.ways_path(), &way_collection)?;
    write_way_nodes(&config.way_nodes_path(), &rows)?;

    Ok(RunSummary {
        elements: document.elements.len(),
        nodes: nodes.elements.len(),
        ways: ways.elements.len(),
        node_features: node_collection.features.len(),
        way_features: way_collection.features.len(),
        way_node_rows: rows.len(),
    })
}
