use log::info;

use crate::overpass::{ElementType, OverpassDocument};

/// Copy of `document` that keeps only elements of `element_type`, in their original order.
///
/// The header is cloned as-is and every kept element is cloned, so the result shares nothing
/// with the source document or with any other partition.
pub fn partition_by_type(document: &OverpassDocument, element_type: ElementType) -> OverpassDocument {
    info!("Pre-filter elements: {}", document.elements.len());
    let elements: Vec<_> = document
        .elements
        .iter()
        .filter(|element| element.element_type() == Some(element_type))
        .cloned()
        .collect();
    info!("Post-filter elements: {}", elements.len());

    OverpassDocument {
        version: document.version,
        generator: document.generator.clone(),
        osm3s: document.osm3s.clone(),
        elements,
    }
}

/// Node partition first, then way partition.
pub fn split_nodes_and_ways(document: &OverpassDocument) -> (OverpassDocument, OverpassDocument) {
    let nodes = partition_by_type(document, ElementType::Node);
    let ways = partition_by_type(document, ElementType::Way);
    (nodes, ways)
}
