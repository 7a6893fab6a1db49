//! OSM elements to GeoJSON features.
//!
//! Nodes become points. Ways become line strings, or polygons when they are closed and
//! tagged like an area. Relations are not assembled into geometry.

use std::collections::{HashMap, HashSet};

use geo::{Coord, LineString, Point, Polygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry as GeoJsonGeometry, JsonObject, JsonValue, Value};
use log::{debug, warn};

use crate::overpass::{Element, ElementType, Meta, Node, OverpassDocument, Tags, Way};

/// Turns an Overpass document into a GeoJSON `FeatureCollection`.
pub trait GeoJsonConverter {
    fn convert(&self, document: &OverpassDocument) -> FeatureCollection;
}

/// Editor bookkeeping keys that usually carry no map meaning.
pub const DEFAULT_UNINTERESTING_TAGS: [&str; 9] = [
    "source",
    "source_ref",
    "source:ref",
    "history",
    "attribution",
    "created_by",
    "tiger:county",
    "tiger:tlid",
    "tiger:upload_uuid",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UninterestingTags {
    /// Drop the keys in `DEFAULT_UNINTERESTING_TAGS`.
    #[default]
    Default,
    /// Every tag is interesting and passes through.
    None,
}

impl UninterestingTags {
    pub fn is_uninteresting(&self, key: &str) -> bool {
        match self {
            UninterestingTags::Default => DEFAULT_UNINTERESTING_TAGS.contains(&key),
            UninterestingTags::None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub uninteresting_tags: UninterestingTags,
}

impl ConvertOptions {
    pub fn keep_all_tags() -> Self {
        ConvertOptions {
            uninteresting_tags: UninterestingTags::None,
        }
    }
}

/// Node id to `(lon, lat)` lookup used to resolve way geometry.
#[derive(Debug, Clone, Default)]
pub struct NodeLocations {
    coords: HashMap<i64, Coord<f64>>,
}

impl NodeLocations {
    pub fn from_document(document: &OverpassDocument) -> Self {
        let coords = document
            .nodes()
            .map(|node| (node.id, Coord { x: node.lon, y: node.lat }))
            .collect();
        NodeLocations { coords }
    }

    pub fn get(&self, id: i64) -> Option<Coord<f64>> {
        self.coords.get(&id).copied()
    }

}

/// How a way ends up on the map, depending on how many coordinates resolve.
#[derive(Debug, Clone, PartialEq)]
enum WayShape {
    Point(Point<f64>),
    Line(LineString<f64>),
    Area(Polygon<f64>),
}

/// Built-in converter.
///
/// Way coordinates come from the way's inline `geometry` (Overpass `out geom`), then from
/// nodes in the converted document, then from locations attached with
/// [`OsmGeoJson::with_node_locations`]. A ways-only document therefore still gets geometry
/// when the caller supplies the node partition. A way with no resolvable vertex falls back to
/// its `bounds` (as a rectangle) and then its `center` (as a point).
#[derive(Debug, Clone, Default)]
pub struct OsmGeoJson {
    options: ConvertOptions,
    extra_locations: NodeLocations,
}

impl OsmGeoJson {
    pub fn new(options: ConvertOptions) -> Self {
        OsmGeoJson {
            options,
            extra_locations: NodeLocations::default(),
        }
    }

    pub fn with_node_locations(mut self, locations: NodeLocations) -> Self {
        self.extra_locations = locations;
        self
    }

    fn has_interesting_tags(&self, tags: &Tags) -> bool {
        tags.keys()
            .any(|key| !self.options.uninteresting_tags.is_uninteresting(key))
    }

    fn node_feature(&self, node: &Node) -> Feature {
        let geometry = GeoJsonGeometry::new(Value::Point(vec![node.lon, node.lat]));
        self.feature(ElementType::Node, node.id, geometry, &node.tags, &node.meta)
    }

    /// One slot per node reference, `None` where the location is unknown.
    fn way_locations(&self, way: &Way, local: &NodeLocations) -> Vec<Option<Coord<f64>>> {
        if let Some(geometry) = &way.geometry {
            return geometry
                .iter()
                .map(|p| p.map(|p| Coord { x: p.lon, y: p.lat }))
                .collect();
        }
        way.nodes
            .iter()
            .map(|&id| local.get(id).or_else(|| self.extra_locations.get(id)))
            .collect()
    }

    fn way_shape(&self, way: &Way, local: &NodeLocations) -> Option<WayShape> {
        let locations = self.way_locations(way, local);
        let ends_resolved = matches!(
            (locations.first(), locations.last()),
            (Some(Some(_)), Some(Some(_)))
        );
        let coords: Vec<Coord<f64>> = locations.into_iter().flatten().collect();
        match coords.len() {
            0 => fallback_shape(way),
            1 => Some(WayShape::Point(Point::from(coords[0]))),
            n => {
                let line = LineString::new(coords);
                if n >= 4 && ends_resolved && is_closed(way, &line) && is_area(&way.tags) {
                    Some(WayShape::Area(Polygon::new(line, vec![])))
                } else {
                    Some(WayShape::Line(line))
                }
            }
        }
    }

    fn feature(
        &self,
        element_type: ElementType,
        id: i64,
        geometry: GeoJsonGeometry,
        tags: &Tags,
        meta: &Meta,
    ) -> Feature {
        let osm_id = format!("{}/{}", element_type, id);
        let mut properties = JsonObject::new();
        properties.insert("@id".to_string(), JsonValue::from(osm_id.clone()));
        for (key, value) in tags {
            if !self.options.uninteresting_tags.is_uninteresting(key) {
                properties.insert(key.clone(), JsonValue::from(value.clone()));
            }
        }
        insert_meta(&mut properties, meta);

        Feature {
            bbox: None,
            geometry: Some(geometry),
            id: Some(Id::String(osm_id)),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

impl GeoJsonConverter for OsmGeoJson {
    fn convert(&self, document: &OverpassDocument) -> FeatureCollection {
        let way_vertices: HashSet<i64> = document
            .ways()
            .flat_map(|way| way.nodes.iter().copied())
            .collect();
        let local = NodeLocations::from_document(document);

        let mut features = Vec::new();
        let mut unconverted = 0;
        for element in &document.elements {
            match element {
                Element::Node(node) => {
                    if self.has_interesting_tags(&node.tags) || !way_vertices.contains(&node.id) {
                        features.push(self.node_feature(node));
                    }
                }
                Element::Way(way) => match self.way_shape(way, &local) {
                    Some(shape) => {
                        let geometry = GeoJsonGeometry::new(shape_to_value(&shape));
                        features.push(self.feature(
                            ElementType::Way,
                            way.id,
                            geometry,
                            &way.tags,
                            &way.meta,
                        ));
                    }
                    None => warn!("way/{} has no resolvable coordinates, skipping", way.id),
                },
                _ => unconverted += 1,
            }
        }
        if unconverted > 0 {
            debug!("Left {} relations and other elements out of GeoJSON", unconverted);
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn insert_meta(properties: &mut JsonObject, meta: &Meta) {
    if let Some(timestamp) = &meta.timestamp {
        properties.insert("@timestamp".to_string(), JsonValue::from(timestamp.clone()));
    }
    if let Some(version) = meta.version {
        properties.insert("@version".to_string(), JsonValue::from(version));
    }
    if let Some(changeset) = meta.changeset {
        properties.insert("@changeset".to_string(), JsonValue::from(changeset));
    }
    if let Some(user) = &meta.user {
        properties.insert("@user".to_string(), JsonValue::from(user.clone()));
    }
    if let Some(uid) = meta.uid {
        properties.insert("@uid".to_string(), JsonValue::from(uid));
    }
}

fn shape_to_value(shape: &WayShape) -> Value {
    match shape {
        WayShape::Point(point) => Value::Point(vec![point.x(), point.y()]),
        WayShape::Line(line) => Value::LineString(line.points().map(|p| vec![p.x(), p.y()]).collect()),
        WayShape::Area(polygon) => {
            let exterior: Vec<Vec<f64>> = polygon
                .exterior()
                .points()
                .map(|p| vec![p.x(), p.y()])
                .collect();
            let holes = polygon
                .interiors()
                .iter()
                .map(|ring| ring.points().map(|p| vec![p.x(), p.y()]).collect());
            let mut rings = vec![exterior];
            rings.extend(holes);
            Value::Polygon(rings)
        }
    }
}

/// Shape from `out bb` bounds or `out center` when no vertex resolves.
fn fallback_shape(way: &Way) -> Option<WayShape> {
    if let Some(bounds) = &way.bounds {
        let ring = LineString::from(vec![
            (bounds.minlon, bounds.minlat),
            (bounds.maxlon, bounds.minlat),
            (bounds.maxlon, bounds.maxlat),
            (bounds.minlon, bounds.maxlat),
            (bounds.minlon, bounds.minlat),
        ]);
        return Some(WayShape::Area(Polygon::new(ring, vec![])));
    }
    way.center
        .map(|center| WayShape::Point(Point::new(center.lon, center.lat)))
}

/// The resolved ring must close on itself, and on the same node when the way has references.
fn is_closed(way: &Way, line: &LineString<f64>) -> bool {
    let same_node = match (way.nodes.first(), way.nodes.last()) {
        (Some(first), Some(last)) if way.nodes.len() > 1 => first == last,
        _ => true,
    };
    same_node && line.is_closed()
}

enum AreaRule {
    Any,
    Only(&'static [&'static str]),
    Except(&'static [&'static str]),
}

const AREA_KEYS: &[(&str, AreaRule)] = &[
    ("building", AreaRule::Any),
    ("building:part", AreaRule::Any),
    ("landuse", AreaRule::Any),
    ("amenity", AreaRule::Any),
    ("leisure", AreaRule::Any),
    ("shop", AreaRule::Any),
    ("tourism", AreaRule::Any),
    ("office", AreaRule::Any),
    ("place", AreaRule::Any),
    ("military", AreaRule::Any),
    ("historic", AreaRule::Any),
    ("public_transport", AreaRule::Any),
    ("ruins", AreaRule::Any),
    ("area:highway", AreaRule::Any),
    ("craft", AreaRule::Any),
    ("golf", AreaRule::Any),
    ("indoor", AreaRule::Any),
    ("boundary", AreaRule::Any),
    ("natural", AreaRule::Except(&["coastline", "cliff", "ridge", "arete", "tree_row"])),
    ("man_made", AreaRule::Except(&["cutline", "embankment", "pipeline"])),
    ("aeroway", AreaRule::Except(&["taxiway"])),
    ("highway", AreaRule::Only(&["services", "rest_area", "escape", "elevator"])),
    (
        "barrier",
        AreaRule::Only(&["city_wall", "ditch", "hedge", "retaining_wall", "wall", "spikes"]),
    ),
    ("railway", AreaRule::Only(&["station", "turntable", "roundhouse", "platform"])),
    ("waterway", AreaRule::Only(&["riverbank", "dock", "boatyard", "dam"])),
    ("power", AreaRule::Only(&["plant", "substation", "generator", "transformer"])),
];

/// Whether a closed way with these tags describes an area rather than a loop.
fn is_area(tags: &Tags) -> bool {
    match tags.get("area").map(String::as_str) {
        Some("no") => return false,
        Some("yes") => return true,
        _ => {}
    }
    AREA_KEYS.iter().any(|(key, rule)| match tags.get(*key) {
        None => false,
        Some(value) if value == "no" => false,
        Some(value) => match rule {
            AreaRule::Any => true,
            AreaRule::Only(values) => values.contains(&value.as_str()),
            AreaRule::Except(values) => !values.contains(&value.as_str()),
        },
    })
}
