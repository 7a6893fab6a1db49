//! Typed model of an Overpass API JSON export.
//!
//! Only the fields the rest of the crate reads are modelled. Anything else Overpass
//! attaches to an element is ignored on load.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::{Error, Result};

pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverpassDocument {
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub osm3s: Option<Osm3s>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Osm3s {
    #[serde(default)]
    pub timestamp_osm_base: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Node => "node",
            ElementType::Way => "way",
            ElementType::Relation => "relation",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `elements`, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
    /// Overpass can emit other kinds (`area`, `count`, ...). They belong to no partition.
    #[serde(other)]
    Unknown,
}

impl Element {
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            Element::Node(_) => Some(ElementType::Node),
            Element::Way(_) => Some(ElementType::Way),
            Element::Relation(_) => Some(ElementType::Relation),
            Element::Unknown => None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Element::Node(node) => Some(node.id),
            Element::Way(way) => Some(way.id),
            Element::Relation(relation) => Some(relation.id),
            Element::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Tags,
    #[serde(flatten)]
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Way {
    pub id: i64,
    #[serde(default)]
    pub nodes: Vec<i64>,
    /// Inline coordinates from `out geom`, aligned with `nodes`.
    #[serde(default)]
    pub geometry: Option<Vec<Option<LatLon>>>,
    /// Bounding box from `out bb`.
    #[serde(default)]
    pub bounds: Option<Bounds>,
    /// Centroid from `out center`.
    #[serde(default)]
    pub center: Option<LatLon>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(flatten)]
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Relation {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(flatten)]
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub member_type: ElementType,
    #[serde(rename = "ref")]
    pub reference: i64,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}

/// Editing metadata Overpass includes with `out meta`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub changeset: Option<u64>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub uid: Option<u64>,
}

impl OverpassDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn ways(&self) -> impl Iterator<Item = &Way> {
        self.elements.iter().filter_map(|e| match e {
            Element::Way(way) => Some(way),
            _ => None,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.elements.iter().filter_map(|e| match e {
            Element::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn log_summary(&self) {
        let osm3s = self.osm3s.clone().unwrap_or_default();
        info!("Version: {}", display_or_unknown(self.version.as_ref()));
        info!("OSM Time: {}", display_or_unknown(osm3s.timestamp_osm_base.as_ref()));
        info!("OSM's Copyright: \"{}\"", display_or_unknown(osm3s.copyright.as_ref()));
        info!("Found {} elements", self.elements.len());
    }
}

fn display_or_unknown<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> OverpassDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_header_and_elements() {
        let doc = parse(json!({
            "version": 0.6,
            "generator": "Overpass API 0.7.62",
            "osm3s": {
                "timestamp_osm_base": "2025-01-01T00:00:00Z",
                "copyright": "The data included in this document is from www.openstreetmap.org."
            },
            "elements": [
                {"type": "node", "id": 1, "lat": 49.2, "lon": -123.1, "tags": {"railway": "station"}},
                {"type": "way", "id": 10, "nodes": [1, 2, 3]},
                {"type": "relation", "id": 100, "members": [{"type": "way", "ref": 10, "role": "outer"}]}
            ]
        }));

        assert_eq!(doc.version, Some(0.6));
        assert_eq!(doc.generator.as_deref(), Some("Overpass API 0.7.62"));
        let osm3s = doc.osm3s.unwrap();
        assert_eq!(osm3s.timestamp_osm_base.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(doc.elements.len(), 3);

        match &doc.elements[0] {
            Element::Node(node) => {
                assert_eq!(node.id, 1);
                assert_eq!(node.lat, 49.2);
                assert_eq!(node.lon, -123.1);
                assert_eq!(node.tags.get("railway").map(String::as_str), Some("station"));
            }
            other => panic!("expected node, got {:?}", other),
        }
        match &doc.elements[1] {
            Element::Way(way) => assert_eq!(way.nodes, vec![1, 2, 3]),
            other => panic!("expected way, got {:?}", other),
        }
        match &doc.elements[2] {
            Element::Relation(relation) => {
                assert_eq!(relation.members[0].member_type, ElementType::Way);
                assert_eq!(relation.members[0].reference, 10);
                assert_eq!(relation.members[0].role, "outer");
            }
            other => panic!("expected relation, got {:?}", other),
        }
    }

    #[test]
    fn missing_header_fields_are_tolerated() {
        let doc = parse(json!({"elements": []}));
        assert_eq!(doc.version, None);
        assert!(doc.osm3s.is_none());
        assert!(doc.elements.is_empty());
    }

    #[test]
    fn meta_and_inline_geometry_are_kept() {
        let doc = parse(json!({
            "elements": [{
                "type": "way",
                "id": 7,
                "nodes": [1, 2],
                "timestamp": "2024-05-01T12:00:00Z",
                "version": 3,
                "changeset": 99,
                "user": "mapper",
                "uid": 42,
                "geometry": [{"lat": 1.0, "lon": 2.0}, null]
            }]
        }));
        let way = doc.ways().next().unwrap();
        assert_eq!(way.meta.version, Some(3));
        assert_eq!(way.meta.user.as_deref(), Some("mapper"));
        let geometry = way.geometry.as_ref().unwrap();
        assert_eq!(geometry[0], Some(LatLon { lat: 1.0, lon: 2.0 }));
        assert_eq!(geometry[1], None);
    }

    #[test]
    fn unknown_element_kinds_parse_as_unknown() {
        let doc = parse(json!({
            "elements": [{"type": "area", "id": 3600000001u64, "tags": {"name": "x"}}]
        }));
        assert_eq!(doc.elements, vec![Element::Unknown]);
        assert_eq!(doc.elements[0].element_type(), None);
    }

    #[test]
    fn bounds_and_center_are_kept() {
        let doc = parse(json!({
            "elements": [{
                "type": "way",
                "id": 8,
                "nodes": [1, 2],
                "bounds": {"minlat": 1.0, "minlon": 2.0, "maxlat": 3.0, "maxlon": 4.0},
                "center": {"lat": 2.0, "lon": 3.0}
            }]
        }));
        let way = doc.ways().next().unwrap();
        assert_eq!(
            way.bounds,
            Some(Bounds { minlat: 1.0, minlon: 2.0, maxlat: 3.0, maxlon: 4.0 })
        );
        assert_eq!(way.center, Some(LatLon { lat: 2.0, lon: 3.0 }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = OverpassDocument::load(Path::new("/nonexistent/raw-osm.json")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
