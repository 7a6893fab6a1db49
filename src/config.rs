use std::path::PathBuf;

pub const DEFAULT_WORKDIR: &str = "work";
pub const INPUT_FILE: &str = "raw-osm.json";
pub const NODES_FILE: &str = "nodes.geojson";
pub const WAYS_FILE: &str = "ways.geojson";
pub const WAY_NODES_FILE: &str = "way_nodes.sql";

/// Where a run reads its Overpass export and writes its three outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workdir: PathBuf,
    pub input_file: String,
    pub nodes_file: String,
    pub ways_file: String,
    pub way_nodes_file: String,
}

impl Config {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Config {
            workdir: workdir.into(),
            input_file: INPUT_FILE.to_string(),
            nodes_file: NODES_FILE.to_string(),
            ways_file: WAYS_FILE.to_string(),
            way_nodes_file: WAY_NODES_FILE.to_string(),
        }
    }

    pub fn input_path(&self) -> PathBuf {
        self.workdir.join(&self.input_file)
    }

    pub fn nodes_path(&self) -> PathBuf {
        self.workdir.join(&self.nodes_file)
    }

    pub fn ways_path(&self) -> PathBuf {
        self.workdir.join(&self.ways_file)
    }

    pub fn way_nodes_path(&self) -> PathBuf {
        self.workdir.join(&self.way_nodes_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_WORKDIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn default_paths_live_under_work() {
        let config = Config::default();
        assert_eq!(config.input_path(), Path::new("work").join("raw-osm.json"));
        assert_eq!(config.nodes_path(), Path::new("work").join("nodes.geojson"));
        assert_eq!(config.ways_path(), Path::new("work").join("ways.geojson"));
        assert_eq!(config.way_nodes_path(), Path::new("work").join("way_nodes.sql"));
    }

    #[test]
    fn custom_workdir_keeps_file_names() {
        let config = Config::new("/tmp/osm");
        assert_eq!(config.workdir, Path::new("/tmp/osm"));
        assert_eq!(config.ways_path(), Path::new("/tmp/osm/ways.geojson"));
    }
}
