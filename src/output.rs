use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::FeatureCollection;
use log::info;

use crate::error::{Error, Result};
use crate::way_nodes::{write_copy_script, WayNodeRow};

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Writes `collection` as compact JSON, replacing whatever is at `path`.
pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let mut writer = create(path)?;
    serde_json::to_writer(&mut writer, collection).map_err(|source| Error::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} features to {}", collection.features.len(), path.display());
    Ok(())
}

/// Writes the way-node bulk-copy script, replacing whatever is at `path`.
pub fn write_way_nodes(path: &Path, rows: &[WayNodeRow]) -> Result<()> {
    let writer = create(path)?;
    write_copy_script(writer, rows).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} way-node rows to {}", rows.len(), path.display());
    Ok(())
}
