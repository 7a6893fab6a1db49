use clap::{Arg, Command};
use log::{error, info};
use std::path::PathBuf;
use osm_georef::config::DEFAULT_WORKDIR;
use osm_georef::process_workdir;

fn run() -> anyhow::Result<()> {
    let matches = Command::new("OSM Georef")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Jesper Fjellin")
        .about("Splits an Overpass export into node and way GeoJSON plus a way-node COPY script")
        .arg(
            Arg::new("workdir")
                .short('w')
                .long("workdir")
                .num_args(1)
                .default_value(DEFAULT_WORKDIR)
                .help("Directory holding raw-osm.json; outputs are written next to it"),
        )
        .get_matches();

    let workdir = matches
        .get_one::<String>("workdir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKDIR));

    let summary = process_workdir(&workdir)?;
    info!(
        "Done: {} node features, {} way features, {} way-node rows",
        summary.node_features, summary.way_features, summary.way_node_rows
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
