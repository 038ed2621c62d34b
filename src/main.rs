use std::{env, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use log::info;
use scene_loader::{LoaderConfig, Scene};

const USAGE: &str = "Usage: scene-loader <scene.txt> [--dof] [--assets <dir>]";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        return Err(anyhow!(USAGE));
    };

    let mut config = LoaderConfig::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dof" => config.depth_of_field = true,
            "--assets" => {
                let root = args.next().ok_or_else(|| anyhow!("--assets expects a directory. {USAGE}"))?;
                config.asset_root = Some(PathBuf::from(root));
            },
            other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
        }
    }

    let scene = Scene::load(&path, &config).with_context(|| format!("failed to load scene {path}"))?;
    info!(
        "Loaded {} materials and {} geometries",
        scene.materials.len(),
        scene.geometries.len()
    );

    println!("{}", serde_json::to_string_pretty(&scene.summary())?);
    Ok(())
}
