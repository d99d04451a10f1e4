use crate::output::print_json;
use anyhow::Context;
use devkit_core::config::Config;
use devkit_core::migration::{generate, MigrationDirRegistry};
use devkit_core::paths;
use std::path::Path;

pub fn run(root: &Path, name: &str, json: bool) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let settings = &config.migrations;
    let registry = MigrationDirRegistry::scan(
        &paths::migrations_dir(root, &settings.dir),
        &settings.extension,
    )
    .context("failed to read existing migrations")?;

    let (descriptor, path) = generate(root, name, &registry, settings, chrono::Utc::now())?;

    if json {
        let value = serde_json::json!({
            "class_name": descriptor.class_name,
            "timestamp": descriptor.timestamp,
            "file_name": descriptor.file_name,
            "path": path,
        });
        print_json(&value)?;
    } else {
        println!("Created migration {} at {}", descriptor.class_name, path.display());
    }
    Ok(0)
}
