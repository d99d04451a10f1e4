//! Migration scaffolding.
//!
//! `generate` turns a free-text name such as `"add indexable column"` into a
//! class name (`AddIndexableColumn`), checks it, and writes
//! `<timestamp>_<ClassName><ext>` from a template into the migrations
//! directory.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(test)]
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{DevkitError, Result};
use crate::paths;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const DEFAULT_TEMPLATE: &str = r#"<?php

namespace {{namespace}};

use Yoast\WP\Lib\Migrations\Migration;

/**
 * {{class_name}} class.
 */
class {{class_name}} extends Migration {

	/**
	 * The plugin this migration belongs to.
	 *
	 * @var string
	 */
	public static $plugin = '{{plugin}}';

	/**
	 * Migration up.
	 *
	 * @return void
	 */
	public function up() {

	}

	/**
	 * Migration down.
	 *
	 * @return void
	 */
	public function down() {

	}
}
"#;

// ---------------------------------------------------------------------------
// MigrationSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
    /// Directory for generated files, relative to the project root.
    pub dir: String,
    pub extension: String,
    pub namespace: String,
    pub plugin: String,
    /// Replaces the built-in template. Supports `{{namespace}}`,
    /// `{{class_name}}` and `{{plugin}}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            dir: paths::DEFAULT_MIGRATIONS_DIR.to_string(),
            extension: ".php".to_string(),
            namespace: r"Yoast\WP\SEO\Config\Migrations".to_string(),
            plugin: "free".to_string(),
            template: None,
        }
    }
}

impl MigrationSettings {
    pub fn render(&self, class_name: &str) -> String {
        self.template
            .as_deref()
            .unwrap_or(DEFAULT_TEMPLATE)
            .replace("{{namespace}}", &self.namespace)
            .replace("{{class_name}}", class_name)
            .replace("{{plugin}}", &self.plugin)
    }
}

// ---------------------------------------------------------------------------
// NameRegistry
// ---------------------------------------------------------------------------

/// Answers whether a migration class name is already taken.
pub trait NameRegistry {
    fn contains(&self, name: &str) -> bool;
}

#[cfg(test)]
impl NameRegistry for HashSet<String> {
    fn contains(&self, name: &str) -> bool {
        HashSet::contains(self, name)
    }
}

/// Class names of the migrations already present in a directory.
///
/// Only files named `<14 digits>_<ClassName><extension>` are counted.
#[derive(Debug, Clone, Default)]
pub struct MigrationDirRegistry {
    names: BTreeSet<String>,
}

impl MigrationDirRegistry {
    /// Scan `dir`. A missing directory is an empty registry.
    pub fn scan(dir: &Path, extension: &str) -> Result<Self> {
        let mut names = BTreeSet::new();
        if !dir.is_dir() {
            return Ok(Self { names });
        }
        for entry in std::fs::read_dir(dir)? {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = class_name_from_file(file_name, extension) {
                names.insert(name.to_string());
            }
        }
        Ok(Self { names })
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl NameRegistry for MigrationDirRegistry {
    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

fn class_name_from_file<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    let stem = file_name.strip_suffix(extension)?;
    let (timestamp, name) = stem.split_once('_')?;
    if timestamp.len() != 14 || !timestamp.bytes().all(|b| b.is_ascii_digit()) || name.is_empty() {
        return None;
    }
    Some(name)
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn identifier_re() -> &'static Regex {
    IDENTIFIER_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_\x{80}-\x{ff}][A-Za-z0-9_\x{80}-\x{ff}]*$").unwrap()
    })
}

/// `"fix the thing"` → `"FixTheThing"`.
///
/// Whitespace runs become underscores, and each underscore-separated word gets
/// an upper-case first ASCII letter. The rest of each word is kept as typed,
/// so `"myAPI_name"` becomes `"MyAPIName"`.
pub fn normalize_class_name(raw: &str) -> String {
    whitespace_re()
        .replace_all(raw, "_")
        .split('_')
        .map(upper_first)
        .collect()
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut s = String::with_capacity(word.len());
            s.push(first.to_ascii_uppercase());
            s.push_str(chars.as_str());
            s
        }
        None => String::new(),
    }
}

pub fn validate_identifier(name: &str) -> Result<()> {
    if !identifier_re().is_match(name) {
        return Err(DevkitError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// MigrationDescriptor / generate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationDescriptor {
    pub timestamp: String,
    pub class_name: String,
    pub file_name: String,
}

impl MigrationDescriptor {
    /// Validate `raw_name` and derive the descriptor for a migration created at `now`.
    pub fn new(
        raw_name: &str,
        registry: &dyn NameRegistry,
        extension: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if raw_name.is_empty() {
            return Err(DevkitError::MissingName);
        }
        let class_name = normalize_class_name(raw_name);
        validate_identifier(&class_name)?;
        if registry.contains(&class_name) {
            return Err(DevkitError::NameCollision(class_name));
        }

        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{timestamp}_{class_name}{extension}");
        Ok(Self {
            timestamp,
            class_name,
            file_name,
        })
    }
}

/// Create a migration file under `root` and return where it was written.
///
/// Nothing is written unless the name passes every check. A file that already
/// has the generated name is overwritten.
pub fn generate(
    root: &Path,
    raw_name: &str,
    registry: &dyn NameRegistry,
    settings: &MigrationSettings,
    now: DateTime<Utc>,
) -> Result<(MigrationDescriptor, PathBuf)> {
    let descriptor = MigrationDescriptor::new(raw_name, registry, &settings.extension, now)?;
    let path = paths::migration_path(root, &settings.dir, &descriptor.file_name);
    let contents = settings.render(&descriptor.class_name);
    crate::io::atomic_write(&path, contents.as_bytes())?;
    tracing::debug!(path = %path.display(), "wrote migration");
    Ok((descriptor, path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
