use crate::error::{DevkitError, Result};
use crate::menu::ChoiceMenu;
use crate::migration::MigrationSettings;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Script that prints the phpcs summary report read by the threshold gate.
pub const SUMMARY_SCRIPT: &str = "check-cs-summary";
pub const LINT_SCRIPT: &str = "lint";

/// devkit subcommands a menu choice may name directly.
pub const BUILTIN_COMMANDS: &[&str] = &[
    "check-staged-cs",
    "check-branch-cs",
    "check-cs",
    "check-cs-warnings",
    "fix-cs",
    "check-cs-thresholds",
    "lint-staged",
    "lint-branch",
];

const DEFAULT_SCRIPTS: &[(&str, &str)] = &[
    ("check-cs", "vendor/bin/phpcs -n"),
    ("check-cs-warnings", "vendor/bin/phpcs"),
    (SUMMARY_SCRIPT, "vendor/bin/phpcs --report=summary"),
    ("fix-cs", "vendor/bin/phpcbf"),
    (LINT_SCRIPT, "vendor/bin/parallel-lint"),
];

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// VcsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsConfig {
    /// Reference `*-branch` commands compare against.
    pub base_branch: String,
    /// Only changed files with this suffix are linted or checked.
    pub extension: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            base_branch: "trunk".to_string(),
            extension: ".php".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub vcs: VcsConfig,
    /// Script overrides, merged over the built-in defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,
    #[serde(default)]
    pub menu: ChoiceMenu,
    #[serde(default)]
    pub migrations: MigrationSettings,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            vcs: VcsConfig::default(),
            scripts: BTreeMap::new(),
            menu: ChoiceMenu::default(),
            migrations: MigrationSettings::default(),
        }
    }
}

impl Config {
    /// Load `.devkit/config.yaml`, or the defaults when it does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// The command line for script `name`, preferring configured overrides.
    pub fn script(&self, name: &str) -> Result<&str> {
        if let Some(cmd) = self.scripts.get(name) {
            return Ok(cmd.as_str());
        }
        DEFAULT_SCRIPTS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, cmd)| *cmd)
            .ok_or_else(|| DevkitError::UnknownScript(name.to_string()))
    }

    /// Every script name with its effective command line.
    pub fn effective_scripts(&self) -> BTreeMap<String, String> {
        let mut all: BTreeMap<String, String> = DEFAULT_SCRIPTS
            .iter()
            .map(|(n, c)| (n.to_string(), c.to_string()))
            .collect();
        all.extend(self.scripts.clone());
        all
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let scripts = self.effective_scripts();

        for (key, choice) in self.menu.iter() {
            let command = choice.command.trim();
            if command.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("menu choice '{key}' has an empty command"),
                });
            } else if !BUILTIN_COMMANDS.contains(&command) && !scripts.contains_key(command) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "menu choice '{key}' runs '{command}', which is neither a devkit command nor a script"
                    ),
                });
            }
        }

        for (name, cmd) in &self.scripts {
            if cmd.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("script '{name}' has an empty command"),
                });
            }
        }

        if self.vcs.extension.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "vcs.extension is empty; every changed file would match".to_string(),
            });
        }
        if self.migrations.extension.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "migrations.extension is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(!yaml.contains("scripts"));
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.menu, ChoiceMenu::default());
        assert_eq!(parsed.migrations, MigrationSettings::default());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.vcs.base_branch, "trunk");
        assert_eq!(cfg.vcs.extension, ".php");
        assert_eq!(cfg.menu.len(), 6);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let yaml = "vcs:\n  base_branch: main\nmigrations:\n  plugin: premium\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.vcs.base_branch, "main");
        assert_eq!(cfg.vcs.extension, ".php");
        assert_eq!(cfg.migrations.plugin, "premium");
        assert_eq!(cfg.migrations.dir, paths::DEFAULT_MIGRATIONS_DIR);
    }

    #[test]
    fn load_reads_script_overrides() {
        let dir = TempDir::new().unwrap();
        let path = paths::config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "scripts:\n  lint: php -l\n").unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.script("lint").unwrap(), "php -l");
    }

    #[test]
    fn script_overrides_and_defaults() {
        let mut cfg = Config::default();
        assert_eq!(cfg.script("fix-cs").unwrap(), "vendor/bin/phpcbf");
        cfg.scripts
            .insert("fix-cs".to_string(), "phpcbf --standard=Yoast".to_string());
        assert_eq!(cfg.script("fix-cs").unwrap(), "phpcbf --standard=Yoast");
        assert!(matches!(
            cfg.script("deploy"),
            Err(DevkitError::UnknownScript(_))
        ));
    }

    #[test]
    fn effective_scripts_merge() {
        let mut cfg = Config::default();
        cfg.scripts
            .insert("deploy".to_string(), "./deploy.sh".to_string());
        let all = cfg.effective_scripts();
        assert_eq!(all["deploy"], "./deploy.sh");
        assert_eq!(all[SUMMARY_SCRIPT], "vendor/bin/phpcs --report=summary");
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_empty_menu_command_is_error() {
        let mut cfg = Config::default();
        cfg.menu = ChoiceMenu::new().with_choice("1", "Broken", " ");
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
        assert!(warnings[0].message.contains("empty command"));
    }

    #[test]
    fn validate_unknown_menu_command_warns() {
        let mut cfg = Config::default();
        cfg.menu = ChoiceMenu::default().with_choice("7", "Deploy", "deploy");
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("'deploy'"));

        cfg.scripts
            .insert("deploy".to_string(), "./deploy.sh".to_string());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_empty_extensions_are_errors() {
        let mut cfg = Config::default();
        cfg.vcs.extension.clear();
        cfg.migrations.extension.clear();
        let warnings = cfg.validate();
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count(),
            2
        );
    }

    #[test]
    fn validate_empty_script_warns() {
        let mut cfg = Config::default();
        cfg.scripts.insert("lint".to_string(), String::new());
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("script 'lint' has an empty command")));
    }
}
