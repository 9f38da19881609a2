//! # Command Table
//!
//! Ordered mapping from chat command tokens to workload image identifiers.
//! Built once at startup (built-in list or a YAML file) and read-only afterwards.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use crate::domain::errors::ConfigError;

/// Tokens handled by the bot itself; a workload may not shadow them.
pub const RESERVED: [&str; 3] = ["start", "help", "actionslist"];

static COMMAND_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]{1,32}$").expect("static regex"));

const BUILTIN: [(&str, &str); 14] = [
    // Firefox-based
    ("firefox", "firefox"),
    ("tor", "tor-browser"),
    ("waterfox", "waterfox"),
    // Chromium-based
    ("chromium", "chromium"),
    ("chrome", "google-chrome"),
    ("ungoogled_chromium", "ungoogled-chromium"),
    ("edge", "microsoft-edge"),
    ("brave", "brave"),
    ("vivaldi", "vivaldi"),
    ("opera", "opera"),
    // Desktops
    ("xfce", "xfce"),
    ("kde", "kde"),
    // Other
    ("remmina", "remmina"),
    ("vlc", "vlc"),
];

/// One `command -> image` row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandEntry {
    pub command: String,
    pub image: String,
}

/// YAML layout of a command table file.
#[derive(Debug, Deserialize)]
struct CommandFile {
    commands: Vec<CommandEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    pub fn new(entries: Vec<CommandEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::CommandTable("no commands defined".into()));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !COMMAND_SYNTAX.is_match(&entry.command) {
                return Err(ConfigError::CommandTable(format!(
                    "`{}` is not a valid command (use 1-32 of a-z, 0-9, _)",
                    entry.command
                )));
            }
            if RESERVED.contains(&entry.command.as_str()) {
                return Err(ConfigError::CommandTable(format!(
                    "`{}` is reserved",
                    entry.command
                )));
            }
            if entry.image.trim().is_empty() {
                return Err(ConfigError::CommandTable(format!(
                    "`{}` has an empty image",
                    entry.command
                )));
            }
            if !seen.insert(entry.command.as_str()) {
                return Err(ConfigError::CommandTable(format!(
                    "`{}` is defined twice",
                    entry.command
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Parses a YAML document of the form `commands: [{command, image}, ...]`.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: CommandFile = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::CommandTable(e.to_string()))?;
        Self::new(file.commands)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::CommandTable(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Image identifier for a command token, if configured.
    pub fn resolve(&self, command: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.command == command)
            .map(|e| e.image.as_str())
    }

    /// Command tokens in table order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.command.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(command, image)| CommandEntry {
                    command: command.to_string(),
                    image: image.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = CommandTable::default();
        let rebuilt = CommandTable::new(table.entries.clone()).unwrap();
        assert_eq!(rebuilt.len(), BUILTIN.len());
    }

    #[test]
    fn test_every_builtin_command_resolves_to_its_image() {
        let table = CommandTable::default();
        for (command, image) in BUILTIN {
            assert_eq!(table.resolve(command), Some(image));
        }
        assert_eq!(table.resolve("chrome"), Some("google-chrome"));
        assert_eq!(table.resolve("netscape"), None);
        assert_eq!(table.resolve("help"), None);
    }

    #[test]
    fn test_yaml_keeps_file_order() {
        let yaml = concat!(
            "commands:\n",
            "  - { command: vlc, image: vlc }\n",
            "  - { command: chrome, image: google-chrome }\n",
        );
        let table = CommandTable::from_yaml(yaml).unwrap();
        let commands: Vec<_> = table.commands().collect();
        assert_eq!(commands, vec!["vlc", "chrome"]);
    }

    #[test]
    fn test_rejects_bad_tables() {
        let entry = |command: &str, image: &str| CommandEntry {
            command: command.into(),
            image: image.into(),
        };

        let dup = vec![entry("kde", "kde"), entry("kde", "kde2")];
        assert!(CommandTable::new(dup).is_err());

        assert!(CommandTable::new(vec![entry("help", "x")]).is_err());
        assert!(CommandTable::new(vec![entry("Bad-Name", "x")]).is_err());
        assert!(CommandTable::new(vec![entry("firefox", " ")]).is_err());

        assert!(CommandTable::new(Vec::new()).is_err());
        assert!(CommandTable::from_yaml("commands: nope").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "commands:\n  - command: xfce\n    image: xfce").unwrap();

        let table = CommandTable::load(file.path()).unwrap();
        assert_eq!(table.resolve("xfce"), Some("xfce"));
        assert_eq!(table.len(), 1);

        assert!(CommandTable::load(Path::new("/nonexistent/commands.yaml")).is_err());
    }
}
