//! `dedlin.toml` loading.

use std::fs;
use std::path::PathBuf;

use dedlin_core::CommandKind;
use serde::Deserialize;
use tracing::{info, warn};

use crate::editor::Options;

pub const CONFIG_FILE_NAME: &str = "dedlin.toml";

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub replace: ReplaceConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_quit_safety")]
    pub quit_safety: bool,
    /// Unset means "halt when headless".
    #[serde(default)]
    pub halt_on_error: Option<bool>,
    #[serde(default)]
    pub echo: bool,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub blind_mode: bool,
    #[serde(default = "SessionConfig::default_page_size")]
    pub page_size: usize,
    #[serde(default = "SessionConfig::default_line_break")]
    pub line_break: String,
    #[serde(default)]
    pub disabled_commands: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quit_safety: Self::default_quit_safety(),
            halt_on_error: None,
            echo: false,
            quiet: false,
            blind_mode: false,
            page_size: Self::default_page_size(),
            line_break: Self::default_line_break(),
            disabled_commands: Vec::new(),
        }
    }
}

impl SessionConfig {
    const fn default_quit_safety() -> bool {
        true
    }
    const fn default_page_size() -> usize {
        5
    }
    fn default_line_break() -> String {
        "\n".to_string()
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaceConfig {
    #[serde(default = "ReplaceConfig::default_case_sensitive")]
    pub case_sensitive: bool,
}

impl Default for ReplaceConfig {
    fn default() -> Self {
        Self {
            case_sensitive: Self::default_case_sensitive(),
        }
    }
}

impl ReplaceConfig {
    const fn default_case_sensitive() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "HistoryConfig::default_dir")]
    pub dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            dir: Self::default_dir(),
        }
    }
}

impl HistoryConfig {
    const fn default_enabled() -> bool {
        true
    }
    fn default_dir() -> PathBuf {
        PathBuf::from(".dedlin_history")
    }
}

#[derive(Debug, Default, Clone)]
pub struct Config {
    /// File text as read, when one was found.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("dedlin").join(CONFIG_FILE_NAME);
    }
    local
}

/// Load `path` (or the discovered file). Missing or malformed files yield defaults.
pub fn load_from(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "no config file, using defaults");
        return Config::default();
    };
    parse(&content).unwrap_or_else(|err| {
        warn!(target: "config", path = %path.display(), %err, "config parse failed, using defaults");
        Config::default()
    })
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    let file = toml::from_str::<ConfigFile>(content)?;
    Ok(Config {
        raw: Some(content.to_string()),
        file,
    })
}

impl Config {
    /// Session options for a headless or interactive run.
    pub fn options(&self, headless: bool) -> Options {
        let s = &self.file.session;
        Options {
            headless,
            halt_on_error: s.halt_on_error.unwrap_or(headless),
            quit_safety: s.quit_safety,
            echo: s.echo,
            quiet: s.quiet,
            blind_mode: s.blind_mode,
            untrusted: false,
            page_size: s.page_size.max(1),
            line_break: s.line_break.clone(),
            search_case_sensitive: self.file.search.case_sensitive,
            replace_case_sensitive: self.file.replace.case_sensitive,
            disabled_commands: disabled_kinds(&s.disabled_commands),
        }
    }
}

fn disabled_kinds(names: &[String]) -> Vec<CommandKind> {
    names
        .iter()
        .filter_map(|name| {
            let kind = CommandKind::from_name(name);
            if kind.is_none() {
                warn!(target: "config", name = name.as_str(), "unknown command in disabled_commands");
            }
            kind
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let cfg = load_from(Some(PathBuf::from("/definitely/not/here/dedlin.toml")));
        assert!(cfg.raw.is_none());
        let opts = cfg.options(false);
        assert!(opts.quit_safety);
        assert!(!opts.halt_on_error);
        assert_eq!(opts.page_size, 5);
        assert!(!opts.search_case_sensitive);
        assert!(opts.replace_case_sensitive);
        assert!(cfg.options(true).halt_on_error);
        assert!(cfg.file.history.enabled);
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = parse(
            r#"
[session]
page_size = 10
halt_on_error = false
line_break = "\r\n"
disabled_commands = ["browse", "Shuffle", "bogus"]

[search]
case_sensitive = true

[history]
enabled = false
dir = "hist"
"#,
        )
        .unwrap();
        let opts = cfg.options(true);
        assert_eq!(opts.page_size, 10);
        assert!(!opts.halt_on_error);
        assert_eq!(opts.line_break, "\r\n");
        assert_eq!(
            opts.disabled_commands,
            vec![CommandKind::Browse, CommandKind::Shuffle]
        );
        assert!(opts.search_case_sensitive);
        assert!(!cfg.file.history.enabled);
        assert_eq!(cfg.file.history.dir, PathBuf::from("hist"));
    }

    #[test]
    fn malformed_is_an_error() {
        assert!(parse("[session\npage_size = ").is_err());
    }
}
