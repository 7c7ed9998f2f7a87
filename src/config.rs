use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TITLES: [&str; 2] = ["Namespaces", "Pods"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: Option<String>,
    pub focus_follows_selection: bool,
    pub fetch_timeout: Duration,
    /// Items requested per list page; every page is followed.
    pub page_size: u32,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    focus_follows_selection: bool,
    #[serde(default = "default_fetch_timeout_secs", alias = "timeout_secs")]
    fetch_timeout_secs: u64,
    #[serde(default = "default_page_size", alias = "list_limit")]
    page_size: u32,
    #[serde(default)]
    titles: Vec<String>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            focus_follows_selection: false,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            page_size: default_page_size(),
            titles: Vec::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_file(SettingsFile::default(), None)
    }
}

impl Settings {
    /// Loads settings from `explicit`, or from the first discovered file.
    /// A missing explicit file is an error; no discovered file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover_settings_path(),
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        Self::parse(&raw, Some(path.display().to_string()))
            .with_context(|| format!("failed to parse settings {}", path.display()))
    }

    fn parse(raw: &str, source: Option<String>) -> Result<Self> {
        let parsed = if raw.trim().is_empty() {
            SettingsFile::default()
        } else {
            serde_yaml::from_str::<SettingsFile>(raw)?
        };
        Ok(Self::from_file(parsed, source))
    }

    fn from_file(file: SettingsFile, source: Option<String>) -> Self {
        Self {
            source,
            focus_follows_selection: file.focus_follows_selection,
            fetch_timeout: Duration::from_secs(file.fetch_timeout_secs.max(1)),
            page_size: file.page_size.max(1),
            titles: file.titles,
        }
    }

    pub fn apply_focus_override(&mut self, value: Option<bool>) {
        if let Some(value) = value {
            self.focus_follows_selection = value;
        }
    }

    pub fn panel_title(&self, index: usize) -> String {
        self.titles
            .get(index)
            .map(|title| title.trim())
            .filter(|title| !title.is_empty())
            .or_else(|| DEFAULT_TITLES.get(index).copied())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Level {}", index + 1))
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    500
}

fn discover_settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KUBELANE_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [PathBuf::from("kubelane.yaml"), PathBuf::from(".kubelane.yaml")];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let candidate = PathBuf::from(home).join(".config/kubelane/config.yaml");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use std::time::Duration;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::parse("", None).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert!(!settings.focus_follows_selection);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(10));
        assert_eq!(settings.page_size, 500);
    }

    #[test]
    fn file_values_and_aliases_are_read() {
        let raw = "focus_follows_selection: true\ntimeout_secs: 3\nlist_limit: 50\ntitles: [Spaces]\nunknown: 1\n";
        let settings = Settings::parse(raw, Some("test.yaml".to_string())).expect("parsed");
        assert!(settings.focus_follows_selection);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(3));
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.panel_title(0), "Spaces");
        assert_eq!(settings.panel_title(1), "Pods");
        assert_eq!(settings.panel_title(2), "Level 3");
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let settings = Settings::parse("fetch_timeout_secs: 0", None).expect("parsed");
        assert_eq!(settings.fetch_timeout, Duration::from_secs(1));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(Settings::parse("focus_follows_selection: [", None).is_err());
    }

    #[test]
    fn cli_override_replaces_file_value() {
        let mut settings = Settings::parse("focus_follows_selection: true", None).expect("parsed");
        settings.apply_focus_override(None);
        assert!(settings.focus_follows_selection);
        settings.apply_focus_override(Some(false));
        assert!(!settings.focus_follows_selection);
    }

    #[test]
    fn missing_explicit_file_fails() {
        let result = Settings::load(Some(std::path::Path::new("/nonexistent/kubelane.yaml")));
        assert!(result.is_err());
    }
}
