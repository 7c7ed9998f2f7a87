use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kubelane",
    version,
    about = "Browse cluster namespaces and their pods side by side."
)]
pub struct CliArgs {
    /// Path to the kubeconfig file (defaults to $KUBECONFIG, then ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// Settings file (defaults to $KUBELANE_CONFIG, ./kubelane.yaml, ~/.config/kubelane/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Move focus to a panel as soon as it is filled
    #[arg(long, conflicts_with = "no_focus_follows_selection")]
    pub focus_follows_selection: bool,

    /// Keep focus where it is when a panel is filled
    #[arg(long)]
    pub no_focus_follows_selection: bool,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Append logs to this file instead of discarding them
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl CliArgs {
    pub fn focus_override(&self) -> Option<bool> {
        if self.focus_follows_selection {
            Some(true)
        } else if self.no_focus_follows_selection {
            Some(false)
        } else {
            None
        }
    }

    pub fn kubeconfig_path(&self) -> Result<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
        resolve_kubeconfig(
            self.kubeconfig.as_deref(),
            std::env::var_os("KUBECONFIG"),
            home,
        )
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no kubeconfig path: pass --kubeconfig, set KUBECONFIG, or set HOME"
            )
        })
    }
}

fn resolve_kubeconfig(
    explicit: Option<&Path>,
    kubeconfig_env: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(value) = kubeconfig_env
        && let Some(first) = std::env::split_paths(&value).find(|path| !path.as_os_str().is_empty())
    {
        return Some(first);
    }

    home.filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".kube").join("config"))
}
