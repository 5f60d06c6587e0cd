//! Application configuration for sectioner.
//!
//! User config lives at `~/.sectioner/sectioner.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! The defaults reproduce the original widget's constants: marker container
//! `div#ExpandContent`, `[expand]`/`[/expand]` delimiters, `+ Abstract` /
//! `− Abstract` labels, and the `expand`/`expanded`/`expand-link` classes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SectionerError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sectioner.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sectioner";

// ---------------------------------------------------------------------------
// Config structs (matching sectioner.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Marker-region recognition.
    #[serde(default)]
    pub markers: MarkerConfig,

    /// Toggle and collapse-control labels.
    #[serde(default)]
    pub labels: LabelConfig,

    /// Class names written into the output markup.
    #[serde(default)]
    pub classes: ClassConfig,

    /// Rendering behaviour switches.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[markers]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Id of the sentinel container in the source markup.
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// Opening delimiter line inside the container.
    #[serde(default = "default_open_marker")]
    pub open: String,

    /// Closing delimiter line inside the container.
    #[serde(default = "default_close_marker")]
    pub close: String,

    /// Attribute on the container that flags "start expanded" when `"true"`.
    #[serde(default = "default_expanded_attr")]
    pub expanded_attr: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            open: default_open_marker(),
            close: default_close_marker(),
            expanded_attr: default_expanded_attr(),
        }
    }
}

fn default_container_id() -> String {
    "ExpandContent".into()
}
fn default_open_marker() -> String {
    "[expand]".into()
}
fn default_close_marker() -> String {
    "[/expand]".into()
}
fn default_expanded_attr() -> String {
    "data-expanded".into()
}

/// `[labels]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Toggle label while collapsed.
    #[serde(default = "default_expand_label")]
    pub expand: String,

    /// Toggle label while expanded (U+2212 minus, as in the original widget).
    #[serde(default = "default_collapse_label")]
    pub collapse: String,

    /// Text of the optional collapse button inside the section.
    #[serde(default = "default_collapse_button_label")]
    pub collapse_button: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            expand: default_expand_label(),
            collapse: default_collapse_label(),
            collapse_button: default_collapse_button_label(),
        }
    }
}

fn default_expand_label() -> String {
    "+ Abstract".into()
}
fn default_collapse_label() -> String {
    "− Abstract".into()
}
fn default_collapse_button_label() -> String {
    "c".into()
}

/// `[classes]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Class carried by every section container.
    #[serde(default = "default_section_class")]
    pub section: String,

    /// Class added while a section is expanded.
    #[serde(default = "default_expanded_class")]
    pub expanded: String,

    /// Class on the toggle anchor.
    #[serde(default = "default_toggle_class")]
    pub toggle: String,

    /// Class on the span wrapping the toggle anchor.
    #[serde(default = "default_toggle_wrap_class")]
    pub toggle_wrap: String,

    /// Class on the optional collapse button.
    #[serde(default = "default_collapse_button_class")]
    pub collapse_button: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            section: default_section_class(),
            expanded: default_expanded_class(),
            toggle: default_toggle_class(),
            toggle_wrap: default_toggle_wrap_class(),
            collapse_button: default_collapse_button_class(),
        }
    }
}

fn default_section_class() -> String {
    "expand".into()
}
fn default_expanded_class() -> String {
    "expanded".into()
}
fn default_toggle_class() -> String {
    "expand-link".into()
}
fn default_toggle_wrap_class() -> String {
    "abstract-button".into()
}
fn default_collapse_button_class() -> String {
    "collapse-btn".into()
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Render a collapse button inside each section (off by default — only
    /// one of the original widget variants had it).
    #[serde(default)]
    pub collapse_button: bool,

    /// Emit inline `display`/`height` styles alongside the classes. When
    /// false, visibility is left entirely to the stylesheet.
    #[serde(default = "default_true")]
    pub inline_styles: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            collapse_button: false,
            inline_styles: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Widget options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime widget options — the flattened view the setup pass consumes.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Id of the marker container (`div#<marker_id>`).
    pub marker_id: String,
    /// Opening delimiter text.
    pub marker_open: String,
    /// Closing delimiter text.
    pub marker_close: String,
    /// "start expanded" attribute name.
    pub expanded_attr: String,
    /// Toggle label while collapsed.
    pub label_expand: String,
    /// Toggle label while expanded.
    pub label_collapse: String,
    /// Collapse-button text.
    pub label_collapse_button: String,
    /// Section container class.
    pub class_section: String,
    /// Expanded-state class.
    pub class_expanded: String,
    /// Toggle anchor class.
    pub class_toggle: String,
    /// Toggle wrapper span class.
    pub class_toggle_wrap: String,
    /// Collapse-button class.
    pub class_collapse_button: String,
    /// Whether sections carry a collapse button.
    pub collapse_button: bool,
    /// Whether to emit inline display/height styles.
    pub inline_styles: bool,
}

impl From<&AppConfig> for WidgetOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            marker_id: config.markers.container_id.clone(),
            marker_open: config.markers.open.clone(),
            marker_close: config.markers.close.clone(),
            expanded_attr: config.markers.expanded_attr.clone(),
            label_expand: config.labels.expand.clone(),
            label_collapse: config.labels.collapse.clone(),
            label_collapse_button: config.labels.collapse_button.clone(),
            class_section: config.classes.section.clone(),
            class_expanded: config.classes.expanded.clone(),
            class_toggle: config.classes.toggle.clone(),
            class_toggle_wrap: config.classes.toggle_wrap.clone(),
            class_collapse_button: config.classes.collapse_button.clone(),
            collapse_button: config.render.collapse_button,
            inline_styles: config.render.inline_styles,
        }
    }
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl WidgetOptions {
    /// Check that every name can be used in a CSS selector and an HTML
    /// attribute without escaping. Called once at the top of the setup pass.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("markers.container_id", &self.marker_id),
            ("markers.expanded_attr", &self.expanded_attr),
            ("classes.section", &self.class_section),
            ("classes.expanded", &self.class_expanded),
            ("classes.toggle", &self.class_toggle),
            ("classes.toggle_wrap", &self.class_toggle_wrap),
            ("classes.collapse_button", &self.class_collapse_button),
        ] {
            if !valid_name(value) {
                return Err(SectionerError::config(format!(
                    "{field} {value:?} is not a valid identifier \
                     (expected [A-Za-z][A-Za-z0-9_-]*)"
                )));
            }
        }

        for (field, value) in [
            ("markers.open", &self.marker_open),
            ("markers.close", &self.marker_close),
            ("labels.expand", &self.label_expand),
            ("labels.collapse", &self.label_collapse),
        ] {
            if value.is_empty() {
                return Err(SectionerError::config(format!("{field} is empty")));
            }
        }

        Ok(())
    }
}

/// `[A-Za-z][A-Za-z0-9_-]*` — safe in selectors and attribute values alike.
fn valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sectioner/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SectionerError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sectioner/sectioner.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SectionerError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SectionerError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SectionerError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SectionerError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SectionerError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
