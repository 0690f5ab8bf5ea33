//! Site configuration
//!
//! TOML-based configuration for the site shell, navigation timings,
//! animation parameters and the contact form pipeline. Every field has a
//! default, so an empty document yields [`SiteConfig::default`].

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub contact: ContactConfig,
}

impl SiteConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use boxstone_core::config::SiteConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = SiteConfig::from_str(r#"
    ///     [site]
    ///     name = "Box Stone"
    ///     environment = "development"
    /// "#)?;
    /// assert!(config.site.environment.is_development());
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.navigation.sections.is_empty(),
            "navigation.sections must name at least one section"
        );
        anyhow::ensure!(
            self.animation.count_up_steps > 0,
            "animation.count_up_steps must be greater than zero"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.animation.threshold)
                && (0.0..=1.0).contains(&self.animation.stat_threshold),
            "animation thresholds must be within 0.0..=1.0"
        );
        Ok(())
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_site_version")]
    pub version: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            version: default_site_version(),
            environment: Environment::default(),
            language: default_language(),
        }
    }
}

fn default_site_name() -> String {
    "Box Stone".to_string()
}

fn default_site_version() -> String {
    "1.0.0".to_string()
}

fn default_language() -> String {
    "es".to_string()
}

/// Feature toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default = "default_true")]
    pub analytics: bool,
    #[serde(default = "default_true")]
    pub animations: bool,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            analytics: true,
            animations: true,
            dark_mode: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Section navigation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Section ids in keyboard-shortcut order; the first one is the landing section
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,
    /// Target of the Ctrl/Cmd+K shortcut
    #[serde(default = "default_contact_section")]
    pub contact_section: String,
    #[serde(default = "default_exit_ms")]
    pub exit_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_enter_ms")]
    pub enter_ms: u64,
    /// Viewport width above which the mobile menu is force-closed
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: u32,
    /// Scroll offset after which the header switches to its scrolled look
    #[serde(default = "default_header_scroll_offset")]
    pub header_scroll_offset: f64,
    /// Delay before the outside-click listener of an opened menu is attached
    #[serde(default = "default_outside_click_delay_ms")]
    pub outside_click_delay_ms: u64,
}

impl NavigationConfig {
    pub fn exit_delay(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn enter_duration(&self) -> Duration {
        Duration::from_millis(self.enter_ms)
    }

    pub fn outside_click_delay(&self) -> Duration {
        Duration::from_millis(self.outside_click_delay_ms)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            contact_section: default_contact_section(),
            exit_ms: default_exit_ms(),
            settle_ms: default_settle_ms(),
            enter_ms: default_enter_ms(),
            mobile_breakpoint: default_mobile_breakpoint(),
            header_scroll_offset: default_header_scroll_offset(),
            outside_click_delay_ms: default_outside_click_delay_ms(),
        }
    }
}

fn default_sections() -> Vec<String> {
    ["home", "about", "services", "contact"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_contact_section() -> String {
    "contact".to_string()
}

fn default_exit_ms() -> u64 {
    300
}

fn default_settle_ms() -> u64 {
    50
}

fn default_enter_ms() -> u64 {
    500
}

fn default_mobile_breakpoint() -> u32 {
    768
}

fn default_header_scroll_offset() -> f64 {
    50.0
}

fn default_outside_click_delay_ms() -> u64 {
    100
}

/// Scroll animation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    #[serde(default = "default_stat_threshold")]
    pub stat_threshold: f64,
    #[serde(default = "default_card_stagger_ms")]
    pub card_stagger_ms: u64,
    #[serde(default = "default_stat_stagger_ms")]
    pub stat_stagger_ms: u64,
    #[serde(default = "default_load_stagger_ms")]
    pub load_stagger_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
    #[serde(default = "default_slide_ms")]
    pub slide_ms: u64,
    #[serde(default = "default_bounce_ms")]
    pub bounce_ms: u64,
    #[serde(default = "default_count_up_ms")]
    pub count_up_ms: u64,
    #[serde(default = "default_count_up_steps")]
    pub count_up_steps: u32,
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            root_margin: default_root_margin(),
            stat_threshold: default_stat_threshold(),
            card_stagger_ms: default_card_stagger_ms(),
            stat_stagger_ms: default_stat_stagger_ms(),
            load_stagger_ms: default_load_stagger_ms(),
            fade_ms: default_fade_ms(),
            slide_ms: default_slide_ms(),
            bounce_ms: default_bounce_ms(),
            count_up_ms: default_count_up_ms(),
            count_up_steps: default_count_up_steps(),
            pulse_ms: default_pulse_ms(),
        }
    }
}

fn default_threshold() -> f64 {
    0.1
}

fn default_root_margin() -> String {
    "0px 0px -50px 0px".to_string()
}

fn default_stat_threshold() -> f64 {
    0.5
}

fn default_card_stagger_ms() -> u64 {
    100
}

fn default_stat_stagger_ms() -> u64 {
    200
}

fn default_load_stagger_ms() -> u64 {
    100
}

fn default_fade_ms() -> u64 {
    600
}

fn default_slide_ms() -> u64 {
    500
}

fn default_bounce_ms() -> u64 {
    1000
}

fn default_count_up_ms() -> u64 {
    2000
}

fn default_count_up_steps() -> u32 {
    60
}

fn default_pulse_ms() -> u64 {
    200
}

/// Contact form pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Simulated processing latency before a submission is stored
    #[serde(default = "default_submit_latency_ms")]
    pub submit_latency_ms: u64,
    #[serde(default = "default_duplicate_window_hours")]
    pub duplicate_window_hours: i64,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_form_error_ms")]
    pub form_error_ms: u64,
    #[serde(default = "default_success_ms")]
    pub success_ms: u64,
}

impl ContactConfig {
    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            submit_latency_ms: default_submit_latency_ms(),
            duplicate_window_hours: default_duplicate_window_hours(),
            storage_key: default_storage_key(),
            form_error_ms: default_form_error_ms(),
            success_ms: default_success_ms(),
        }
    }
}

fn default_submit_latency_ms() -> u64 {
    1500
}

fn default_duplicate_window_hours() -> i64 {
    24
}

fn default_storage_key() -> String {
    "boxstone_contacts".to_string()
}

fn default_form_error_ms() -> u64 {
    5000
}

fn default_success_ms() -> u64 {
    8000
}
