use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// One row of the responsive column table: viewports at least `min_width`
/// pixels wide get `columns` columns (the widest matching row wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Breakpoint {
    pub min_width: u32,
    pub columns: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LightboxOptions {
    #[serde(default = "LightboxOptions::default_enabled")]
    pub enabled: bool,
    /// Overlay fade duration; the overlay only becomes interactive once the
    /// fade completes.
    #[serde(default = "LightboxOptions::default_fade", with = "humantime_serde")]
    pub fade: Duration,
}

impl LightboxOptions {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_fade() -> Duration {
        Duration::from_millis(250)
    }
}

impl Default for LightboxOptions {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            fade: Self::default_fade(),
        }
    }
}

/// Initial viewport dimensions, in CSS-pixel-equivalent units.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ViewportOptions {
    #[serde(default = "ViewportOptions::default_width")]
    pub width: u32,
    #[serde(default = "ViewportOptions::default_height")]
    pub height: u32,
}

impl ViewportOptions {
    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        800
    }
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// Listing service URL the widget requests pages from.
    pub endpoint: String,
    /// Items requested per page. The service caps this at 100.
    #[serde(default = "Configuration::default_page_size")]
    pub page_size: u32,
    /// Responsive column table, widest matching `min-width` wins.
    #[serde(default = "Configuration::default_columns")]
    pub columns: Vec<Breakpoint>,
    /// Viewports at or below this width use the paged-swipe layout.
    #[serde(default = "Configuration::default_swipe_max_width")]
    pub swipe_max_width: u32,
    /// Images per swipe page, independent of the server page size.
    #[serde(default = "Configuration::default_swipe_page_size")]
    pub swipe_page_size: usize,
    /// When false every cell loads eagerly instead of on first visibility.
    #[serde(default = "Configuration::default_lazy_loading")]
    pub lazy_loading: bool,
    #[serde(default)]
    pub lightbox: LightboxOptions,
    /// Maximum number of concurrent image loads.
    #[serde(default = "Configuration::default_loader_max_concurrent_loads")]
    pub loader_max_concurrent_loads: usize,
    #[serde(default)]
    pub viewport: ViewportOptions,
}

impl Configuration {
    const fn default_page_size() -> u32 {
        24
    }

    fn default_columns() -> Vec<Breakpoint> {
        vec![
            Breakpoint {
                min_width: 0,
                columns: 1,
            },
            Breakpoint {
                min_width: 600,
                columns: 2,
            },
            Breakpoint {
                min_width: 900,
                columns: 3,
            },
            Breakpoint {
                min_width: 1200,
                columns: 4,
            },
        ]
    }

    const fn default_swipe_max_width() -> u32 {
        600
    }

    const fn default_swipe_page_size() -> usize {
        4
    }

    const fn default_lazy_loading() -> bool {
        true
    }

    const fn default_loader_max_concurrent_loads() -> usize {
        4
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&s).context("parsing configuration YAML")
    }

    /// Validate runtime invariants that cannot be expressed via serde
    /// defaults alone.
    pub fn validated(self) -> Result<Self> {
        reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("endpoint is not an absolute URL: {:?}", self.endpoint))?;
        ensure!(
            (1..=100).contains(&self.page_size),
            "page-size must be between 1 and 100"
        );
        ensure!(!self.columns.is_empty(), "columns table must not be empty");
        ensure!(
            self.columns.iter().any(|b| b.min_width == 0),
            "columns table must cover min-width 0"
        );
        ensure!(
            self.columns.iter().all(|b| b.columns >= 1),
            "every breakpoint must have at least one column"
        );
        ensure!(
            self.swipe_page_size > 0,
            "swipe-page-size must be greater than zero"
        );
        ensure!(
            self.loader_max_concurrent_loads > 0,
            "loader-max-concurrent-loads must be greater than zero"
        );
        ensure!(
            !self.lightbox.fade.is_zero(),
            "lightbox fade must be greater than zero"
        );
        ensure!(
            self.viewport.width > 0 && self.viewport.height > 0,
            "viewport dimensions must be positive"
        );
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            page_size: Self::default_page_size(),
            columns: Self::default_columns(),
            swipe_max_width: Self::default_swipe_max_width(),
            swipe_page_size: Self::default_swipe_page_size(),
            lazy_loading: Self::default_lazy_loading(),
            lightbox: LightboxOptions::default(),
            loader_max_concurrent_loads: Self::default_loader_max_concurrent_loads(),
            viewport: ViewportOptions::default(),
        }
    }
}
