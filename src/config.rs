//! YAML configuration and the per-tick view-state snapshot.
//!
//! The configuration file supplies startup values; at runtime the host keeps
//! a [`ViewState`] and passes a copy into every tick. The pipeline core only
//! ever reads the snapshot — there is no write-back and no ambient state.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::kernels::{FilterKind, UpscalerKind};
use crate::source::TimingStandard;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    /// Active upscaler at startup.
    #[serde(default = "Configuration::default_upscaler")]
    pub upscaler: UpscalerKind,

    /// Active post-process filter at startup.
    #[serde(default = "Configuration::default_filter")]
    pub filter: FilterKind,

    /// Start in fullscreen.
    #[serde(default)]
    pub fullscreen: bool,

    /// Keep the 3D renderer (and thus the aspect ratio) in fullscreen.
    #[serde(default = "Configuration::default_true")]
    pub keep_aspect_ratio: bool,

    /// Show the emulated display (false leaves only the background).
    #[serde(default = "Configuration::default_true")]
    pub show_emulated_display: bool,

    /// Timing standard of the synthetic source.
    #[serde(default = "Configuration::default_timing_standard")]
    pub timing_standard: TimingStandard,

    /// Optional background image (png/jpeg) behind the cuboid.
    #[serde(default)]
    pub background_image: Option<PathBuf>,
}

impl Configuration {
    fn default_upscaler() -> UpscalerKind {
        UpscalerKind::Bypass
    }

    fn default_filter() -> FilterKind {
        FilterKind::Smooth
    }

    fn default_true() -> bool {
        true
    }

    fn default_timing_standard() -> TimingStandard {
        TimingStandard::Pal
    }

    /// Check cross-field and filesystem constraints.
    ///
    /// # Errors
    /// [`Error::Configuration`] when the background image path does not point
    /// at a readable file.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(path) = &self.background_image
            && !path.is_file()
        {
            return Err(Error::Configuration(format!(
                "background-image is not a file: {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// The view state the host starts with.
    pub fn initial_view_state(&self) -> ViewState {
        ViewState {
            upscaler: self.upscaler,
            filter: self.filter,
            fullscreen: self.fullscreen,
            keep_aspect_ratio: self.keep_aspect_ratio,
            show_emulated_display: self.show_emulated_display,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        serde_yaml::from_str("{}").expect("default configuration is valid")
    }
}

/// Load and parse a YAML configuration file.
///
/// # Errors
/// IO errors for unreadable files, [`Error::Config`] for malformed YAML.
pub fn from_yaml_file(path: &Path) -> Result<Configuration, Error> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&raw)?)
}

/// Host-owned presentation flags, snapshotted at the start of every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub upscaler: UpscalerKind,
    pub filter: FilterKind,
    pub fullscreen: bool,
    pub keep_aspect_ratio: bool,
    pub show_emulated_display: bool,
}
