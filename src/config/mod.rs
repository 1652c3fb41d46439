//! Config module.
//! Provides settings types, default paths, XML loading/saving, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_data_dir, path_has_symlink_ancestor, CONFIG_ENV};
pub use types::{LogLevel, Settings, TrackerSettings};
pub use xml::{
    backup_path, create_template_config, load_settings, parse_settings, render_settings, save_settings,
};
