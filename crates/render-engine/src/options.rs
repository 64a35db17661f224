//! Building a [`StyleOptions`] from configuration.

use shotcraft_common::config::StyleDefaults;
use shotcraft_model::catalog::BackgroundCatalog;
use shotcraft_model::style::{ShadowOptions, StyleOptions};

/// Background id to start a preview with: the configured one when the
/// catalog knows it, otherwise the catalog's first entry.
pub fn initial_background_id(defaults: &StyleDefaults, catalog: &BackgroundCatalog) -> String {
    catalog.initial_selection(&defaults.background_id)
}

/// Initial style for a new preview.
pub fn style_from_config(defaults: &StyleDefaults, catalog: &BackgroundCatalog) -> StyleOptions {
    let background_id = initial_background_id(defaults, catalog);
    StyleOptions {
        padding: defaults.padding,
        corner_radius: defaults.corner_radius,
        background: catalog.resolve(&background_id).spec.clone(),
        shadow: ShadowOptions {
            enabled: defaults.shadow_enabled,
            opacity: defaults.shadow_opacity,
            blur_radius: defaults.shadow_blur_radius,
            offset_y: defaults.shadow_offset_y,
        },
    }
}
