//! Layout registry: the built-in layout plus loading layouts from disk.
//!
//! The built-in layout in `packages/form/layouts/` is baked into the binary
//! at compile time via [`include_str!`].

use std::path::Path;

use crate::FormError;
use crate::layout::{LayoutDefinition, parse_layout_toml};

/// The field service request form layout, embedded at compile time.
const DEFAULT_LAYOUT_TOML: &str = include_str!("../layouts/field_service_request.toml");

/// Returns the built-in field service request layout.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (guarded by the tests below,
/// since the layout is compiled in).
#[must_use]
pub fn default_layout() -> LayoutDefinition {
    parse_layout_toml(DEFAULT_LAYOUT_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse field_service_request.toml: {e}"))
}

/// Loads and validates a layout TOML file.
///
/// # Errors
///
/// Returns [`FormError::Io`] if the file cannot be read, or the errors of
/// [`parse_layout_toml`].
pub fn load_layout(path: &Path) -> Result<LayoutDefinition, FormError> {
    let contents = std::fs::read_to_string(path).map_err(|e| FormError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let layout = parse_layout_toml(&contents)?;
    log::info!("Loaded layout '{}' from {}", layout.id, path.display());
    Ok(layout)
}
