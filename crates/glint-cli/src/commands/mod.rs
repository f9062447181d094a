pub mod check;
pub mod config;
pub mod curve;
pub mod preview;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};

use glint_core::VirtualPage;

/// Load a page description, or the built-in sample page
pub fn load_page(path: Option<&Path>) -> Result<VirtualPage> {
    match path {
        Some(path) => VirtualPage::load(path)
            .with_context(|| format!("Failed to load page from {}", path.display())),
        None => Ok(VirtualPage::sample()?),
    }
}
