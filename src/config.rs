use serde::Deserialize;
use std::path::PathBuf;

/// Gallery configuration.
///
/// Threaded explicitly into every component at construction; nothing in the
/// crate reads global state.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    /// Root of the browsable file hierarchy.
    pub data_root: PathBuf,
    /// Root of the rendition cache. Must not live inside `data_root`.
    pub cache_root: PathBuf,
    /// The finite set of allowed rendition sizes (pixel widths).
    #[serde(default = "default_render_sizes")]
    pub render_sizes: Vec<u32>,
}

fn default_render_sizes() -> Vec<u32> {
    vec![128, 800, 1024, 1280]
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./data"),
            cache_root: PathBuf::from("./cache"),
            render_sizes: default_render_sizes(),
        }
    }
}

impl GalleryConfig {
    /// Absolute on-disk location of a canonical path under the data root.
    pub fn data_path(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.data_root.clone()
        } else {
            self.data_root.join(path)
        }
    }

    pub fn is_render_size(&self, size: u32) -> bool {
        self.render_sizes.contains(&size)
    }
}
