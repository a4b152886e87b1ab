//! Animated grid plots of random-walk trajectories.
//!
//! [`scene`] decides what happens and when, [`timeline`] turns that into per-frame state, and
//! [`render`] draws the frames with plotters.

pub mod error;
pub mod quality;
pub mod render;
pub mod scene;
pub mod timeline;

use std::path::Path;

use walk_core::WalkDocument;
use walk_core::document::data_file_path;

pub use error::{AnimateError, RenderError};
pub use quality::Quality;
pub use scene::PathScene;

/// Loads the model's document from `data_dir` and builds the scene for one temperature.
pub fn load_scene(
    data_dir: &Path,
    model: &str,
    temperature: &str,
    rounds: usize,
) -> Result<PathScene, AnimateError> {
    let temperature = scene::parse_temperature(temperature)?;
    let path = data_file_path(data_dir, model)?;
    let doc = WalkDocument::load(&path)?;
    PathScene::construct(&doc, model, temperature, rounds)
}
