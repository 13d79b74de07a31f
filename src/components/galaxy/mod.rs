mod component;
mod render;
mod state;

pub use component::{CodeGalaxy, download, export_galaxy_image};
