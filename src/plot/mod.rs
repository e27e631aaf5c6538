//! Chart renderers: ASCII for the terminal, SVG for files.

pub mod ascii;
pub mod svg;

pub use ascii::render_bundle;
pub use svg::write_svg;
