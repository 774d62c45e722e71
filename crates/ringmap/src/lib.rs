pub mod decor;
pub mod geometry;
pub mod macros;
pub mod metrics;
pub mod sector;
pub mod settings;
pub mod svg;
pub mod view;
