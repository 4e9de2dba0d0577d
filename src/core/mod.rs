pub mod colors;
pub mod event;
pub mod handler;
pub mod params;
pub mod renderer;
pub mod svg;
pub mod symbol;
pub mod template;
