pub mod background;
pub mod entity;
pub mod geometry;
pub mod physics;
pub mod rules;
pub mod tile;
