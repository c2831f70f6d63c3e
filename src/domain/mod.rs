pub mod entity;
pub mod tile;
pub mod vector;
