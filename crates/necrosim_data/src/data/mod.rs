pub mod agent;
pub mod geometry;
pub mod wall;
