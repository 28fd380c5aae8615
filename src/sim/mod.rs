pub mod event;
pub mod level;
pub mod quiz;
pub mod step;
pub mod world;
