pub mod ai;
pub mod collision;
pub mod config;
pub mod constants;
pub mod entities;
pub mod grid;
pub mod input;
pub mod math;
pub mod orbs;
pub mod room;
pub mod snake;
pub mod types;
pub mod world;
