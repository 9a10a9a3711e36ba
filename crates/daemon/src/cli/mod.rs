pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Contact, Daemon, Grid, Health, Identity, Init, Keys, Message, Tile, Version};
