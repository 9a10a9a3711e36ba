mod contact_edge;
mod identity;
mod message;
mod tile;

pub use contact_edge::ContactEdge;
pub use identity::Identity;
pub use message::{Message, MessageWriteError, ReadMessages, ReceivedMessage};
pub use tile::{clip_label, Tile, TileFields, TilePatch, MAX_LABEL_CHARS};
