pub mod contact;
pub mod daemon;
pub mod grid;
pub mod health;
pub mod identity;
pub mod init;
pub mod keys;
pub mod message;
pub mod tile;
pub mod version;

pub use contact::Contact;
pub use daemon::Daemon;
pub use grid::Grid;
pub use health::Health;
pub use identity::Identity;
pub use init::Init;
pub use keys::Keys;
pub use message::Message;
pub use tile::Tile;
pub use version::Version;
