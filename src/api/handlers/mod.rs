pub mod events;
pub mod health;
pub mod verify;

pub use self::events::events;
pub use self::health::{health, ping};
pub use self::verify::verify;
