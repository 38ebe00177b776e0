pub const CORE_CONFIG: &'static str = include_str!("../core.toml");

pub mod activation;
pub mod actor_ref;
pub mod addressable;
pub mod config;
pub(crate) mod directory;
pub mod error;
pub mod ext;
pub mod key;
pub mod message;
pub mod props;
pub mod system;
pub mod util;

pub use addressable::{Addressable, AddressableContext, AddressableReference, DeactivationReason};
pub use message::Message;
