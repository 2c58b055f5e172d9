//! Domain and wire types.

mod file;
mod request;
mod secret;
mod user;

pub use file::*;
pub use request::*;
pub use secret::*;
pub use user::*;
