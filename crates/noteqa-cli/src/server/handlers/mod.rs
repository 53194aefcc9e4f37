//! API request handlers.

mod export;
mod review;
mod session;

pub use export::*;
pub use review::*;
pub use session::*;
