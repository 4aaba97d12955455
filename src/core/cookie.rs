//! Signed cookie accessor and its per-name registry.

mod accessor;
mod codec;
mod registry;

pub use accessor::{CookieState, SignedCookie};
pub use codec::PayloadCodec;
pub use registry::CookieRegistry;
