//! Hosting-environment interfaces for timegated
//!
//! The enforcement core does not own connections. The hosting environment
//! supplies a roster of connected identities and a disconnect sink, and calls
//! back into the core's login gate for each incoming connection. These traits
//! are that seam; `MockHost` is the test double.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
