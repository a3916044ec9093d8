pub mod identity;

pub use identity::{CallerIdentity, IDENTITY_HEADER, UNKNOWN_IDENTITY};
