pub mod hubspot;
pub mod snapshot;
