pub mod adapters;
pub mod native;
pub mod vendor;
