pub mod core;
pub mod fixture;

pub fn is_send_sync<T: Send + Sync>(_: &T) {}
