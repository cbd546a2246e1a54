pub mod acl;
pub mod entity;
pub mod error;
pub mod traits;
pub mod transition;
pub mod workflow;

mod serde_ext;
