pub mod current;
pub mod error;
pub mod page;
pub mod platform;
pub mod render;
pub mod schedule;
pub mod scheduler;
pub mod view;
pub mod workflow;

pub use page::Page;
pub use platform::Platform;
pub use scheduler::Scheduler;
