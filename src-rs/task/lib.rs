pub mod limiter;
pub mod store;
pub mod types;

pub use limiter::ConcurrencyLimiter;
pub use store::TaskStore;
pub use types::{Task, TaskStatus};
