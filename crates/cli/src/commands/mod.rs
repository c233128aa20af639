//! Command implementations.

mod events;
mod overweight;
mod sync;
mod validate;

pub use events::run_events;
pub use overweight::run_overweight;
pub use sync::run_sync;
pub use validate::run_validate;
