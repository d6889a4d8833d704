pub mod commands;
pub mod events;
pub mod reducer;
pub mod store;

pub use commands::{AppCommand, BuildInputs};
pub use events::{BuildRunEvent, BuildRunId, DomainEvent};
pub use reducer::reduce;
pub use store::AppStore;
