//! File persistence for the retail session pipeline.

pub mod categories;
pub mod events;
pub mod files;
pub mod jsonl;
pub mod sessions;

pub use categories::*;
pub use events::*;
pub use files::*;
pub use jsonl::*;
pub use sessions::*;
