//! Request handlers.

pub mod health;
pub mod history;
pub mod info;
pub mod jobs;
pub mod library;
pub mod settings;

pub use health::*;
pub use history::*;
pub use info::*;
pub use jobs::*;
pub use library::*;
pub use settings::*;
