pub mod document;
pub mod export_history;
pub mod profile;
pub mod result;
pub mod user;

pub use document::*;
pub use export_history::*;
pub use profile::*;
pub use result::*;
pub use user::*;
