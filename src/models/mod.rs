pub mod document;
pub mod enums;
pub mod profile;
pub mod result;

pub use document::Document;
pub use enums::*;
pub use profile::Profile;
pub use result::{OcrResult, TableRow};
