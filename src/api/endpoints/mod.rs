pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod exports;
pub mod files;
pub mod ocr;
pub mod profiles;
