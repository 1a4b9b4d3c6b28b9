pub mod cancel;
pub mod config;
pub mod errors;
pub mod format;

pub use cancel::CancelToken;
