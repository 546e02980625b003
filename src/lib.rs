//! Batch translation of Xcode string catalogs (`.xcstrings`) with Gemini.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod framing;
pub mod gemini;
pub mod languages;
pub mod pipeline;
pub mod retry;
pub mod ticker;
pub mod validator;
