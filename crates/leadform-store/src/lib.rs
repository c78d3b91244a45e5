#![allow(missing_docs)]

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod local;
pub mod mirror;
pub mod repository;

pub use error::PersistError;
#[cfg(feature = "http")]
pub use http::HttpFormRepository;
pub use local::LocalFormRepository;
pub use mirror::{ElementMirror, MirrorSnapshot, StorageKey};
pub use repository::FormRepository;
