//! Secure `.env` loading for Rust services.
//!
//! Two stores share one validate -> read -> parse pipeline:
//! - [`SimpleStore`] writes values into the process environment.
//! - [`SecureStore`] keeps values in an isolated, audited map that other modules
//!   can locate through [`discovery`] without being handed a reference.
//!
//! The free functions re-exported from the facade drive a process-wide instance
//! of each store.

pub mod ambient;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod export;
mod facade;
mod loader;
pub mod parser;
pub mod profile;
pub mod reader;
pub mod resolver;
pub mod secure;
pub mod simple;
pub mod validator;
pub mod value;

pub use ambient::{AmbientEnv, MemoryEnv, ProcessEnv};
pub use discovery::LoaderManager;
pub use error::EnvError;
pub use facade::{
    LibraryInfo, clear, get, get_all_keys, get_bool, get_bool_secure, get_int, get_int_secure,
    get_secure, get_str, get_str_secure, info, is_loaded, is_loaded_secure, load, load_secure,
    load_secure_sync, load_sync, manager, security_info,
};
pub use profile::Profile;
pub use resolver::{DirectoryScanner, PathResolver};
pub use secure::{AccessLogEntry, LoadOptions, SecureStore, SecurityInfo, StoreState};
pub use simple::SimpleStore;
pub use validator::PathPolicy;
pub use value::{EnvironmentMap, TypedValue};
