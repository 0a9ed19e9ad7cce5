//! qtpods core library
//!
//! Manages third-party source dependencies ("pods") of a qmake project that
//! live in the project's git repository as submodules.
//!
//! ```text
//!   PodManager ──► SubmoduleGateway ──► CommandRunner (git)
//!       │
//!       ├──► podinfo (.podinfo metadata store)
//!       ├──► generator (pods.pri, pods-subdirs.pri, <repo>.pro)
//!       ├──► validator (pod directory layout)
//!       └──► catalog (.gitmodules listing, remote pod lists)
//! ```

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod generator;
pub mod manager;
pub mod pod;
pub mod podinfo;
pub mod submodule;
pub mod validator;

pub use error::{PodError, PodResult};
pub use manager::{Completion, PodManager};
pub use pod::Pod;
