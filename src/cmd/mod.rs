//! CLI command implementations.
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `project` | `Init`           |
//! | `access`  | `Access`         |
//! | `derive`  | `Derive`         |
//! | `config`  | `Config`         |

pub mod access;
pub mod config;
pub mod derive;
pub mod project;

pub use access::cmd_access;
pub use config::cmd_config;
pub use derive::cmd_derive;
pub use project::cmd_init;
