//! CLI command implementations.
//!
//! | Module  | Commands handled |
//! |---------|------------------|
//! | `serve` | `Serve`          |
//! | `push`  | `Push`           |

pub mod push;
pub mod serve;

pub use push::cmd_push;
pub use serve::cmd_serve;
