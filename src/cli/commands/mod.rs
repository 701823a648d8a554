//! CLI command implementations
//!
//! Each command returns its process exit code; see the `EXIT_*` constants in
//! [`crate::cli`].

pub mod init;
pub mod keygen;
pub mod mask;
pub mod reveal;
pub mod sample;
pub mod validate;
