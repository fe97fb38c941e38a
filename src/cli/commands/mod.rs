//! One module per subcommand. Each exposes an `Args` struct and `execute`.

pub mod cast;
pub mod check;
pub mod daemon;
pub mod generate;
pub mod init;
pub mod status;
pub mod sweep;
