mod alternatives;
mod build;
mod scripts;

pub use alternatives::{AlternativesAction, cmd_alternatives};
pub use build::cmd_build;
pub use scripts::cmd_scripts;
