//! Integration tests running the generated maintainer scripts and the
//! `alternatives` subcommand against a stub `update-alternatives`.

mod alternatives_tests;
mod interrupt_tests;
mod script_tests;
