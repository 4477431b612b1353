//! nvdeb-lib: build Neovim from source and package it for Debian.
//!
//! The crate is organised around one immutable [`config::BuildConfig`]:
//! - `alternatives`: the nine editor alternatives, rendered maintainer scripts,
//!   and an in-process registrar with a per-binding report
//! - `package`: the staging tree, control record and `.deb` assembly
//! - `source`: clone, fetch, checkout and version derivation
//! - `pipeline`: the phases strung together, fail-fast

pub mod alternatives;
pub mod config;
pub mod consts;
pub mod package;
pub mod pipeline;
pub mod platform;
pub mod source;
pub mod tools;
