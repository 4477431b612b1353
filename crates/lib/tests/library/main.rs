//! Library-level tests spanning several modules.

mod lifecycle_tests;
mod packaging_tests;
