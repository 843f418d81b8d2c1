//! Crate-level test suite exercising the public surface.
