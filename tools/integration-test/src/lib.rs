//! End-to-end scenarios exercising the interchain test framework
//! against a real Docker engine.
//!
//! Every test is `#[ignore]`d so that `cargo test` stays hermetic.
//! Run them explicitly with a reachable Docker socket:
//!
//! ```bash
//! RUST_LOG=info cargo test -p interchain-integration-test -- --ignored --test-threads=1
//! ```

pub mod chains;
pub mod tests;
pub mod util;
