//! # Merkle-Ledger Test Suite
//!
//! Cross-crate tests and benchmarks.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # Flows that span several ml-* crates
//! └── benches/           # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ml-tests
//! cargo test -p ml-tests integration::pipeline
//! cargo bench -p ml-tests
//! ```

pub mod integration;
