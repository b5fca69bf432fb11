//! Benchmark-only crate; see `benches/` for the criterion harnesses.
