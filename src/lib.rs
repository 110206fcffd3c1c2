//! Purpose: Library crate backing the `bnconv` CLI, the C ABI, and tests.
//! Exports: `api` (owned/borrowed bignums, text rendering, parsing, errors) and `abi`.
//! Role: Allocation-safe text conversion for libcrypto `BIGNUM` handles.
//! Invariants: Foreign buffers are released only through the library that allocated them.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod abi;
pub mod api;
mod core;
