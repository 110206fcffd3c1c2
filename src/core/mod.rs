// Core modules: foreign boundary, digit handling, digests, and error modeling.
pub mod bn;
pub mod digest;
pub mod digits;
pub mod error;
pub mod foreign;
