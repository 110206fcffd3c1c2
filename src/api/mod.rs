//! Purpose: Define the public Rust API boundary for bnconv.
//! Exports: Bignum handles, the renderer seam, digit helpers and errors.
//! Role: Public, additive-only surface; hides the raw FFI declarations except the opaque handle type.
//! Invariants: This module is the only public path to core types.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::bn::sys::BIGNUM;
pub use crate::core::bn::{Align, BigNum, BigNumRef, FormatSpec, FormatStyle, Libcrypto};
pub use crate::core::digest::{DEMO_LINES, sha512_hex};
pub use crate::core::digits::{MAX_BASE, MIN_BASE};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::foreign::{
    ForeignCStr, ForeignRadix, NIL_TEXT, Renderer, render, render_opt, render_radix,
};
