//! Purpose: Safe owned and borrowed wrappers around libcrypto `BIGNUM` handles.
//! Exports: `BigNum`, `BigNumRef`, `Libcrypto`, `FormatSpec`.
//! Role: Foreign bignum boundary; text conversion in any base 2..=62 and parsing back.
//! Invariants: An owned `BigNum` frees its handle exactly once, on drop.
//! Invariants: A `BigNumRef` never outlives the handle it borrows and never frees it.
//! Invariants: All FFI interaction is confined to this module, `format`, and `sys`.
use std::cmp::Ordering;
use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::ptr::NonNull;
use std::str::FromStr;

use crate::core::digits::{self, Scanned};
use crate::core::error::{Error, ErrorKind};
use crate::core::foreign::{self, ForeignRadix, Renderer};

mod format;
pub mod sys;

pub use format::{Align, FormatSpec, FormatStyle};

/// The libcrypto text renderer: `BN_bn2dec`/`BN_bn2hex`, released with `OPENSSL_free`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Libcrypto;

impl Renderer for Libcrypto {
    type Value = sys::BIGNUM;

    unsafe fn render(&self, value: *const sys::BIGNUM, radix: ForeignRadix) -> *mut c_char {
        unsafe {
            match radix {
                ForeignRadix::Dec => sys::bnconv_bn_to_dec(value),
                ForeignRadix::Hex => sys::bnconv_bn_to_hex(value),
            }
        }
    }

    unsafe fn release(&self, buf: NonNull<c_char>) {
        unsafe { sys::bnconv_free(buf.as_ptr().cast()) }
    }
}

/// An owned libcrypto big integer.
///
/// `BigNum` is `Send` but not `Sync`: libcrypto does not document concurrent reads of one
/// `BIGNUM` as safe, so shared access has to be serialized by the caller.
pub struct BigNum {
    ptr: NonNull<sys::BIGNUM>,
}

unsafe impl Send for BigNum {}

impl BigNum {
    /// A new zero value.
    pub fn new() -> Result<Self, Error> {
        let ptr = unsafe { sys::bnconv_bn_new() };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr })
            .ok_or_else(|| alloc_error("failed to allocate bignum"))
    }

    /// Takes ownership of a handle allocated by libcrypto. Returns `None` for null.
    ///
    /// # Safety
    /// `ptr` must be a valid `BIGNUM` that nothing else frees.
    pub unsafe fn from_raw(ptr: *mut sys::BIGNUM) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Releases ownership; the caller must eventually free the handle with `BN_free`.
    pub fn into_raw(self) -> *mut sys::BIGNUM {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }

    /// Parses an optionally signed integer literal in `base` (0 or 2..=62).
    ///
    /// Base 0 selects the base from a `0x`, `0b`, `0o` or leading `0` prefix and accepts `_`
    /// between digits.
    pub fn parse(text: &str, base: u32) -> Result<Self, Error> {
        let scanned = digits::scan(text, base)?;
        let mut bn = Self::new()?;
        match scanned.base {
            10 => bn.set_ascii(&scanned, sys::bnconv_bn_set_dec)?,
            16 => bn.set_ascii(&scanned, sys::bnconv_bn_set_hex)?,
            _ => bn.set_by_multiplication(&scanned)?,
        }
        if scanned.negative && !bn.is_zero() {
            unsafe { sys::bnconv_bn_set_negative(bn.as_mut_ptr(), 1) };
        }
        tracing::trace!(
            base = scanned.base,
            digits = scanned.digits.len(),
            "parsed bignum"
        );
        Ok(bn)
    }

    pub fn try_clone(&self) -> Result<Self, Error> {
        self.as_bn_ref().try_to_owned()
    }

    pub fn as_bn_ref(&self) -> BigNumRef<'_> {
        BigNumRef {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const sys::BIGNUM {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut sys::BIGNUM {
        self.ptr.as_ptr()
    }

    pub fn is_zero(&self) -> bool {
        self.as_bn_ref().is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.as_bn_ref().is_negative()
    }

    pub fn num_bits(&self) -> u32 {
        self.as_bn_ref().num_bits()
    }

    /// Canonical base-10 text.
    pub fn to_dec_string(&self) -> Result<String, Error> {
        self.as_bn_ref().to_dec_string()
    }

    pub fn text(&self, base: u32) -> Result<String, Error> {
        self.as_bn_ref().text(base)
    }

    pub fn append(&self, buf: &mut String, base: u32) -> Result<(), Error> {
        self.as_bn_ref().append(buf, base)
    }

    fn set_ascii(
        &mut self,
        scanned: &Scanned,
        set: unsafe extern "C" fn(*mut sys::BIGNUM, *const c_char) -> i32,
    ) -> Result<(), Error> {
        let ascii = scanned.ascii();
        let digits = CString::new(ascii.as_str()).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("digit string contains nul")
                .with_source(err)
        })?;
        let consumed = unsafe { set(self.as_mut_ptr(), digits.as_ptr()) };
        if usize::try_from(consumed).ok() != Some(ascii.len()) {
            tracing::debug!(consumed, expected = ascii.len(), "foreign digit parse failed");
            return Err(alloc_error("foreign library failed to load digits"));
        }
        Ok(())
    }

    fn set_by_multiplication(&mut self, scanned: &Scanned) -> Result<(), Error> {
        let base = scanned.base;
        let (_, chunk_digits) = digits::chunk_for_base(base);
        for chunk in scanned.digits.chunks(chunk_digits) {
            let mul = base.pow(chunk.len() as u32);
            let add = chunk
                .iter()
                .fold(0u32, |acc, digit| acc * base + u32::from(*digit));
            let ret = unsafe { sys::bnconv_bn_mul_add_word(self.as_mut_ptr(), mul, add) };
            if ret != 0 {
                return Err(alloc_error("foreign multiply-add failed"));
            }
        }
        Ok(())
    }
}

impl Drop for BigNum {
    fn drop(&mut self) {
        unsafe { sys::bnconv_bn_free(self.ptr.as_ptr()) }
    }
}

impl FromStr for BigNum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, 10)
    }
}

impl TryFrom<u64> for BigNum {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        let mut bn = Self::new()?;
        if unsafe { sys::bnconv_bn_set_u64(bn.as_mut_ptr(), value) } != 0 {
            return Err(alloc_error("failed to load word into bignum"));
        }
        Ok(bn)
    }
}

impl TryFrom<i64> for BigNum {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let mut bn = Self::try_from(value.unsigned_abs())?;
        if value < 0 {
            unsafe { sys::bnconv_bn_set_negative(bn.as_mut_ptr(), 1) };
        }
        Ok(bn)
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> Ordering {
        unsafe { sys::bnconv_bn_cmp(self.as_ptr(), other.as_ptr()) }.cmp(&0)
    }
}

/// A borrowed libcrypto big integer; the handle stays owned by someone else.
#[derive(Clone, Copy)]
pub struct BigNumRef<'a> {
    ptr: NonNull<sys::BIGNUM>,
    _marker: PhantomData<&'a sys::BIGNUM>,
}

impl<'a> BigNumRef<'a> {
    /// Borrows a handle owned elsewhere. Returns `None` for null.
    ///
    /// # Safety
    /// `ptr` must stay valid, and unmodified, for `'a`.
    pub unsafe fn from_ptr(ptr: *const sys::BIGNUM) -> Option<Self> {
        NonNull::new(ptr.cast_mut()).map(|ptr| Self {
            ptr,
            _marker: PhantomData,
        })
    }

    pub fn as_ptr(&self) -> *const sys::BIGNUM {
        self.ptr.as_ptr()
    }

    pub fn is_zero(&self) -> bool {
        unsafe { sys::bnconv_bn_is_zero(self.as_ptr()) != 0 }
    }

    pub fn is_negative(&self) -> bool {
        unsafe { sys::bnconv_bn_is_negative(self.as_ptr()) != 0 }
    }

    pub fn num_bits(&self) -> u32 {
        let bits = unsafe { sys::bnconv_bn_num_bits(self.as_ptr()) };
        u32::try_from(bits).unwrap_or(0)
    }

    pub fn try_to_owned(&self) -> Result<BigNum, Error> {
        let ptr = unsafe { sys::bnconv_bn_dup(self.as_ptr()) };
        unsafe { BigNum::from_raw(ptr) }.ok_or_else(|| alloc_error("failed to duplicate bignum"))
    }

    /// Canonical base-10 text, with `-` for negative values and no `+`.
    pub fn to_dec_string(&self) -> Result<String, Error> {
        unsafe { foreign::render(&Libcrypto, self.as_ptr()) }
    }

    /// Text in `base` (2..=62): `0-9`, then `a-z` for 10..=35, then `A-Z` for 36..=61.
    /// No prefix is added.
    pub fn text(&self, base: u32) -> Result<String, Error> {
        digits::check_base(base)?;
        match base {
            10 => self.to_dec_string(),
            16 => {
                let hex =
                    unsafe { foreign::render_radix(&Libcrypto, self.as_ptr(), ForeignRadix::Hex) }?;
                Ok(digits::normalize_foreign_hex(&hex))
            }
            _ => self.text_by_division(base),
        }
    }

    /// Appends `text(base)` to `buf`; `buf` is untouched on error.
    pub fn append(&self, buf: &mut String, base: u32) -> Result<(), Error> {
        let text = self.text(base)?;
        buf.push_str(&text);
        Ok(())
    }

    fn text_by_division(&self, base: u32) -> Result<String, Error> {
        let mut work = self.try_to_owned()?;
        unsafe { sys::bnconv_bn_set_negative(work.as_mut_ptr(), 0) };
        let (power, chunk_digits) = digits::chunk_for_base(base);

        let mut reversed = Vec::with_capacity(self.num_bits() as usize + 1);
        while !work.is_zero() {
            let mut rem = 0u32;
            let ret = unsafe { sys::bnconv_bn_div_word(work.as_mut_ptr(), power, &mut rem) };
            if ret != 0 {
                return Err(Error::new(ErrorKind::Internal).with_message("foreign division failed"));
            }
            let last = work.is_zero();
            for _ in 0..chunk_digits {
                if last && rem == 0 {
                    break;
                }
                reversed.push(digits::digit_char(rem % base));
                rem /= base;
            }
        }

        if reversed.is_empty() {
            reversed.push('0');
        }
        if self.is_negative() {
            reversed.push('-');
        }
        Ok(reversed.into_iter().rev().collect())
    }
}

fn alloc_error(message: &str) -> Error {
    Error::new(ErrorKind::Alloc).with_message(message)
}
