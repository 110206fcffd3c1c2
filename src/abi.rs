//! Purpose: C ABI bridge for embedders holding libcrypto `BIGNUM` handles.
//! Exports: `bnconv_render`, `bnconv_parse`, and string/error free functions.
//! Role: Stable ABI surface for non-Rust callers.
//! Invariants: Strings handed out are Rust-allocated and must come back through `bnconv_string_free`.
//! Invariants: Input handles are borrowed for the call only; parsed handles belong to the caller.
//! Invariants: Error kinds map 1:1 with core error kinds.
use crate::core::bn::{BigNum, BigNumRef, sys};
use crate::core::error::{Error, ErrorKind, to_exit_code};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

#[allow(non_camel_case_types)]
#[repr(C)]
pub struct bnconv_error {
    kind: i32,
    message: *mut c_char,
    hint: *mut c_char,
    offset: u64,
    has_offset: u8,
}

/// Renders `value` in `base` (0 means 10) into `*out_text`.
///
/// # Safety
/// `value` must be null or a live `BIGNUM` not mutated during the call; the out pointers must
/// be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bnconv_render(
    value: *const sys::BIGNUM,
    base: u32,
    out_text: *mut *mut c_char,
    out_err: *mut *mut bnconv_error,
) -> i32 {
    if out_text.is_null() {
        return fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("out_text is null"),
        );
    }
    let Some(value) = (unsafe { BigNumRef::from_ptr(value) }) else {
        return fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("bignum handle is null"),
        );
    };
    let base = if base == 0 { 10 } else { base };
    let text = match value.text(base) {
        Ok(text) => text,
        Err(err) => return fail(out_err, err),
    };
    let text = match CString::new(text) {
        Ok(text) => text,
        Err(err) => {
            return fail(
                out_err,
                Error::new(ErrorKind::Internal)
                    .with_message("rendered text contains nul")
                    .with_source(err),
            );
        }
    };
    unsafe {
        *out_text = text.into_raw();
    }
    0
}

/// Parses `text` in `base` (0 detects a prefix) into a new caller-owned `BIGNUM`.
///
/// # Safety
/// `text` must be null or a NUL-terminated string; the out pointers must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bnconv_parse(
    text: *const c_char,
    base: u32,
    out_value: *mut *mut sys::BIGNUM,
    out_err: *mut *mut bnconv_error,
) -> i32 {
    if out_value.is_null() {
        return fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("out_value is null"),
        );
    }
    if text.is_null() {
        return fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("text is null"),
        );
    }
    let text = match unsafe { CStr::from_ptr(text) }.to_str() {
        Ok(text) => text,
        Err(err) => {
            return fail(
                out_err,
                Error::new(ErrorKind::Usage)
                    .with_message("text is not valid UTF-8")
                    .with_source(err),
            );
        }
    };
    match BigNum::parse(text, base) {
        Ok(value) => {
            unsafe {
                *out_value = value.into_raw();
            }
            0
        }
        Err(err) => fail(out_err, err),
    }
}

/// # Safety
/// `text` must be null or a string returned by `bnconv_render` that was not freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bnconv_string_free(text: *mut c_char) {
    if text.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(text));
    }
}

/// # Safety
/// `err` must be null or an error returned through an `out_err` pointer that was not freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bnconv_error_free(err: *mut bnconv_error) {
    if err.is_null() {
        return;
    }
    unsafe {
        let err = Box::from_raw(err);
        if !err.message.is_null() {
            drop(CString::from_raw(err.message));
        }
        if !err.hint.is_null() {
            drop(CString::from_raw(err.hint));
        }
    }
}

/// # Safety
/// `err` must be null or a live error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bnconv_error_kind(err: *const bnconv_error) -> i32 {
    if err.is_null() {
        return 0;
    }
    unsafe { (*err).kind }
}

/// Borrowed message; valid until `bnconv_error_free`.
///
/// # Safety
/// `err` must be null or a live error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bnconv_error_message(err: *const bnconv_error) -> *const c_char {
    if err.is_null() {
        return ptr::null();
    }
    unsafe { (*err).message }
}

/// Byte offset of a parse failure, or -1 when the error has none.
///
/// # Safety
/// `err` must be null or a live error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bnconv_error_offset(err: *const bnconv_error) -> i64 {
    if err.is_null() {
        return -1;
    }
    let err = unsafe { &*err };
    if err.has_offset == 0 {
        return -1;
    }
    i64::try_from(err.offset).unwrap_or(i64::MAX)
}

fn fail(out_err: *mut *mut bnconv_error, err: Error) -> i32 {
    tracing::debug!(%err, "abi call failed");
    if out_err.is_null() {
        return -1;
    }
    let error = Box::new(bnconv_error {
        kind: to_exit_code(err.kind()),
        message: to_c_string(err.message().unwrap_or("")),
        hint: err.hint().map(to_c_string).unwrap_or(ptr::null_mut()),
        offset: err.offset().unwrap_or(0),
        has_offset: if err.offset().is_some() { 1 } else { 0 },
    });
    unsafe {
        *out_err = Box::into_raw(error);
    }
    -1
}

fn to_c_string(input: &str) -> *mut c_char {
    CString::new(input)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: *const sys::BIGNUM, base: u32) -> Result<String, (i32, String)> {
        let mut out = ptr::null_mut();
        let mut err = ptr::null_mut();
        let ret = unsafe { bnconv_render(value, base, &mut out, &mut err) };
        if ret == 0 {
            let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
            unsafe { bnconv_string_free(out) };
            return Ok(text);
        }
        let kind = unsafe { bnconv_error_kind(err) };
        let message = unsafe { CStr::from_ptr(bnconv_error_message(err)) }
            .to_str()
            .unwrap()
            .to_string();
        unsafe { bnconv_error_free(err) };
        Err((kind, message))
    }

    #[test]
    fn render_borrows_caller_handle() {
        let value = BigNum::parse("-123456789012345678901234567890", 10).unwrap();
        assert_eq!(
            render(value.as_ptr(), 0).unwrap(),
            "-123456789012345678901234567890"
        );
        assert_eq!(render(value.as_ptr(), 10).unwrap(), value.to_dec_string().unwrap());
    }

    #[test]
    fn render_null_handle_is_usage_error() {
        let (kind, message) = render(ptr::null(), 10).unwrap_err();
        assert_eq!(kind, to_exit_code(ErrorKind::Usage));
        assert_eq!(message, "bignum handle is null");
    }

    #[test]
    fn render_bad_base_is_usage_error() {
        let value = BigNum::new().unwrap();
        let (kind, _) = render(value.as_ptr(), 99).unwrap_err();
        assert_eq!(kind, to_exit_code(ErrorKind::Usage));
    }

    #[test]
    fn parse_hands_ownership_to_caller() {
        let text = CString::new("0x2a").unwrap();
        let mut out = ptr::null_mut();
        let mut err = ptr::null_mut();
        let ret = unsafe { bnconv_parse(text.as_ptr(), 0, &mut out, &mut err) };
        assert_eq!(ret, 0);
        let value = unsafe { BigNum::from_raw(out) }.expect("parsed handle");
        assert_eq!(value.to_dec_string().unwrap(), "42");
    }

    #[test]
    fn parse_error_reports_offset() {
        let text = CString::new("12z").unwrap();
        let mut out = ptr::null_mut();
        let mut err = ptr::null_mut();
        let ret = unsafe { bnconv_parse(text.as_ptr(), 10, &mut out, &mut err) };
        assert_eq!(ret, -1);
        assert!(out.is_null());
        assert_eq!(unsafe { bnconv_error_kind(err) }, to_exit_code(ErrorKind::Parse));
        assert_eq!(unsafe { bnconv_error_offset(err) }, 2);
        unsafe { bnconv_error_free(err) };
    }

    #[test]
    fn missing_out_err_still_fails() {
        let value = BigNum::new().unwrap();
        let ret = unsafe { bnconv_render(value.as_ptr(), 10, ptr::null_mut(), ptr::null_mut()) };
        assert_eq!(ret, -1);
    }
}
