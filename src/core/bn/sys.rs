// Raw FFI bindings to the libcrypto BIGNUM shim.
use std::os::raw::{c_char, c_int, c_void};

/// Opaque libcrypto `BIGNUM`.
#[repr(C)]
pub struct BIGNUM {
    _private: [u8; 0],
}

unsafe extern "C" {
    pub fn bnconv_bn_new() -> *mut BIGNUM;

    pub fn bnconv_bn_free(bn: *mut BIGNUM);

    pub fn bnconv_bn_dup(bn: *const BIGNUM) -> *mut BIGNUM;

    pub fn bnconv_bn_to_dec(bn: *const BIGNUM) -> *mut c_char;

    pub fn bnconv_bn_to_hex(bn: *const BIGNUM) -> *mut c_char;

    pub fn bnconv_free(ptr: *mut c_void);

    pub fn bnconv_bn_set_dec(bn: *mut BIGNUM, digits: *const c_char) -> c_int;

    pub fn bnconv_bn_set_hex(bn: *mut BIGNUM, digits: *const c_char) -> c_int;

    pub fn bnconv_bn_set_u64(bn: *mut BIGNUM, value: u64) -> c_int;

    pub fn bnconv_bn_set_negative(bn: *mut BIGNUM, negative: c_int);

    pub fn bnconv_bn_is_negative(bn: *const BIGNUM) -> c_int;

    pub fn bnconv_bn_is_zero(bn: *const BIGNUM) -> c_int;

    pub fn bnconv_bn_num_bits(bn: *const BIGNUM) -> c_int;

    pub fn bnconv_bn_cmp(a: *const BIGNUM, b: *const BIGNUM) -> c_int;

    pub fn bnconv_bn_div_word(bn: *mut BIGNUM, divisor: u32, remainder: *mut u32) -> c_int;

    pub fn bnconv_bn_mul_add_word(bn: *mut BIGNUM, mul: u32, add: u32) -> c_int;
}
