//! Purpose: Copy-then-free adapter from foreign-allocated C strings to owned Rust strings.
//! Exports: `Renderer`, `ForeignRadix`, `ForeignCStr`, `render`, `render_radix`, `render_opt`.
//! Role: The single place where foreign text buffers are created, copied and released.
//! Invariants: Every non-null foreign buffer is released exactly once, by the renderer that made it.
//! Invariants: A null foreign buffer is never released and never dereferenced.
//! Invariants: Null value handles are rejected before reaching the foreign library.
use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;
use std::ptr::NonNull;

use crate::core::error::{Error, ErrorKind};

/// Text produced for a logically absent value.
pub const NIL_TEXT: &str = "<nil>";

/// Radixes the foreign library can render natively.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForeignRadix {
    Dec,
    Hex,
}

/// The two foreign entry points the adapter consumes: render and release.
pub trait Renderer {
    type Value;

    /// Renders `value` into a renderer-owned NUL-terminated buffer.
    /// Returns null when the renderer could not allocate the buffer.
    ///
    /// # Safety
    /// `value` must be non-null and valid for reads for the duration of the call.
    unsafe fn render(&self, value: *const Self::Value, radix: ForeignRadix) -> *mut c_char;

    /// # Safety
    /// `buf` must have been returned by `render` on this renderer and not released since.
    unsafe fn release(&self, buf: NonNull<c_char>);
}

/// A foreign-allocated C string that is released through its renderer on drop.
pub struct ForeignCStr<'r, R: Renderer + ?Sized> {
    ptr: NonNull<c_char>,
    renderer: &'r R,
}

impl<'r, R: Renderer + ?Sized> ForeignCStr<'r, R> {
    /// Takes ownership of a buffer returned by `renderer.render`. Returns `None` for null.
    ///
    /// # Safety
    /// `ptr` must be null or a NUL-terminated buffer produced by `renderer` that nothing
    /// else will release.
    pub unsafe fn from_raw(renderer: &'r R, ptr: *mut c_char) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, renderer })
    }

    pub fn as_c_str(&self) -> &CStr {
        // The buffer is NUL-terminated and stays alive until drop.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    pub fn to_native(&self) -> Result<String, Error> {
        self.as_c_str()
            .to_str()
            .map(str::to_owned)
            .map_err(|err| {
                Error::new(ErrorKind::Corrupt)
                    .with_message("foreign text is not valid utf-8")
                    .with_source(err)
            })
    }
}

impl<R: Renderer + ?Sized> Drop for ForeignCStr<'_, R> {
    fn drop(&mut self) {
        unsafe { self.renderer.release(self.ptr) }
    }
}

impl<R: Renderer + ?Sized> fmt::Debug for ForeignCStr<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ForeignCStr").field(&self.as_c_str()).finish()
    }
}

/// Renders `value` as canonical base-10 text.
///
/// # Safety
/// A non-null `value` must be a valid handle for `renderer` and must not be mutated
/// concurrently for the duration of the call.
pub unsafe fn render<R>(renderer: &R, value: *const R::Value) -> Result<String, Error>
where
    R: Renderer + ?Sized,
{
    unsafe { render_radix(renderer, value, ForeignRadix::Dec) }
}

/// Renders `value` in a radix the foreign library supports natively.
///
/// # Safety
/// Same contract as [`render`].
pub unsafe fn render_radix<R>(
    renderer: &R,
    value: *const R::Value,
    radix: ForeignRadix,
) -> Result<String, Error>
where
    R: Renderer + ?Sized,
{
    if value.is_null() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("bignum handle is null")
            .with_hint("pass a live handle, or render an absent value with render_opt"));
    }

    let raw = unsafe { renderer.render(value, radix) };
    let Some(text) = (unsafe { ForeignCStr::from_raw(renderer, raw) }) else {
        tracing::debug!(?radix, "foreign renderer returned no buffer");
        return Err(Error::new(ErrorKind::Alloc)
            .with_message("foreign library failed to allocate text buffer"));
    };

    let native = text.to_native();
    if let Err(err) = &native {
        tracing::debug!(?radix, %err, "foreign text copy failed");
    }
    native
}

/// Like [`render`], but a logically absent value renders as [`NIL_TEXT`].
/// `Some(null)` is still a usage error.
///
/// # Safety
/// Same contract as [`render`].
pub unsafe fn render_opt<R>(renderer: &R, value: Option<*const R::Value>) -> Result<String, Error>
where
    R: Renderer + ?Sized,
{
    match value {
        None => Ok(NIL_TEXT.to_string()),
        Some(value) => unsafe { render(renderer, value) },
    }
}

#[cfg(test)]
mod test_doubles {
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::ffi::CString;
    use std::os::raw::c_char;
    use std::ptr::{self, NonNull};

    use super::{ForeignRadix, Renderer};

    /// Renders `i128` values and tracks every buffer it hands out.
    #[derive(Default)]
    pub struct CountingRenderer {
        pub renders: Cell<usize>,
        pub releases: Cell<usize>,
        pub fail_alloc: bool,
        pub raw_bytes: Option<Vec<u8>>,
        live: RefCell<HashSet<usize>>,
    }

    impl CountingRenderer {
        pub fn failing() -> Self {
            Self {
                fail_alloc: true,
                ..Self::default()
            }
        }

        pub fn with_raw_bytes(bytes: &[u8]) -> Self {
            Self {
                raw_bytes: Some(bytes.to_vec()),
                ..Self::default()
            }
        }

        pub fn live(&self) -> usize {
            self.live.borrow().len()
        }
    }

    impl Renderer for CountingRenderer {
        type Value = i128;

        unsafe fn render(&self, value: *const i128, radix: ForeignRadix) -> *mut c_char {
            self.renders.set(self.renders.get() + 1);
            if self.fail_alloc {
                return ptr::null_mut();
            }
            let bytes = match &self.raw_bytes {
                Some(bytes) => bytes.clone(),
                None => {
                    let value = unsafe { *value };
                    match radix {
                        ForeignRadix::Dec => value.to_string().into_bytes(),
                        ForeignRadix::Hex if value < 0 => {
                            format!("-{:X}", value.unsigned_abs()).into_bytes()
                        }
                        ForeignRadix::Hex => format!("{value:X}").into_bytes(),
                    }
                }
            };
            let raw = CString::new(bytes).expect("no interior nul").into_raw();
            self.live.borrow_mut().insert(raw as usize);
            raw
        }

        unsafe fn release(&self, buf: NonNull<c_char>) {
            self.releases.set(self.releases.get() + 1);
            let was_live = self.live.borrow_mut().remove(&(buf.as_ptr() as usize));
            assert!(was_live, "released a buffer that is not live");
            drop(unsafe { CString::from_raw(buf.as_ptr()) });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::test_doubles::CountingRenderer;
    use super::{ForeignRadix, NIL_TEXT, render, render_opt, render_radix};
    use crate::core::error::ErrorKind;

    #[test]
    fn render_copies_text_and_releases_once() {
        let renderer = CountingRenderer::default();
        let value: i128 = -42;
        let text = unsafe { render(&renderer, ptr::from_ref(&value)) }.expect("render");
        assert_eq!(text, "-42");
        assert_eq!(renderer.renders.get(), 1);
        assert_eq!(renderer.releases.get(), 1);
        assert_eq!(renderer.live(), 0);
    }

    #[test]
    fn repeated_renders_return_to_baseline() {
        let renderer = CountingRenderer::default();
        for value in [0i128, 1, -1, i128::MAX, i128::MIN] {
            let text = unsafe { render(&renderer, ptr::from_ref(&value)) }.expect("render");
            assert_eq!(text, value.to_string());
        }
        assert_eq!(renderer.renders.get(), 5);
        assert_eq!(renderer.releases.get(), 5);
        assert_eq!(renderer.live(), 0);
    }

    #[test]
    fn allocation_failure_is_reported_without_release() {
        let renderer = CountingRenderer::failing();
        let value: i128 = 7;
        let err =
            unsafe { render(&renderer, ptr::from_ref(&value)) }.expect_err("alloc failure");
        assert_eq!(err.kind(), ErrorKind::Alloc);
        assert_eq!(renderer.renders.get(), 1);
        assert_eq!(renderer.releases.get(), 0);
    }

    #[test]
    fn invalid_utf8_still_releases_buffer() {
        let renderer = CountingRenderer::with_raw_bytes(&[b'1', 0xff, b'2']);
        let value: i128 = 12;
        let err =
            unsafe { render(&renderer, ptr::from_ref(&value)) }.expect_err("invalid utf-8");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(renderer.releases.get(), 1);
        assert_eq!(renderer.live(), 0);
    }

    #[test]
    fn null_handle_never_reaches_renderer() {
        let renderer = CountingRenderer::default();
        let err = unsafe { render(&renderer, ptr::null()) }.expect_err("null handle");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(renderer.renders.get(), 0);
        assert_eq!(renderer.releases.get(), 0);
    }

    #[test]
    fn absent_value_renders_sentinel() {
        let renderer = CountingRenderer::default();
        let text = unsafe { render_opt(&renderer, None) }.expect("sentinel");
        assert_eq!(text, NIL_TEXT);
        assert_eq!(renderer.renders.get(), 0);

        let err = unsafe { render_opt(&renderer, Some(ptr::null())) }.expect_err("null");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn hex_radix_goes_through_same_discipline() {
        let renderer = CountingRenderer::default();
        let value: i128 = 255;
        let text = unsafe { render_radix(&renderer, ptr::from_ref(&value), ForeignRadix::Hex) }
            .expect("hex");
        assert_eq!(text, "FF");
        assert_eq!(renderer.releases.get(), 1);
    }
}
