//! Purpose: Flag-aware integer formatting for bignums, shared by `std::fmt` and runtime callers.
//! Exports: `FormatSpec`, `FormatStyle`, `Align`.
//! Role: Sign, `#` prefix, width, fill, alignment, zero padding and minimum digits.
//! Invariants: Output matches what `std::fmt` produces for primitive integers with the same flags;
//!             precision is a minimum digit count.
//! Invariants: Width and precision above `MAX_FORMAT_WIDTH` are usage errors, never allocations.
use std::fmt;

use super::{BigNum, BigNumRef};
use crate::core::error::{Error, ErrorKind};

/// Largest width or precision accepted, the same bound `std::fmt` puts on its own.
pub const MAX_FORMAT_WIDTH: usize = u16::MAX as usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormatStyle {
    Decimal,
    LowerHex,
    UpperHex,
    Octal,
    Binary,
}

impl FormatStyle {
    pub fn base(self) -> u32 {
        match self {
            FormatStyle::Decimal => 10,
            FormatStyle::LowerHex | FormatStyle::UpperHex => 16,
            FormatStyle::Octal => 8,
            FormatStyle::Binary => 2,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            FormatStyle::Decimal => "",
            FormatStyle::LowerHex | FormatStyle::UpperHex => "0x",
            FormatStyle::Octal => "0o",
            FormatStyle::Binary => "0b",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Align {
    Left,
    #[default]
    Right,
    Center,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormatSpec {
    pub style: FormatStyle,
    pub fill: char,
    pub align: Align,
    pub sign_plus: bool,
    /// Leading space for non-negative values; `sign_plus` wins when both are set.
    pub sign_space: bool,
    pub alternate: bool,
    pub zero_pad: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
}

impl FormatSpec {
    pub fn new(style: FormatStyle) -> Self {
        Self {
            style,
            fill: ' ',
            align: Align::Right,
            sign_plus: false,
            sign_space: false,
            alternate: false,
            zero_pad: false,
            width: None,
            precision: None,
        }
    }

    fn from_formatter(f: &fmt::Formatter<'_>, style: FormatStyle) -> Self {
        let align = match f.align() {
            Some(fmt::Alignment::Left) => Align::Left,
            Some(fmt::Alignment::Center) => Align::Center,
            Some(fmt::Alignment::Right) | None => Align::Right,
        };
        Self {
            style,
            fill: f.fill(),
            align,
            sign_plus: f.sign_plus(),
            sign_space: false,
            alternate: f.alternate(),
            zero_pad: f.sign_aware_zero_pad(),
            width: f.width(),
            precision: f.precision(),
        }
    }

    pub fn render(&self, value: BigNumRef<'_>) -> Result<String, Error> {
        check_bound("width", self.width)?;
        check_bound("precision", self.precision)?;
        let text = value.text(self.style.base())?;
        let (negative, digits) = match text.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, text.as_str()),
        };

        let mut body = String::with_capacity(digits.len() + 4);
        if let Some(min) = self.precision {
            body.extend(std::iter::repeat_n('0', min.saturating_sub(digits.len())));
        }
        if self.style == FormatStyle::UpperHex {
            body.push_str(&digits.to_ascii_uppercase());
        } else {
            body.push_str(digits);
        }

        let sign = if negative {
            "-"
        } else if self.sign_plus {
            "+"
        } else if self.sign_space {
            " "
        } else {
            ""
        };
        let prefix = if self.alternate {
            self.style.prefix()
        } else {
            ""
        };

        let len = sign.len() + prefix.len() + body.len();
        let pad = self.width.map_or(0, |width| width.saturating_sub(len));

        let mut out = String::with_capacity(len + pad);
        if self.zero_pad {
            out.push_str(sign);
            out.push_str(prefix);
            out.extend(std::iter::repeat_n('0', pad));
            out.push_str(&body);
            return Ok(out);
        }

        let (before, after) = match self.align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };
        out.extend(std::iter::repeat_n(self.fill, before));
        out.push_str(sign);
        out.push_str(prefix);
        out.push_str(&body);
        out.extend(std::iter::repeat_n(self.fill, after));
        Ok(out)
    }
}

fn check_bound(name: &str, value: Option<usize>) -> Result<(), Error> {
    match value {
        Some(value) if value > MAX_FORMAT_WIDTH => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("{name} {value} exceeds {MAX_FORMAT_WIDTH}"))),
        _ => Ok(()),
    }
}

fn write_styled(value: BigNumRef<'_>, f: &mut fmt::Formatter<'_>, style: FormatStyle) -> fmt::Result {
    let text = FormatSpec::from_formatter(f, style)
        .render(value)
        .map_err(|_| fmt::Error)?;
    f.write_str(&text)
}

macro_rules! impl_styled_fmt {
    ($trait:ident, $style:expr) => {
        impl fmt::$trait for BigNumRef<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_styled(*self, f, $style)
            }
        }

        impl fmt::$trait for BigNum {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_styled(self.as_bn_ref(), f, $style)
            }
        }
    };
}

impl_styled_fmt!(Display, FormatStyle::Decimal);
impl_styled_fmt!(LowerHex, FormatStyle::LowerHex);
impl_styled_fmt!(UpperHex, FormatStyle::UpperHex);
impl_styled_fmt!(Octal, FormatStyle::Octal);
impl_styled_fmt!(Binary, FormatStyle::Binary);

impl fmt::Debug for BigNumRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BigNumRef")
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl fmt::Debug for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BigNum").field(&format_args!("{self}")).finish()
    }
}
