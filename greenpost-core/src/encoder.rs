//! Exact-Length Streaming JSON Encoder
//!
//! ## Overview
//!
//! HTTP/1.1 wants `Content-Length` before the body, and the node has no RAM
//! to render the body first. The encoder therefore runs every document
//! twice:
//!
//! 1. **Measure** - every primitive reports how many bytes it would write
//!    and writes nothing.
//! 2. **Emit** - every primitive writes exactly those bytes to the sink and
//!    reports the same count.
//!
//! ## One Code Path
//!
//! The two modes are not two implementations. Every primitive produces its
//! output as a sequence of byte slices and hands each one to a single
//! private routine, `put`. That routine adds the slice length to the running
//! total in both modes and forwards the slice to the sink only in Emit mode.
//! There is no length formula anywhere that could drift from what is
//! written, so for any arguments:
//!
//! ```text
//! measure(args) == len(emit(args))
//! ```
//!
//! ## Fixed-Width Numbers
//!
//! Numbers are right-aligned and space-padded to [`NUMBER_LENGTH`]
//! characters. A numeric field costs the same bytes whatever its value,
//! which keeps the Measure pass trivial even as readings change. The padding
//! sits between the colon and the digits, where JSON allows whitespace:
//!
//! ```text
//! "temp":   250.00
//! ```
//!
//! Values that cannot be rendered in the width never break the count:
//! precision is reduced first, then the magnitude saturates. NaN and
//! infinities render as a padded `null`.
//!
//! ## Field Byte Counts
//!
//! | Primitive        | Output                          | Bytes                                   |
//! |------------------|---------------------------------|-----------------------------------------|
//! | `string_field`   | `"name":"value"[,]`             | `1 + name + 3 + value + 1 (+1)`         |
//! | `numeric_field`  | `"name":<9 chars>[,]`           | `1 + name + 2 + NUMBER_LENGTH (+1)`     |
//! | `array_of`       | `"kind": [{..},{..}]`           | `kind + 5 + Σ(1 + item + 1 (+1)) + 1`   |
//!
//! The table is documentation only; the code never consults it.
//!
//! ## Usage Example
//!
//! ```rust
//! use greenpost_core::Encoder;
//!
//! let mut measure = Encoder::measure();
//! measure.begin_object().unwrap();
//! measure.numeric_field("temp", 21.5, 2, true).unwrap();
//! measure.end_object().unwrap();
//!
//! assert_eq!(measure.total(), 1 + (1 + 4 + 2 + 9) + 1);
//! ```

use core::convert::Infallible;
use core::fmt::Write as _;

use embedded_io::{Error as _, ErrorType, Write};
use heapless::String;

use crate::constants::encoding::{NON_FINITE_LITERAL, NUMBER_LENGTH};
use crate::errors::{EncodeError, EncodeResult};

/// Scratch capacity for one rendered number before padding.
///
/// Sign, nine integer digits, point and up to eight decimals.
const NUMBER_SCRATCH: usize = 24;

/// Magnitude above which a number is saturated without rendering it.
const RENDER_LIMIT: f32 = 1.0e9;

/// Encoder mode
pub enum Mode<'w, W> {
    /// Count bytes only
    Measure,
    /// Count bytes and write them to the sink
    Emit(&'w mut W),
}

/// Sink that accepts and drops everything
///
/// Stands in for the sink type of a Measure-mode encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl ErrorType for Discard {
    type Error = Infallible;
}

impl Write for Discard {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Streaming JSON encoder running in Measure or Emit mode
///
/// Every primitive returns the number of bytes it produced (or would
/// produce); [`Encoder::total`] is the running sum.
pub struct Encoder<'w, W> {
    mode: Mode<'w, W>,
    total: usize,
}

impl Encoder<'static, Discard> {
    /// Encoder for the Measure pass
    pub fn measure() -> Self {
        Self {
            mode: Mode::Measure,
            total: 0,
        }
    }
}

impl<'w, W: Write> Encoder<'w, W> {
    /// Encoder for the Emit pass, writing into `sink`
    pub fn emit(sink: &'w mut W) -> Self {
        Self {
            mode: Mode::Emit(sink),
            total: 0,
        }
    }

    /// Encoder in an explicit mode
    pub fn with_mode(mode: Mode<'w, W>) -> Self {
        Self { mode, total: 0 }
    }

    /// True while running the Measure pass
    pub fn is_measuring(&self) -> bool {
        matches!(self.mode, Mode::Measure)
    }

    /// Bytes produced so far
    pub fn total(&self) -> usize {
        self.total
    }

    /// Consume the encoder and return the total
    pub fn finish(self) -> usize {
        self.total
    }

    /// The single path every byte takes
    fn put(&mut self, bytes: &[u8]) -> EncodeResult<usize> {
        if let Mode::Emit(sink) = &mut self.mode {
            sink.write_all(bytes)
                .map_err(|err| EncodeError::Sink(err.kind()))?;
        }
        self.total += bytes.len();
        Ok(bytes.len())
    }

    /// Pass text through verbatim
    pub fn raw(&mut self, text: &str) -> EncodeResult<usize> {
        self.put(text.as_bytes())
    }

    /// Write `count` spaces
    fn pad(&mut self, count: usize) -> EncodeResult<usize> {
        const SPACES: [u8; NUMBER_LENGTH] = [b' '; NUMBER_LENGTH];
        let mut written = 0;
        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(SPACES.len());
            written += self.put(&SPACES[..chunk])?;
            remaining -= chunk;
        }
        Ok(written)
    }

    fn quoted(&mut self, text: &str) -> EncodeResult<usize> {
        Ok(self.put(b"\"")? + self.put(text.as_bytes())? + self.put(b"\"")?)
    }

    /// `"name":`
    pub fn key(&mut self, name: &str) -> EncodeResult<usize> {
        Ok(self.quoted(name)? + self.put(b":")?)
    }

    /// `,` between members or items
    pub fn separator(&mut self) -> EncodeResult<usize> {
        self.put(b",")
    }

    fn separator_unless(&mut self, is_last: bool) -> EncodeResult<usize> {
        if is_last {
            Ok(0)
        } else {
            self.separator()
        }
    }

    /// `{`
    pub fn begin_object(&mut self) -> EncodeResult<usize> {
        self.put(b"{")
    }

    /// `}`
    pub fn end_object(&mut self) -> EncodeResult<usize> {
        self.put(b"}")
    }

    /// `"name":"value"` plus `,` unless last
    ///
    /// `value` must not need escaping; configuration guarantees that for
    /// every string the node sends.
    pub fn string_field(&mut self, name: &str, value: &str, is_last: bool) -> EncodeResult<usize> {
        Ok(self.key(name)? + self.quoted(value)? + self.separator_unless(is_last)?)
    }

    /// `"name":` plus a fixed-width number plus `,` unless last
    pub fn numeric_field(
        &mut self,
        name: &str,
        value: f32,
        decimals: u8,
        is_last: bool,
    ) -> EncodeResult<usize> {
        Ok(self.key(name)? + self.number(value, decimals)? + self.separator_unless(is_last)?)
    }

    /// `"name":` plus plain decimal digits plus `,` unless last
    pub fn integer_field(&mut self, name: &str, value: u32, is_last: bool) -> EncodeResult<usize> {
        let mut digits: String<10> = String::new();
        // u32::MAX has ten digits, the write cannot overflow
        let _ = write!(digits, "{}", value);
        Ok(self.key(name)? + self.raw(&digits)? + self.separator_unless(is_last)?)
    }

    /// A fixed-width number, exactly [`NUMBER_LENGTH`] bytes
    pub fn number(&mut self, value: f32, decimals: u8) -> EncodeResult<usize> {
        let rendered = render_fixed(value, decimals);
        let padding = NUMBER_LENGTH - rendered.len();
        Ok(self.pad(padding)? + self.raw(&rendered)?)
    }

    /// `"kind": [` + `{item}` separated by `,` + `]`
    ///
    /// `per_item` writes the members of one object; the braces and
    /// separators are written here. An empty `items` yields `"kind": []`.
    pub fn array_of<I, F>(&mut self, kind: &str, items: I, mut per_item: F) -> EncodeResult<usize>
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item) -> EncodeResult<usize>,
    {
        let mut written = self.quoted(kind)? + self.put(b": [")?;

        let mut items = items.into_iter().peekable();
        while let Some(item) = items.next() {
            written += self.begin_object()?;
            written += per_item(self, item)?;
            written += self.end_object()?;
            if items.peek().is_some() {
                written += self.separator()?;
            }
        }

        Ok(written + self.put(b"]")?)
    }

    /// `"kind": {` + members written by `body` + `}`
    pub fn object_of<F>(&mut self, kind: &str, body: F) -> EncodeResult<usize>
    where
        F: FnOnce(&mut Self) -> EncodeResult<usize>,
    {
        let written = self.quoted(kind)? + self.put(b": {")?;
        Ok(written + body(self)? + self.end_object()?)
    }
}

/// Number of decimal digits in `value`
pub fn decimal_digits(value: u32) -> u8 {
    let mut digits = 1;
    let mut rest = value / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    digits
}

/// Render `value` into at most [`NUMBER_LENGTH`] characters
///
/// Fallback order when the value doesn't fit: fewer decimals, then
/// saturation to the widest integer of the same sign. Non-finite values
/// become `null`.
fn render_fixed(value: f32, decimals: u8) -> String<NUMBER_SCRATCH> {
    let mut out: String<NUMBER_SCRATCH> = String::new();

    if !value.is_finite() {
        let _ = out.push_str(NON_FINITE_LITERAL);
        return out;
    }

    let max_decimals = (NUMBER_LENGTH - 1) as u8;
    let mut precision = decimals.min(max_decimals);
    if precision != decimals {
        gp_warn!("precision {} does not fit width, using {}", decimals, precision);
    }

    if value.abs() < RENDER_LIMIT {
        loop {
            out.clear();
            if write!(out, "{:.*}", precision as usize, value).is_ok() && out.len() <= NUMBER_LENGTH {
                return out;
            }
            if precision == 0 {
                break;
            }
            precision -= 1;
        }
    }

    gp_warn!("value out of range for a {}-character field, saturating", NUMBER_LENGTH);
    out.clear();
    let negative = value.is_sign_negative();
    if negative {
        let _ = out.push('-');
    }
    let nines = if negative { NUMBER_LENGTH - 1 } else { NUMBER_LENGTH };
    for _ in 0..nines {
        let _ = out.push('9');
    }
    out
}
