//! HTTP/1.1 request head
//!
//! The node sends exactly one kind of request:
//!
//! ```text
//! POST <path> HTTP/1.1
//! Host: <host>
//! Content-Type: application/json
//! User-Agent: <agent>
//! Connection: close
//! Content-Length: <N>
//!
//! ```
//!
//! Lines end in CRLF. The head is streamed through the [`Encoder`] like the
//! body, so nothing is formatted into a buffer first.

use core::fmt::Write as _;

use embedded_io::Write;
use heapless::String;

use crate::encoder::Encoder;
use crate::errors::EncodeResult;

const CRLF: &str = "\r\n";

/// Static parts of the request head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHead<'a> {
    /// `Host` header value
    pub host: &'a str,
    /// Request target
    pub path: &'a str,
    /// `User-Agent` header value
    pub agent: &'a str,
}

impl<'a> RequestHead<'a> {
    /// Head for `path` on `host`
    pub fn new(host: &'a str, path: &'a str, agent: &'a str) -> Self {
        Self { host, path, agent }
    }

    /// Write the head announcing a body of `content_length` bytes
    pub fn write_to<W: Write>(&self, sink: &mut W, content_length: usize) -> EncodeResult<usize> {
        let mut encoder = Encoder::emit(sink);
        self.assemble(&mut encoder, content_length)
    }

    /// Size of the head in bytes
    pub fn length(&self, content_length: usize) -> usize {
        let mut encoder = Encoder::measure();
        let _ = self.assemble(&mut encoder, content_length);
        encoder.finish()
    }

    fn assemble<W: Write>(&self, enc: &mut Encoder<'_, W>, content_length: usize) -> EncodeResult<usize> {
        let mut length: String<20> = String::new();
        // usize::MAX has at most twenty digits
        let _ = write!(length, "{}", content_length);

        let lines = [
            ("POST ", self.path, " HTTP/1.1"),
            ("Host: ", self.host, ""),
            ("Content-Type: ", "application/json", ""),
            ("User-Agent: ", self.agent, ""),
            ("Connection: ", "close", ""),
            ("Content-Length: ", length.as_str(), ""),
        ];

        let mut written = 0;
        for (prefix, value, suffix) in lines {
            written += enc.raw(prefix)? + enc.raw(value)? + enc.raw(suffix)? + enc.raw(CRLF)?;
        }
        Ok(written + enc.raw(CRLF)?)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_io::ErrorType;

    use super::*;

    #[derive(Default)]
    struct VecSink(Vec<u8>);

    impl ErrorType for VecSink {
        type Error = Infallible;
    }

    impl Write for VecSink {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn head_bytes() {
        let head = RequestHead::new("iot.example.org", "/greenhouse/post", "greenpost/0.1");
        let mut sink = VecSink::default();

        let written = head.write_to(&mut sink, 142).unwrap();

        let expected = "POST /greenhouse/post HTTP/1.1\r\n\
                        Host: iot.example.org\r\n\
                        Content-Type: application/json\r\n\
                        User-Agent: greenpost/0.1\r\n\
                        Connection: close\r\n\
                        Content-Length: 142\r\n\
                        \r\n";
        assert_eq!(std::str::from_utf8(&sink.0).unwrap(), expected);
        assert_eq!(written, expected.len());
        assert_eq!(head.length(142), written);
    }

    #[test]
    fn length_grows_with_digits() {
        let head = RequestHead::new("h", "/", "a");
        assert_eq!(head.length(1000), head.length(999) + 1);
    }
}
