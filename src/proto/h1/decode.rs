//! Body framing: Content-Length countdown and chunked-transfer decoding.
//!
//! The body states live in each driver's state enum because chunked
//! trailers re-enter the header dispatcher; the byte-level work shared
//! by both drivers is here.

use bytes::Bytes;

use super::parse::Parser;
use super::scan::{self, Reject, Scanned};
use crate::str::Str;

/// Parses the chunk-size hex at `p`, storing it into `to_read`.
pub(crate) fn chunk_size(parser: &mut Parser, buf: &Bytes, p: usize) -> Result<Scanned, Reject> {
    let mut acc = 0;
    let r = scan::hex(&mut parser.carry, buf, p, &mut acc)?;
    if let Scanned::Int { .. } = r {
        debug!("incoming chunk header: {0:#x} ({0} bytes)", acc);
        parser.to_read = acc;
    }
    Ok(r)
}

/// Consumes up to `to_read` body bytes from `buf[p..]` into `body` as a
/// zero-copy fragment. Returns the number of bytes taken.
pub(crate) fn read_span(parser: &mut Parser, body: &mut Str, buf: &Bytes, p: usize) -> usize {
    let avail = buf.len() - p;
    let mlen = (parser.to_read as usize).min(avail);
    body.push(buf.slice(p..p + mlen));
    parser.to_read -= mlen as u32;
    trace!("body span: {} bytes, {} to go", mlen, parser.to_read);
    mlen
}

/// Whether `c` may appear on a chunk-size line after the size itself
/// (chunk extensions), before the terminating LF.
pub(crate) fn is_chunk_ext_char(c: u8) -> bool {
    c == b'\r' || c == b'=' || c == b';' || scan::is_hdr_token(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_sets_to_read() {
        let mut parser = Parser::new();
        let buf = Bytes::from_static(b"1a\r\n");
        let r = chunk_size(&mut parser, &buf, 0).unwrap();
        assert_eq!(
            r,
            Scanned::Int {
                consumed: 2,
                digits: 2
            }
        );
        assert_eq!(parser.to_read, 26);
    }

    #[test]
    fn chunk_size_overflow_rejected() {
        let mut parser = Parser::new();
        let buf = Bytes::from_static(b"fffffffff\r\n");
        assert_eq!(chunk_size(&mut parser, &buf, 0), Err(Reject::BadLen));
    }

    #[test]
    fn read_span_fragments_body() {
        let mut parser = Parser::new();
        parser.to_read = 10;
        let mut body = Str::new();
        let b1 = Bytes::from_static(b"hello ");
        assert_eq!(read_span(&mut parser, &mut body, &b1, 0), 6);
        let b2 = Bytes::from_static(b"world!!!");
        assert_eq!(read_span(&mut parser, &mut body, &b2, 0), 4);
        assert_eq!(parser.to_read, 0);
        assert_eq!(body, b"hello worl"[..]);
        assert_eq!(body.fragment_count(), 2);
    }
}
