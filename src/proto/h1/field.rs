//! Header-value sub-parsers shared by requests and responses, plus the
//! end-of-term / end-of-line steps every value machine funnels through.
//!
//! Common contract: a sub-parser consumes from the value start `at` up
//! to and including the terminating LF and reports the bytes consumed
//! (relative to `at`), or postpones having consumed the whole buffer,
//! or rejects. The interior state lives in `Parser::inner` and survives
//! suspension.

use bytes::Bytes;

use super::parse::{Inner, Parser};
use super::scan::{self, Reject, Scanned};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    /// Value complete; bytes consumed from the value start, LF included.
    Done(usize),
    /// Buffer exhausted mid-value.
    Postpone,
}

pub(crate) type FieldResult = Result<Field, Reject>;

/// Terminal run of a header line: optional spaces and CRs, then LF.
/// Fixes the header-line end the first time it is entered.
pub(crate) fn eol(parser: &mut Parser, buf: &Bytes, mut i: usize, at: usize) -> FieldResult {
    parser.mark_line_end(i - at);
    loop {
        if i >= buf.len() {
            return Ok(Field::Postpone);
        }
        let c = buf[i];
        if c == b'\n' {
            return Ok(Field::Done(i + 1 - at));
        }
        if scan::is_space(c) {
            i += 1;
            continue;
        }
        return Err(Reject::Neq);
    }
}

/// Outcome of the end-of-term step between list tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Term {
    /// Next token starts here.
    Token(usize),
    /// A `=` introduced a value for an ignored token; skip it.
    Ext(usize),
    /// The end-of-line run starts here.
    Eol(usize),
    Postpone,
}

/// Separator between list tokens: SP and `,` runs, optionally a `=`
/// (ignored token values), a token byte restarting recognition, or the
/// end-of-line run.
pub(crate) fn eot(buf: &[u8], mut i: usize, eq_ext: bool) -> Result<Term, Reject> {
    loop {
        if i >= buf.len() {
            return Ok(Term::Postpone);
        }
        let c = buf[i];
        if c == b' ' || c == b',' {
            i += 1;
            continue;
        }
        if eq_ext && c == b'=' {
            return Ok(Term::Ext(i + 1));
        }
        if scan::is_hdr_token(c) {
            return Ok(Term::Token(i));
        }
        if !scan::is_space(c) {
            return Err(Reject::Neq);
        }
        return Ok(Term::Eol(i));
    }
}

/// Outcome of skipping an unrecognized list token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sep {
    Eot(usize),
    Eol(usize),
    Postpone,
}

/// Skips an unrecognized token up to the next `,` or end of line.
pub(crate) fn ext(buf: &[u8], i: usize) -> Sep {
    let rem = &buf[i..];
    let lf = rem.iter().position(|&b| b == b'\n');
    let comma = rem.iter().position(|&b| b == b',');
    match (comma, lf) {
        (Some(c), Some(l)) if c < l => Sep::Eot(i + c),
        (Some(c), None) => Sep::Eot(i + c),
        (_, Some(l)) => Sep::Eol(i + l),
        (None, None) => Sep::Postpone,
    }
}

/// `Connection` (RFC 7230 6.1): recognizes `close` and `keep-alive`,
/// which are mutually exclusive; anything else is skipped.
pub(crate) fn connection(parser: &mut Parser, buf: &Bytes, at: usize) -> FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::Conn => {
                try_str!(parser, buf, i, b"close", {
                    if parser.conn_ka {
                        return Err(Reject::Neq);
                    }
                    parser.conn_close = true;
                    i_enter!(parser, buf, i, Inner::ConnEot);
                });
                try_str!(parser, buf, i, b"keep-alive", {
                    if parser.conn_close {
                        return Err(Reject::Neq);
                    }
                    parser.conn_ka = true;
                    i_enter!(parser, buf, i, Inner::ConnEot);
                });
                // Other connection tokens, e.g. "TE" or names of custom
                // hop-by-hop headers.
                i_jmp!(parser, Inner::ConnOther);
            }
            Inner::ConnOther => match ext(buf, i) {
                Sep::Eot(j) => {
                    i = j;
                    i_jmp!(parser, Inner::ConnEot);
                }
                Sep::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::ConnEol);
                }
                Sep::Postpone => return Ok(Field::Postpone),
            },
            Inner::ConnEot => match eot(buf, i, false)? {
                Term::Token(j) => {
                    i = j;
                    i_jmp!(parser, Inner::Conn);
                }
                Term::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::ConnEol);
                }
                Term::Postpone => return Ok(Field::Postpone),
                Term::Ext(_) => return Err(Reject::Neq),
            },
            Inner::ConnEol => return eol(parser, buf, i, at),
            _ => unreachable!("connection sub-parser entered in {:?}", parser.inner),
        }
    }
}

/// `Content-Length` (RFC 7230 3.3.2): a single decimal integer. The
/// whitespace-only delimiter set makes comma-separated values reject.
pub(crate) fn content_length(
    parser: &mut Parser,
    buf: &Bytes,
    at: usize,
    out: &mut u32,
) -> FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::ContLen => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::ws_delim)? {
                    Scanned::Int { consumed, .. } => {
                        *out = acc;
                        i += consumed;
                        i_enter!(parser, buf, i, Inner::ContLenEol);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ContLenEol => return eol(parser, buf, i, at),
            _ => unreachable!("content-length sub-parser entered in {:?}", parser.inner),
        }
    }
}

/// `Transfer-Encoding` (RFC 7230 3.3.1): recognizes `chunked` as the
/// final coding; unknown codings are skipped.
pub(crate) fn transfer_encoding(parser: &mut Parser, buf: &Bytes, at: usize) -> FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::TransEncod => {
                try_str!(parser, buf, i, b"chunked", {
                    parser.chunked = true;
                    i_enter!(parser, buf, i, Inner::TransEncodEol);
                });
                i_jmp!(parser, Inner::TransEncodExt);
            }
            Inner::TransEncodExt => match ext(buf, i) {
                Sep::Eot(j) => {
                    i = j;
                    i_jmp!(parser, Inner::TransEncodEot);
                }
                Sep::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::TransEncodEol);
                }
                Sep::Postpone => return Ok(Field::Postpone),
            },
            Inner::TransEncodEot => match eot(buf, i, false)? {
                Term::Token(j) => {
                    i = j;
                    i_jmp!(parser, Inner::TransEncod);
                }
                Term::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::TransEncodEol);
                }
                Term::Postpone => return Ok(Field::Postpone),
                Term::Ext(_) => return Err(Reject::Neq),
            },
            Inner::TransEncodEol => return eol(parser, buf, i, at),
            _ => unreachable!("transfer-encoding sub-parser entered in {:?}", parser.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(start: Inner) -> Parser {
        let mut p = Parser::new();
        p.inner = start;
        p
    }

    #[test]
    fn connection_close() {
        let mut p = parser(Inner::Conn);
        let buf = Bytes::from_static(b"close\r\nX");
        assert_eq!(connection(&mut p, &buf, 0), Ok(Field::Done(7)));
        assert!(p.conn_close);
        assert!(!p.conn_ka);
    }

    #[test]
    fn connection_conflict_rejected() {
        let mut p = parser(Inner::Conn);
        let buf = Bytes::from_static(b"close, keep-alive\r\n");
        assert_eq!(connection(&mut p, &buf, 0), Err(Reject::Neq));
    }

    #[test]
    fn connection_unknown_tokens_skipped() {
        let mut p = parser(Inner::Conn);
        let buf = Bytes::from_static(b"TE, keep-alive\r\n");
        assert_eq!(connection(&mut p, &buf, 0), Ok(Field::Done(16)));
        assert!(p.conn_ka);
    }

    #[test]
    fn connection_byte_at_a_time() {
        let raw = b"keep-alive\r\n";
        let mut p = parser(Inner::Conn);
        let mut total = 0;
        for (idx, b) in raw.iter().enumerate() {
            let buf = Bytes::copy_from_slice(&[*b]);
            match connection(&mut p, &buf, 0).unwrap() {
                Field::Postpone => {
                    p.value_len += 1;
                    assert!(idx < raw.len() - 1);
                }
                Field::Done(n) => {
                    total = p.value_len + n;
                    assert_eq!(idx, raw.len() - 1);
                }
            }
        }
        assert_eq!(total, raw.len());
        assert!(p.conn_ka);
    }

    #[test]
    fn content_length_trailing_ows() {
        let mut p = parser(Inner::ContLen);
        let mut out = 0;
        let buf = Bytes::from_static(b"42  \r\n");
        assert_eq!(content_length(&mut p, &buf, 0, &mut out), Ok(Field::Done(6)));
        assert_eq!(out, 42);
    }

    #[test]
    fn content_length_rejects_list() {
        let mut p = parser(Inner::ContLen);
        let mut out = 0;
        let buf = Bytes::from_static(b"5,5\r\n");
        assert_eq!(
            content_length(&mut p, &buf, 0, &mut out),
            Err(Reject::Neq)
        );
    }

    #[test]
    fn transfer_encoding_chunked() {
        let mut p = parser(Inner::TransEncod);
        let buf = Bytes::from_static(b"chunked\r\n");
        assert_eq!(transfer_encoding(&mut p, &buf, 0), Ok(Field::Done(9)));
        assert!(p.chunked);
    }

    #[test]
    fn transfer_encoding_unknown_coding_skipped() {
        let mut p = parser(Inner::TransEncod);
        let buf = Bytes::from_static(b"gzip\r\n");
        assert_eq!(transfer_encoding(&mut p, &buf, 0), Ok(Field::Done(6)));
        assert!(!p.chunked);
    }
}
