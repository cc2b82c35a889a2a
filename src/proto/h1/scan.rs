//! Resumable scalar sub-parsers: decimal and hex integers, literal
//! tokens. All of them read the carry first, so a token cut anywhere by
//! a buffer boundary decodes identically to the contiguous form.

use bytes::Bytes;

use crate::str::Str;

/// Sanity bound on carried bytes; longer carries are rejected rather
/// than accumulated (a hostile peer drip-feeding a single token).
const MAX_CARRY: usize = 32;

/// Sub-parser rejection. Both variants surface as `Verdict::Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reject {
    /// Invalid byte.
    Neq,
    /// Overflow, bad field width, or too much carried.
    BadLen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scanned {
    /// A delimiter was reached. `consumed` counts bytes taken from the
    /// current buffer (the delimiter excluded); `digits` counts all
    /// digits including carried ones.
    Int { consumed: usize, digits: usize },
    /// Buffer ended mid-number; the digits seen so far were carried.
    Postpone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lit {
    /// Full match; `0` holds the bytes consumed from the current buffer.
    Match(usize),
    /// Not this literal. The carry is left untouched so that the next
    /// alternative can be tried.
    Miss,
    /// Buffer ended inside the literal; the prefix was carried.
    Postpone,
}

// Byte-class maps, one cache line each.

const fn byte_map(set: &[u8]) -> [bool; 256] {
    let mut map = [false; 256];
    let mut i = 0;
    while i < set.len() {
        map[set[i] as usize] = true;
        i += 1;
    }
    map
}

/// Header field-name alphabet (RFC 7230 token).
static HDR_TOKEN: [bool; 256] = byte_map(
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz\
      !#$%&'*+-.^_`|~0123456789",
);

/// Request-target alphabet. Wider than RFC 7230 absolute-path: query
/// and fragment characters are accepted as well.
static URI_TARGET: [bool; 256] = byte_map(
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz\
      0123456789-_.~!*'();:@&=+$,/?%#[]",
);

/// X-Forwarded-For node identifier alphabet (RFC 7239).
static XFF_NODE: [bool; 256] = byte_map(
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789._-[]:",
);

pub(crate) fn is_hdr_token(c: u8) -> bool {
    HDR_TOKEN[c as usize]
}

pub(crate) fn is_uri_char(c: u8) -> bool {
    URI_TARGET[c as usize]
}

pub(crate) fn is_xff_char(c: u8) -> bool {
    XFF_NODE[c as usize]
}

/// SP HTAB LF VT FF CR.
pub(crate) fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// SP HTAB.
pub(crate) fn is_ows(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

// Delimiter sets for the decimal parser.

pub(crate) fn ws_delim(c: u8) -> bool {
    is_space(c)
}

pub(crate) fn list_delim(c: u8) -> bool {
    is_space(c) || c == b','
}

pub(crate) fn colon_delim(c: u8) -> bool {
    c == b':'
}

/// Parses a possibly carried decimal integer ending at a byte of the
/// delimiter set. The accumulator is rebuilt from the carry on every
/// call, so the caller passes a fresh zero.
pub(crate) fn dec(
    carry: &mut Str,
    buf: &Bytes,
    at: usize,
    acc: &mut u32,
    delim: fn(u8) -> bool,
) -> Result<Scanned, Reject> {
    for b in carry.bytes() {
        dec_acc(acc, b)?;
    }
    let mut i = at;
    while i < buf.len() {
        let b = buf[i];
        if delim(b) {
            break;
        }
        dec_acc(acc, b)?;
        i += 1;
    }
    if i == buf.len() {
        if carry.len() + (i - at) > MAX_CARRY {
            return Err(Reject::BadLen);
        }
        carry.push(buf.slice(at..));
        return Ok(Scanned::Postpone);
    }
    let digits = carry.len() + (i - at);
    if digits == 0 {
        return Err(Reject::BadLen);
    }
    carry.clear();
    Ok(Scanned::Int {
        consumed: i - at,
        digits,
    })
}

fn dec_acc(acc: &mut u32, b: u8) -> Result<(), Reject> {
    if !b.is_ascii_digit() {
        return Err(Reject::Neq);
    }
    if *acc > (u32::MAX - 10) / 10 {
        return Err(Reject::BadLen);
    }
    *acc = *acc * 10 + u32::from(b - b'0');
    Ok(())
}

/// Parses a possibly carried hex integer ending at whitespace or `;`
/// (RFC 7230 chunk-ext).
pub(crate) fn hex(
    carry: &mut Str,
    buf: &Bytes,
    at: usize,
    acc: &mut u32,
) -> Result<Scanned, Reject> {
    for b in carry.bytes() {
        hex_acc(acc, b)?;
    }
    let mut i = at;
    while i < buf.len() {
        let b = buf[i];
        if is_space(b) || b == b';' {
            break;
        }
        hex_acc(acc, b)?;
        i += 1;
    }
    if i == buf.len() {
        if carry.len() + (i - at) > MAX_CARRY {
            return Err(Reject::BadLen);
        }
        carry.push(buf.slice(at..));
        return Ok(Scanned::Postpone);
    }
    let digits = carry.len() + (i - at);
    if digits == 0 {
        return Err(Reject::BadLen);
    }
    carry.clear();
    Ok(Scanned::Int {
        consumed: i - at,
        digits,
    })
}

fn hex_acc(acc: &mut u32, b: u8) -> Result<(), Reject> {
    // The early threshold is shared with the decimal path; checked
    // arithmetic backstops the window it leaves open.
    if *acc > (u32::MAX - 10) / 10 {
        return Err(Reject::BadLen);
    }
    let v = match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        b'a'..=b'f' => u32::from(b - b'a' + 10),
        b'A'..=b'F' => u32::from(b - b'A' + 10),
        _ => return Err(Reject::Neq),
    };
    *acc = acc
        .checked_mul(16)
        .and_then(|a| a.checked_add(v))
        .ok_or(Reject::BadLen)?;
    Ok(())
}

/// Compares the bytes at `buf[at..]`, prefixed by the carry, against a
/// fixed literal.
pub(crate) fn literal(
    carry: &mut Str,
    buf: &Bytes,
    at: usize,
    lit: &[u8],
    ci: bool,
) -> Result<Lit, Reject> {
    let cn = carry.len();
    if cn >= lit.len() {
        return Ok(Lit::Miss);
    }
    let mut k = 0;
    for b in carry.bytes() {
        if !byte_eq(b, lit[k], ci) {
            return Ok(Lit::Miss);
        }
        k += 1;
    }
    let need = lit.len() - cn;
    let avail = buf.len() - at;
    let take = need.min(avail);
    for j in 0..take {
        if !byte_eq(buf[at + j], lit[cn + j], ci) {
            return Ok(Lit::Miss);
        }
    }
    if avail < need {
        if cn + avail > MAX_CARRY {
            return Err(Reject::BadLen);
        }
        carry.push(buf.slice(at..));
        return Ok(Lit::Postpone);
    }
    carry.clear();
    Ok(Lit::Match(need))
}

fn byte_eq(a: u8, b: u8, ci: bool) -> bool {
    if ci {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carried(parts: &[&[u8]]) -> Str {
        let mut s = Str::new();
        for p in parts {
            s.push(Bytes::copy_from_slice(p));
        }
        s
    }

    #[test]
    fn dec_simple() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b"1234 x");
        let r = dec(&mut carry, &buf, 0, &mut acc, ws_delim).unwrap();
        assert_eq!(
            r,
            Scanned::Int {
                consumed: 4,
                digits: 4
            }
        );
        assert_eq!(acc, 1234);
    }

    #[test]
    fn dec_resumes_from_carry() {
        let mut carry = Str::new();
        let mut acc = 0;
        let b1 = Bytes::from_static(b"12");
        assert_eq!(
            dec(&mut carry, &b1, 0, &mut acc, ws_delim).unwrap(),
            Scanned::Postpone
        );
        let mut acc = 0;
        let b2 = Bytes::from_static(b"34\r\n");
        let r = dec(&mut carry, &b2, 0, &mut acc, ws_delim).unwrap();
        assert_eq!(
            r,
            Scanned::Int {
                consumed: 2,
                digits: 4
            }
        );
        assert_eq!(acc, 1234);
        assert!(carry.is_empty());
    }

    #[test]
    fn dec_delimiter_first_after_carry() {
        // "5" then "\r\n": no digits in the second buffer.
        let mut carry = carried(&[b"5"]);
        let mut acc = 0;
        let b2 = Bytes::from_static(b"\r\n");
        let r = dec(&mut carry, &b2, 0, &mut acc, ws_delim).unwrap();
        assert_eq!(
            r,
            Scanned::Int {
                consumed: 0,
                digits: 1
            }
        );
        assert_eq!(acc, 5);
    }

    #[test]
    fn dec_rejects_overflow() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b"4294967296 ");
        assert_eq!(
            dec(&mut carry, &buf, 0, &mut acc, ws_delim),
            Err(Reject::BadLen)
        );
    }

    #[test]
    fn dec_rejects_empty() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b" 5");
        assert_eq!(
            dec(&mut carry, &buf, 0, &mut acc, ws_delim),
            Err(Reject::BadLen)
        );
    }

    #[test]
    fn dec_rejects_endless_digits() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b"00000000000000000000000000000000000");
        assert_eq!(
            dec(&mut carry, &buf, 0, &mut acc, ws_delim),
            Err(Reject::BadLen)
        );
    }

    #[test]
    fn list_delim_stops_at_comma() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b"30,x");
        let r = dec(&mut carry, &buf, 0, &mut acc, list_delim).unwrap();
        assert_eq!(
            r,
            Scanned::Int {
                consumed: 2,
                digits: 2
            }
        );
        assert_eq!(acc, 30);
    }

    #[test]
    fn hex_mixed_case() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b"Ff\r\n");
        let r = hex(&mut carry, &buf, 0, &mut acc).unwrap();
        assert_eq!(
            r,
            Scanned::Int {
                consumed: 2,
                digits: 2
            }
        );
        assert_eq!(acc, 255);
    }

    #[test]
    fn hex_stops_at_chunk_ext() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b"a;name=1\r\n");
        let r = hex(&mut carry, &buf, 0, &mut acc).unwrap();
        assert_eq!(
            r,
            Scanned::Int {
                consumed: 1,
                digits: 1
            }
        );
        assert_eq!(acc, 10);
    }

    #[test]
    fn hex_rejects_nine_digits() {
        let mut carry = Str::new();
        let mut acc = 0;
        let buf = Bytes::from_static(b"100000000\r\n");
        assert_eq!(hex(&mut carry, &buf, 0, &mut acc), Err(Reject::BadLen));
    }

    #[test]
    fn literal_match_and_miss() {
        let mut carry = Str::new();
        let buf = Bytes::from_static(b"close, keep-alive");
        assert_eq!(
            literal(&mut carry, &buf, 0, b"close", true).unwrap(),
            Lit::Match(5)
        );
        assert_eq!(
            literal(&mut carry, &buf, 0, b"keep-alive", true).unwrap(),
            Lit::Miss
        );
    }

    #[test]
    fn literal_carry_survives_miss() {
        // "A" | "ug ..." must still match "Aug" on the second call even
        // though "Apr" is tried (and missed) first.
        let mut carry = Str::new();
        let b1 = Bytes::from_static(b"A");
        assert_eq!(
            literal(&mut carry, &b1, 0, b"Apr", true).unwrap(),
            Lit::Postpone
        );
        let b2 = Bytes::from_static(b"ug 1994");
        assert_eq!(
            literal(&mut carry, &b2, 0, b"Apr", true).unwrap(),
            Lit::Miss
        );
        assert_eq!(
            literal(&mut carry, &b2, 0, b"Aug", true).unwrap(),
            Lit::Match(2)
        );
        assert!(carry.is_empty());
    }

    #[test]
    fn literal_byte_at_a_time() {
        let mut carry = Str::new();
        for (idx, b) in b"close".iter().enumerate() {
            let buf = Bytes::copy_from_slice(&[*b]);
            let r = literal(&mut carry, &buf, 0, b"close", true).unwrap();
            if idx < 4 {
                assert_eq!(r, Lit::Postpone);
            } else {
                assert_eq!(r, Lit::Match(1));
            }
        }
    }

    #[test]
    fn literal_case_sensitive() {
        let mut carry = Str::new();
        let buf = Bytes::from_static(b"get ");
        assert_eq!(
            literal(&mut carry, &buf, 0, b"GET ", false).unwrap(),
            Lit::Miss
        );
        assert_eq!(
            literal(&mut carry, &buf, 0, b"GET ", true).unwrap(),
            Lit::Match(4)
        );
    }
}
