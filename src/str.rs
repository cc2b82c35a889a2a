//! Chunked strings: logical byte strings over borrowed input buffers.

use bytes::{Bytes, BytesMut};
use std::fmt;

/// A logical byte string assembled from one or more fragments of the
/// input buffers fed to the parser.
///
/// A `Str` is *plain* while it fits in a single input buffer and becomes
/// *compound* when the underlying field spanned a buffer boundary. The
/// fragments are refcounted slices ([`Bytes`]), so the parsed message
/// keeps the relevant input buffers alive without copying payload bytes.
///
/// Finalized strings never contain an empty fragment, and the total
/// length always equals the sum of the fragment lengths.
#[derive(Clone, Default)]
pub struct Str {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Empty,
    Plain(Bytes),
    Compound(Vec<Bytes>),
}

impl Default for Repr {
    fn default() -> Repr {
        Repr::Empty
    }
}

impl Str {
    /// An empty string.
    pub const fn new() -> Str {
        Str { repr: Repr::Empty }
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        match self.repr {
            Repr::Empty => 0,
            Repr::Plain(ref b) => b.len(),
            Repr::Compound(ref v) => v.iter().map(Bytes::len).sum(),
        }
    }

    /// Whether the string has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fragments.
    pub fn fragment_count(&self) -> usize {
        match self.repr {
            Repr::Empty => 0,
            Repr::Plain(_) => 1,
            Repr::Compound(ref v) => v.len(),
        }
    }

    /// The fragments, in order.
    pub fn fragments(&self) -> &[Bytes] {
        match self.repr {
            Repr::Empty => &[],
            Repr::Plain(ref b) => std::slice::from_ref(b),
            Repr::Compound(ref v) => v,
        }
    }

    /// Iterates over the bytes of all fragments.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.fragments().iter().flat_map(|f| f.iter().copied())
    }

    /// First byte, if any.
    pub(crate) fn first(&self) -> Option<u8> {
        self.bytes().next()
    }

    /// Appends a fragment. Empty fragments are dropped.
    pub(crate) fn push(&mut self, frag: Bytes) {
        if frag.is_empty() {
            return;
        }
        let repr = std::mem::take(&mut self.repr);
        self.repr = match repr {
            Repr::Empty => Repr::Plain(frag),
            Repr::Plain(first) => Repr::Compound(vec![first, frag]),
            Repr::Compound(mut v) => {
                v.push(frag);
                Repr::Compound(v)
            }
        };
    }

    /// Appends all fragments of `other`.
    pub(crate) fn append(&mut self, other: Str) {
        match other.repr {
            Repr::Empty => {}
            Repr::Plain(b) => self.push(b),
            Repr::Compound(v) => {
                for b in v {
                    self.push(b);
                }
            }
        }
    }

    /// Drops all fragments.
    pub(crate) fn clear(&mut self) {
        self.repr = Repr::Empty;
    }

    /// Shortens the string to `len` bytes, dropping or shrinking tail
    /// fragments. A compound that collapses to one fragment becomes
    /// plain again.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        let repr = std::mem::take(&mut self.repr);
        self.repr = match repr {
            Repr::Empty => Repr::Empty,
            Repr::Plain(mut b) => {
                b.truncate(len);
                if b.is_empty() {
                    Repr::Empty
                } else {
                    Repr::Plain(b)
                }
            }
            Repr::Compound(mut v) => {
                let mut kept = 0;
                let mut i = 0;
                while i < v.len() {
                    let flen = v[i].len();
                    if kept + flen >= len {
                        v[i].truncate(len - kept);
                        break;
                    }
                    kept += flen;
                    i += 1;
                }
                v.truncate(i + 1);
                v.retain(|f| !f.is_empty());
                collapse(v)
            }
        };
    }

    /// Strips any run of trailing `byte`s.
    pub(crate) fn trim_trailing(&mut self, byte: u8) {
        loop {
            let len = self.len();
            let trailing = self
                .fragments()
                .last()
                .map(|f| f.iter().rev().take_while(|&&b| b == byte).count())
                .unwrap_or(0);
            if trailing == 0 {
                return;
            }
            self.truncate(len - trailing);
        }
    }

    /// Zero-copy sub-string of `len` bytes starting at `start`.
    pub(crate) fn substr(&self, start: usize, len: usize) -> Str {
        let mut out = Str::new();
        let mut pos = 0;
        for frag in self.fragments() {
            let fstart = start.max(pos).min(pos + frag.len());
            let fend = (start + len).max(pos).min(pos + frag.len());
            if fend > fstart {
                out.push(frag.slice(fstart - pos..fend - pos));
            }
            pos += frag.len();
        }
        out
    }

    /// Copies the string into a single contiguous `Bytes`.
    ///
    /// Plain strings are returned without copying.
    pub fn to_bytes(&self) -> Bytes {
        match self.repr {
            Repr::Empty => Bytes::new(),
            Repr::Plain(ref b) => b.clone(),
            Repr::Compound(ref v) => {
                let mut out = BytesMut::with_capacity(self.len());
                for frag in v {
                    out.extend_from_slice(frag);
                }
                out.freeze()
            }
        }
    }

    /// Case-insensitive comparison against a contiguous byte string.
    pub fn eq_ignore_ascii_case(&self, other: &[u8]) -> bool {
        self.len() == other.len()
            && self
                .bytes()
                .zip(other.iter())
                .all(|(a, &b)| a.eq_ignore_ascii_case(&b))
    }
}

fn collapse(mut v: Vec<Bytes>) -> Repr {
    match v.len() {
        0 => Repr::Empty,
        1 => Repr::Plain(v.remove(0)),
        _ => Repr::Compound(v),
    }
}

impl PartialEq<[u8]> for Str {
    fn eq(&self, other: &[u8]) -> bool {
        self.len() == other.len() && self.bytes().zip(other.iter()).all(|(a, &b)| a == b)
    }
}

impl PartialEq<Str> for Str {
    fn eq(&self, other: &Str) -> bool {
        self.len() == other.len() && self.bytes().zip(other.bytes()).all(|(a, b)| a == b)
    }
}

impl Eq for Str {}

impl fmt::Debug for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"")?;
        for b in self.bytes() {
            for esc in std::ascii::escape_default(b) {
                fmt::Write::write_char(f, esc as char)?;
            }
        }
        write!(f, "\"")
    }
}

/// Tracks the open fragment of a field that is still being parsed.
///
/// Closed fragments of the field live in `acc`; the fragment currently
/// being extended is just a start offset into the buffer the parser is
/// working on. Suspending at a buffer boundary closes the open fragment
/// at the end of the buffer; resuming reopens it at the resume offset.
#[derive(Debug, Default)]
pub(crate) struct StrBuilder {
    acc: Str,
    committed: usize,
    open: Option<usize>,
    active: bool,
}

impl StrBuilder {
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn committed(&self) -> usize {
        self.committed
    }

    pub(crate) fn open_start(&self) -> usize {
        self.open.unwrap_or(0)
    }

    /// Starts a new field at `at` in the current buffer.
    pub(crate) fn begin(&mut self, at: usize) {
        debug_assert!(!self.active, "field already open");
        self.active = true;
        self.open = Some(at);
    }

    /// Reopens the in-progress field at `at` after a suspension.
    pub(crate) fn reopen(&mut self, at: usize) {
        if self.active {
            debug_assert!(self.open.is_none(), "field not suspended");
            self.open = Some(at);
        }
    }

    /// Closes the open fragment at the end of `buf`. The field stays
    /// active and is reopened by the next `reopen` call.
    pub(crate) fn suspend(&mut self, buf: &Bytes) {
        if let Some(start) = self.open.take() {
            if buf.len() > start {
                self.acc.push(buf.slice(start..));
                self.committed += buf.len() - start;
            }
        }
    }

    /// Finalizes the field, closing the open fragment at `end`. If the
    /// open fragment would be empty it is dropped, collapsing a
    /// two-fragment compound back into a plain string.
    pub(crate) fn finish(&mut self, buf: &Bytes, end: usize) -> Str {
        if let Some(start) = self.open.take() {
            if end > start {
                self.acc.push(buf.slice(start..end));
            }
        }
        self.active = false;
        self.committed = 0;
        std::mem::take(&mut self.acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(parts: &[&[u8]]) -> Str {
        let mut out = Str::new();
        for p in parts {
            out.push(Bytes::copy_from_slice(p));
        }
        out
    }

    #[test]
    fn push_skips_empty_fragments() {
        let v = s(&[b"foo", b"", b"bar"]);
        assert_eq!(v.fragment_count(), 2);
        assert_eq!(v, b"foobar"[..]);
    }

    #[test]
    fn truncate_collapses_to_plain() {
        let mut v = s(&[b"foo", b"bar"]);
        v.truncate(3);
        assert_eq!(v.fragment_count(), 1);
        assert_eq!(v, b"foo"[..]);
        v.truncate(0);
        assert!(v.is_empty());
        assert_eq!(v.fragment_count(), 0);
    }

    #[test]
    fn truncate_mid_fragment() {
        let mut v = s(&[b"ab", b"cdef"]);
        v.truncate(4);
        assert_eq!(v, b"abcd"[..]);
        assert_eq!(v.fragment_count(), 2);
    }

    #[test]
    fn trim_trailing_spans_fragments() {
        let mut v = s(&[b"a\r", b"\r", b"\r"]);
        v.trim_trailing(b'\r');
        assert_eq!(v, b"a"[..]);
        assert_eq!(v.fragment_count(), 1);
    }

    #[test]
    fn substr_spans_fragments() {
        let v = s(&[b"Host", b": ex", b"ample:80"]);
        assert_eq!(v.substr(6, 7), b"example"[..]);
        assert_eq!(v.substr(14, 2), b"80"[..]);
        assert_eq!(v.substr(0, 4), b"Host"[..]);
    }

    #[test]
    fn eq_ignore_case() {
        let v = s(&[b"Keep-", b"Alive"]);
        assert!(v.eq_ignore_ascii_case(b"keep-alive"));
        assert!(!v.eq_ignore_ascii_case(b"keep-aliv"));
    }

    #[test]
    fn builder_suspend_resume() {
        let b1 = Bytes::from_static(b"Host: exa");
        let b2 = Bytes::from_static(b"mple\r\n");
        let mut fb = StrBuilder::default();
        fb.begin(0);
        fb.suspend(&b1);
        assert!(fb.is_active());
        assert_eq!(fb.committed(), 9);
        fb.reopen(0);
        let v = fb.finish(&b2, 4);
        assert_eq!(v, b"Host: example"[..]);
        assert_eq!(v.fragment_count(), 2);
        assert!(!fb.is_active());
    }

    #[test]
    fn builder_empty_tail_collapses() {
        let b1 = Bytes::from_static(b"abc");
        let b2 = Bytes::from_static(b"\r\n");
        let mut fb = StrBuilder::default();
        fb.begin(0);
        fb.suspend(&b1);
        fb.reopen(0);
        // Field ended exactly at the previous buffer boundary.
        let v = fb.finish(&b2, 0);
        assert_eq!(v.fragment_count(), 1);
        assert_eq!(v, b"abc"[..]);
    }
}
