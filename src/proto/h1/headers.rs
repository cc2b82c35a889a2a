//! The per-message header table.

use crate::str::Str;

/// Initial capacity of the raw-header area.
const RAW_INIT: usize = 16;

/// Default ceiling on raw-header slots.
pub(crate) const DEFAULT_MAX_RAW_HEADERS: usize = 1024;

/// Where a finished header line is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A fixed, compile-time index for a recognized header.
    Known(usize),
    /// The growable area for everything else.
    Raw,
}

/// Indexed storage for the header lines of one message.
///
/// Recognized headers land in fixed slots so the next layer can fetch
/// them without scanning; every other header is appended, in wire
/// order, to the raw area. Each stored line covers `name ":" OWS value`
/// with the terminating CR LF removed, and borrows the input buffers
/// (see [`Str`]).
///
/// The raw area grows by doubling. Growth past the configured maximum
/// is refused: the header is dropped, [`overflowed`] is set, and
/// parsing continues.
///
/// [`overflowed`]: HeaderTable::overflowed
#[derive(Debug)]
pub struct HeaderTable {
    known: Vec<Str>,
    raw: Vec<Str>,
    raw_cap: usize,
    raw_max: usize,
    overflowed: bool,
}

impl HeaderTable {
    pub(crate) fn new(known: usize, raw_max: usize) -> HeaderTable {
        HeaderTable {
            known: vec![Str::new(); known],
            raw: Vec::with_capacity(RAW_INIT),
            raw_cap: RAW_INIT,
            raw_max,
            overflowed: false,
        }
    }

    /// The known-index slots. Indices are published as associated
    /// constants on `Request` and `Response`; an absent header is an
    /// empty string.
    pub fn known(&self) -> &[Str] {
        &self.known
    }

    /// Unrecognized header lines, in wire order.
    pub fn raw(&self) -> &[Str] {
        &self.raw
    }

    /// Whether a raw header was dropped because the table refused to
    /// grow past its configured maximum.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub(crate) fn close(&mut self, slot: Slot, line: Str) {
        match slot {
            Slot::Known(idx) => {
                if self.known[idx].is_empty() {
                    self.known[idx] = line;
                } else {
                    // Duplicate of a recognized header: aggregate the
                    // fragments into the existing slot.
                    self.known[idx].append(line);
                }
            }
            Slot::Raw => self.push_raw(line),
        }
    }

    fn push_raw(&mut self, line: Str) {
        if self.raw.len() == self.raw_cap {
            let next = self.raw_cap * 2;
            if next > self.raw_max {
                warning!("header table full ({} raw slots), header dropped", self.raw_cap);
                self.overflowed = true;
                return;
            }
            self.raw.reserve_exact(self.raw_cap);
            self.raw_cap = next;
        }
        self.raw.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn line(s: &[u8]) -> Str {
        let mut v = Str::new();
        v.push(Bytes::copy_from_slice(s));
        v
    }

    #[test]
    fn known_slot_and_raw_area() {
        let mut t = HeaderTable::new(3, 64);
        t.close(Slot::Known(1), line(b"Host: a"));
        t.close(Slot::Raw, line(b"X-Custom: 1"));
        t.close(Slot::Raw, line(b"X-Custom: 2"));
        assert_eq!(t.known()[1], b"Host: a"[..]);
        assert!(t.known()[0].is_empty());
        assert_eq!(t.raw().len(), 2);
        assert_eq!(t.raw()[1], b"X-Custom: 2"[..]);
    }

    #[test]
    fn duplicate_known_header_aggregates() {
        let mut t = HeaderTable::new(1, 64);
        t.close(Slot::Known(0), line(b"Host: a"));
        t.close(Slot::Known(0), line(b"Host: b"));
        assert_eq!(t.known()[0], b"Host: aHost: b"[..]);
    }

    #[test]
    fn raw_area_grows_by_doubling_up_to_max() {
        let mut t = HeaderTable::new(0, 32);
        for i in 0..40 {
            t.close(Slot::Raw, line(format!("H{}: v", i).as_bytes()));
        }
        assert_eq!(t.raw().len(), 32);
        assert!(t.overflowed());
    }
}
