//! The per-message parser state block and machinery shared by the
//! request and response drivers.

use bytes::Bytes;

use crate::error::{Error, Parse};
use crate::str::{Str, StrBuilder};

/// States of the interior (header-value) sub-machines.
///
/// One flat set serves every sub-parser; a message parses at most one
/// header value at a time, so a single slot in [`Parser`] suffices, and
/// preserving it across a suspension resumes the sub-machine exactly
/// where the buffer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inner {
    None,
    // Connection
    Conn,
    ConnOther,
    ConnEot,
    ConnEol,
    // Content-Length
    ContLen,
    ContLenEol,
    // Transfer-Encoding
    TransEncod,
    TransEncodExt,
    TransEncodEot,
    TransEncodEol,
    // Host
    Host,
    HostPort,
    HostEol,
    // Cache-Control (request)
    ReqCc,
    ReqCcMaxAge,
    ReqCcMinFresh,
    ReqCcExt,
    ReqCcEot,
    ReqCcEol,
    // X-Forwarded-For
    Xff,
    XffNodeId,
    XffSep,
    XffEol,
    // Cache-Control (response)
    RespCc,
    RespCcMaxAge,
    RespCcSMaxAge,
    RespCcExt,
    RespCcEot,
    RespCcEol,
    // Expires
    Expires,
    ExpDate,
    ExpMonth,
    ExpYearSp,
    ExpYear,
    ExpHour,
    ExpMin,
    ExpSec,
    ExpGmt,
    ExpEol,
    // Keep-Alive
    KeepAlive,
    KeepAliveTmo,
    KeepAliveExt,
    KeepAliveEot,
    KeepAliveEol,
}

impl Default for Inner {
    fn default() -> Inner {
        Inner::None
    }
}

/// Per-message parser state.
///
/// Everything needed to resume after a buffer boundary lives here; no
/// parsing state survives on the call stack across a suspension.
#[derive(Debug, Default)]
pub(crate) struct Parser {
    /// Interior sub-parser state.
    pub(crate) inner: Inner,
    /// Prefix of a token cut by a buffer boundary.
    pub(crate) carry: Str,
    /// The header line (or request-target piece) currently being read.
    pub(crate) field: StrBuilder,
    /// Bytes still to read of the current body chunk.
    pub(crate) to_read: u32,
    /// Bytes still to skip blindly (the ` GMT` tail of an Expires value).
    pub(crate) skip: u8,

    // Flags.
    pub(crate) lws_cr: bool,
    pub(crate) lws_lf: bool,
    pub(crate) conn_close: bool,
    pub(crate) conn_ka: bool,
    pub(crate) chunked: bool,
    pub(crate) body_started: bool,
    /// Expires scratch: the parsed month is past February.
    pub(crate) exp_past_feb: bool,

    // Header-line accounting. `line_base` is the length of the line up
    // to the start of the value; `value_len` counts value bytes consumed
    // in earlier buffers; `line_end` is the total line length, fixed
    // once the end-of-line run is reached.
    pub(crate) line_base: usize,
    pub(crate) value_len: usize,
    pub(crate) line_end: Option<usize>,
    /// Value-relative end of the host part of a Host header.
    pub(crate) mark: Option<usize>,
    /// Value-relative end of the port part of a Host header.
    pub(crate) mark2: Option<usize>,

    /// Bytes of the last buffer consumed by the most recent `parse` call.
    pub(crate) data_off: usize,
    resume_off: usize,
    done: bool,
    error: Option<Error>,
}

impl Parser {
    pub(crate) fn new() -> Parser {
        Parser::default()
    }

    /// Offset to start at in the next buffer, normally zero. Set by
    /// `inherit` when a pipelined message begins mid-buffer.
    pub(crate) fn take_resume(&mut self) -> usize {
        std::mem::replace(&mut self.resume_off, 0)
    }

    pub(crate) fn inherit(&mut self, prior: &Parser) {
        self.resume_off = prior.data_off;
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Suspends at the end of `buf`: the open field fragment is closed
    /// and the whole buffer is accounted as consumed.
    pub(crate) fn suspend(&mut self, buf: &Bytes) {
        self.field.suspend(buf);
        self.data_off = buf.len();
    }

    pub(crate) fn finish_pass(&mut self, off: usize) {
        self.data_off = off;
        self.done = true;
    }

    pub(crate) fn fail(&mut self, at: usize, kind: Parse) {
        self.data_off = at;
        self.done = true;
        if self.error.is_none() {
            self.error = Some(Error::new(kind));
        }
    }

    /// Enters a header-value sub-machine: `p` is the value start in the
    /// current buffer, with the line's name part already collected by
    /// the open field.
    pub(crate) fn begin_value(&mut self, p: usize, start: Inner) {
        self.inner = start;
        self.line_base = self.field.committed() + (p - self.field.open_start());
        self.value_len = 0;
        self.line_end = None;
        self.mark = None;
        self.mark2 = None;
    }

    /// Fixes the header-line length the first time the end-of-line run
    /// is reached. `rel` is relative to the value start of the current
    /// call.
    pub(crate) fn mark_line_end(&mut self, rel: usize) {
        if self.line_end.is_none() {
            self.line_end = Some(self.line_base + self.value_len + rel);
        }
    }

    /// Closes the header line of a completed value: the stored slot
    /// covers `name ":" OWS value` with the CR LF trimmed.
    pub(crate) fn close_line(&mut self, buf: &Bytes) -> Str {
        let total = match self.line_end.take() {
            Some(t) => t,
            None => self.line_base + self.value_len,
        };
        let committed = self.field.committed();
        let open = self.field.open_start();
        let end = if total >= committed {
            open + (total - committed)
        } else {
            open
        };
        let mut line = self.field.finish(buf, end);
        line.truncate(total);
        line.trim_trailing(b'\r');
        self.inner = Inner::None;
        self.line_base = 0;
        self.value_len = 0;
        line
    }

    /// Closes the open field at `end` in the current buffer (request
    /// target pieces, raw header lines).
    pub(crate) fn take_field(&mut self, buf: &Bytes, end: usize) -> Str {
        self.field.finish(buf, end)
    }
}

/// One step of the shared `OWS / obs-fold` transition after a header
/// name's colon. At most one CR LF pair is accepted; the value must
/// start with an alphanumeric byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LwsStep {
    Stay,
    Next,
    Reject,
}

pub(crate) fn lws_step(parser: &mut Parser, c: u8) -> LwsStep {
    match c {
        b'\r' => {
            if !parser.lws_cr && !parser.lws_lf {
                parser.lws_cr = true;
                LwsStep::Stay
            } else {
                LwsStep::Reject
            }
        }
        b'\n' => {
            if !parser.lws_lf {
                parser.lws_lf = true;
                LwsStep::Stay
            } else {
                LwsStep::Reject
            }
        }
        b' ' | b'\t' => LwsStep::Stay,
        _ => {
            if c.is_ascii_alphanumeric() {
                parser.lws_cr = false;
                parser.lws_lf = false;
                LwsStep::Next
            } else {
                LwsStep::Reject
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lws_accepts_one_crlf() {
        let mut p = Parser::new();
        assert_eq!(lws_step(&mut p, b' '), LwsStep::Stay);
        assert_eq!(lws_step(&mut p, b'\r'), LwsStep::Stay);
        assert_eq!(lws_step(&mut p, b'\n'), LwsStep::Stay);
        assert_eq!(lws_step(&mut p, b'\t'), LwsStep::Stay);
        assert_eq!(lws_step(&mut p, b'\r'), LwsStep::Reject);
    }

    #[test]
    fn lws_rejects_double_lf() {
        let mut p = Parser::new();
        assert_eq!(lws_step(&mut p, b'\n'), LwsStep::Stay);
        assert_eq!(lws_step(&mut p, b'\n'), LwsStep::Reject);
    }

    #[test]
    fn lws_value_must_start_alnum() {
        let mut p = Parser::new();
        assert_eq!(lws_step(&mut p, b'/'), LwsStep::Reject);
        assert_eq!(lws_step(&mut p, b'5'), LwsStep::Next);
        assert!(!p.lws_cr && !p.lws_lf);
    }

    #[test]
    fn line_accounting_across_buffers() {
        let b1 = Bytes::from_static(b"Host: ab");
        let b2 = Bytes::from_static(b"c\r\n");
        let mut p = Parser::new();
        p.field.begin(0);
        p.begin_value(6, Inner::Host);
        assert_eq!(p.line_base, 6);
        // First buffer ends mid-value.
        p.value_len += b1.len() - 6;
        p.suspend(&b1);
        p.field.reopen(0);
        // Value ends one byte into the second buffer.
        p.mark_line_end(1);
        let line = p.close_line(&b2);
        assert_eq!(line, b"Host: abc"[..]);
    }
}
