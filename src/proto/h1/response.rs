//! HTTP/1 response parsing: status line, header dispatch, body framing.

use bytes::Bytes;
use http::Version;

use super::date;
use super::decode;
use super::field::{self, eol, Field};
use super::headers::{HeaderTable, Slot, DEFAULT_MAX_RAW_HEADERS};
use super::parse::{self, Inner, LwsStep, Parser};
use super::scan::{self, Scanned};
use super::CacheControl;
use crate::error::{Error, Parse};
use crate::proto::Verdict;
use crate::str::Str;

/// Main response parser states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
enum RespState {
    Start,
    HttpVer,
    HttpVerT1,
    HttpVerT2,
    HttpVerP,
    HttpVerSlash,
    HttpVerMajor,
    HttpVerDot,
    HttpVerMinor,
    StatusSp,
    StatusCode,
    ReasonPhrase,
    // Headers.
    Hdr,
    Lws,
    HdrC,
    HdrCa,
    HdrCac,
    HdrCach,
    HdrCache,
    HdrCacheDash,
    HdrCacheC,
    HdrCacheCo,
    HdrCacheCon,
    HdrCacheCont,
    HdrCacheContr,
    HdrCacheContro,
    HdrCacheControl,
    HdrCacheControlV,
    HdrCo,
    HdrCon,
    HdrConn,
    HdrConne,
    HdrConnec,
    HdrConnect,
    HdrConnecti,
    HdrConnectio,
    HdrConnection,
    HdrConnectionV,
    HdrCont,
    HdrConte,
    HdrConten,
    HdrContent,
    HdrContentDash,
    HdrContentL,
    HdrContentLe,
    HdrContentLen,
    HdrContentLeng,
    HdrContentLengt,
    HdrContentLength,
    HdrContentLengthV,
    HdrE,
    HdrEx,
    HdrExp,
    HdrExpi,
    HdrExpir,
    HdrExpire,
    HdrExpires,
    HdrExpiresV,
    HdrK,
    HdrKe,
    HdrKee,
    HdrKeep,
    HdrKeepDash,
    HdrKeepA,
    HdrKeepAl,
    HdrKeepAli,
    HdrKeepAliv,
    HdrKeepAlive,
    HdrKeepAliveV,
    HdrT,
    HdrTr,
    HdrTra,
    HdrTran,
    HdrTrans,
    HdrTransf,
    HdrTransfe,
    HdrTransfer,
    HdrTransferDash,
    HdrTransferE,
    HdrTransferEn,
    HdrTransferEnc,
    HdrTransferEnco,
    HdrTransferEncod,
    HdrTransferEncodi,
    HdrTransferEncodin,
    HdrTransferEncoding,
    HdrTransferEncodingV,
    HdrOther,
    HdrDone,
    // Body.
    Body,
    BodyChunkEol,
    BodyChunkEnd,
    BodyReadChunk,
    Done,
}

/// An incoming HTTP/1 response being parsed.
///
/// The streaming contract matches [`Request`](crate::Request): feed
/// buffers in order, stop at the first terminal verdict.
#[derive(Debug)]
pub struct Response {
    version: Version,
    status: u16,
    headers: HeaderTable,
    body: Str,
    content_length: u32,
    cache_ctl: CacheControl,
    expires: u32,
    keep_alive: u32,
    state: RespState,
    lws_next: RespState,
    parser: Parser,
}

impl Response {
    /// Known-header slot of the `Cache-Control` line.
    pub const HDR_CACHE_CONTROL: usize = 0;
    /// Known-header slot of the `Expires` line.
    pub const HDR_EXPIRES: usize = 1;
    /// Known-header slot of the `Keep-Alive` line.
    pub const HDR_KEEP_ALIVE: usize = 2;
    const KNOWN: usize = 3;

    /// Creates an empty response with the default raw-header ceiling.
    pub fn new() -> Response {
        Response::with_max_raw_headers(DEFAULT_MAX_RAW_HEADERS)
    }

    /// Creates an empty response whose raw-header area refuses to grow
    /// past `max` slots.
    pub fn with_max_raw_headers(max: usize) -> Response {
        Response {
            version: Version::HTTP_11,
            status: 0,
            headers: HeaderTable::new(Response::KNOWN, max),
            body: Str::new(),
            content_length: 0,
            cache_ctl: CacheControl::default(),
            expires: 0,
            keep_alive: 0,
            state: RespState::Start,
            lws_next: RespState::Hdr,
            parser: Parser::new(),
        }
    }

    /// Protocol version of the status line.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// The 3-digit status code.
    #[inline]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The header table.
    #[inline]
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Message-body bytes (chunk framing excluded).
    #[inline]
    pub fn body(&self) -> &Str {
        &self.body
    }

    /// Decoded `Content-Length`, zero if absent.
    #[inline]
    pub fn content_length(&self) -> u32 {
        self.content_length
    }

    /// Decoded `Cache-Control` directives.
    #[inline]
    pub fn cache_control(&self) -> &CacheControl {
        &self.cache_ctl
    }

    /// `Expires` as seconds since the Unix epoch, zero if absent.
    #[inline]
    pub fn expires(&self) -> u32 {
        self.expires
    }

    /// `Keep-Alive: timeout=N`, zero if absent.
    #[inline]
    pub fn keep_alive(&self) -> u32 {
        self.keep_alive
    }

    /// Whether the body uses chunked transfer encoding.
    #[inline]
    pub fn is_chunked(&self) -> bool {
        self.parser.chunked
    }

    /// Whether `Connection: close` was present.
    #[inline]
    pub fn is_conn_close(&self) -> bool {
        self.parser.conn_close
    }

    /// Whether `Connection: keep-alive` was present.
    #[inline]
    pub fn is_conn_keep_alive(&self) -> bool {
        self.parser.conn_ka
    }

    /// Bytes of the last fed buffer consumed by the parser.
    #[inline]
    pub fn data_off(&self) -> usize {
        self.parser.data_off
    }

    /// Why the response was blocked, if it was.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.parser.error()
    }

    /// Starts this response where `prior` ended inside the same buffer,
    /// for pipelined messages. Call before the first `parse`.
    pub fn inherit_offset(&mut self, prior: &Response) {
        self.parser.inherit(&prior.parser);
    }

    fn postpone(&mut self, buf: &Bytes) -> Verdict {
        trace!("response postponed in {:?}", self.state);
        self.parser.suspend(buf);
        Verdict::Postpone
    }

    fn block(&mut self, at: usize, kind: Parse) -> Verdict {
        debug!("response blocked in {:?}: {:?}", self.state, kind);
        self.parser.fail(at, kind);
        Verdict::Block
    }

    fn pass(&mut self, off: usize) -> Verdict {
        trace!("response complete, {} bytes consumed", off);
        self.parser.finish_pass(off);
        Verdict::Pass
    }

    /// Feeds the next input buffer. See [`Verdict`] for the outcomes.
    pub fn parse(&mut self, buf: &Bytes) -> Verdict {
        debug_assert!(
            !self.parser.is_done(),
            "parse called after a terminal verdict"
        );
        if self.parser.is_done() {
            return Verdict::Block;
        }
        let mut p = self.parser.take_resume();
        if p >= buf.len() {
            self.parser.data_off = buf.len();
            return Verdict::Postpone;
        }
        self.parser.field.reopen(p);
        trace!("response parse: {} bytes in {:?}", buf.len() - p, self.state);
        loop {
            let c = buf[p];
            match self.state {
                // ----------------    Status line    ----------------
                RespState::Start => {
                    if c == b'\r' || c == b'\n' {
                        mv!(self, buf, p, RespState::Start);
                    }
                    jmp!(self, RespState::HttpVer);
                }
                RespState::HttpVer => {
                    if p + 9 <= buf.len() {
                        // Fast path: version and the following SP fit.
                        let w = &buf[p..p + 8];
                        if (w == b"HTTP/1.1" || w == b"HTTP/1.0") && buf[p + 8] == b' ' {
                            self.version = if w[7] == b'1' {
                                Version::HTTP_11
                            } else {
                                Version::HTTP_10
                            };
                            mv_n!(self, buf, p, 9, RespState::StatusCode);
                        }
                        return self.block(p, Parse::Version);
                    }
                    if c == b'H' {
                        mv!(self, buf, p, RespState::HttpVerT1);
                    }
                    return self.block(p, Parse::Version);
                }
                RespState::HttpVerMinor => {
                    if c == b'1' {
                        self.version = Version::HTTP_11;
                        mv!(self, buf, p, RespState::StatusSp);
                    }
                    if c == b'0' {
                        self.version = Version::HTTP_10;
                        mv!(self, buf, p, RespState::StatusSp);
                    }
                    return self.block(p, Parse::Version);
                }
                RespState::StatusSp => {
                    if c == b' ' {
                        mv!(self, buf, p, RespState::StatusCode);
                    }
                    return self.block(p, Parse::Version);
                }
                RespState::StatusCode => {
                    let mut acc = 0;
                    match scan::dec(&mut self.parser.carry, buf, p, &mut acc, scan::list_delim) {
                        Ok(Scanned::Int { consumed, digits }) => {
                            if digits != 3 {
                                return self.block(p, Parse::Status);
                            }
                            self.status = acc as u16;
                            mv_n!(self, buf, p, consumed, RespState::ReasonPhrase);
                        }
                        Ok(Scanned::Postpone) => return self.postpone(buf),
                        Err(_) => return self.block(p, Parse::Status),
                    }
                }
                // The reason phrase carries no information; skip it.
                RespState::ReasonPhrase => match buf[p..].iter().position(|&b| b == b'\n') {
                    Some(k) => mv_n!(self, buf, p, k + 1, RespState::Hdr),
                    None => return self.postpone(buf),
                },

                // ----------------    Header lines    ----------------
                RespState::Hdr => {
                    if c == b'\r' {
                        if self.parser.body_started {
                            mv!(self, buf, p, RespState::Done);
                        }
                        mv!(self, buf, p, RespState::HdrDone);
                    }
                    if c == b'\n' {
                        if self.parser.body_started {
                            return self.pass(p + 1);
                        }
                        init_body!(self, buf, p, RespState::Body);
                    }
                    if !scan::is_hdr_token(c) {
                        return self.block(p, Parse::HeaderName);
                    }
                    self.parser.field.begin(p);
                    match c.to_ascii_lowercase() {
                        b'c' => mv!(self, buf, p, RespState::HdrC),
                        b'e' => {
                            if buf.len() >= p + 8 && buf[p..p + 8].eq_ignore_ascii_case(b"expires:")
                            {
                                self.lws_next = RespState::HdrExpiresV;
                                mv_n!(self, buf, p, 8, RespState::Lws);
                            }
                            mv!(self, buf, p, RespState::HdrE);
                        }
                        b'k' => {
                            if buf.len() >= p + 11
                                && buf[p..p + 11].eq_ignore_ascii_case(b"keep-alive:")
                            {
                                self.lws_next = RespState::HdrKeepAliveV;
                                mv_n!(self, buf, p, 11, RespState::Lws);
                            }
                            mv!(self, buf, p, RespState::HdrK);
                        }
                        b't' => {
                            if buf.len() >= p + 18
                                && buf[p..p + 18].eq_ignore_ascii_case(b"transfer-encoding:")
                            {
                                self.lws_next = RespState::HdrTransferEncodingV;
                                mv_n!(self, buf, p, 18, RespState::Lws);
                            }
                            mv!(self, buf, p, RespState::HdrT);
                        }
                        _ => jmp!(self, RespState::HdrOther),
                    }
                }
                RespState::Lws => match parse::lws_step(&mut self.parser, c) {
                    LwsStep::Stay => mv!(self, buf, p, RespState::Lws),
                    LwsStep::Next => jmp!(self, self.lws_next),
                    LwsStep::Reject => return self.block(p, Parse::HeaderName),
                },
                RespState::HdrC => {
                    if !scan::is_hdr_token(c) {
                        return self.block(p, Parse::HeaderName);
                    }
                    match c.to_ascii_lowercase() {
                        b'a' => {
                            if buf.len() >= p + 13
                                && buf[p..p + 13].eq_ignore_ascii_case(b"ache-control:")
                            {
                                self.lws_next = RespState::HdrCacheControlV;
                                mv_n!(self, buf, p, 13, RespState::Lws);
                            }
                            mv!(self, buf, p, RespState::HdrCa);
                        }
                        b'o' => {
                            if buf.len() >= p + 14
                                && buf[p..p + 14].eq_ignore_ascii_case(b"ontent-length:")
                            {
                                self.lws_next = RespState::HdrContentLengthV;
                                mv_n!(self, buf, p, 14, RespState::Lws);
                            }
                            if buf.len() >= p + 9
                                && buf[p..p + 9].eq_ignore_ascii_case(b"onnection")
                            {
                                mv_n!(self, buf, p, 9, RespState::HdrConnection);
                            }
                            mv!(self, buf, p, RespState::HdrCo);
                        }
                        _ => jmp!(self, RespState::HdrOther),
                    }
                }
                RespState::HdrCon => {
                    if !scan::is_hdr_token(c) {
                        return self.block(p, Parse::HeaderName);
                    }
                    match c.to_ascii_lowercase() {
                        b'n' => mv!(self, buf, p, RespState::HdrConn),
                        b't' => mv!(self, buf, p, RespState::HdrCont),
                        _ => mv!(self, buf, p, RespState::HdrOther),
                    }
                }

                RespState::HdrCacheControlV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::RespCc,
                    Slot::Known(Response::HDR_CACHE_CONTROL),
                    RespState::Hdr,
                    Parse::Header("cache-control"),
                    cache_control(&mut self.parser, buf, p, &mut self.cache_ctl)
                ),
                RespState::HdrConnectionV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::Conn,
                    Slot::Raw,
                    RespState::Hdr,
                    Parse::Header("connection"),
                    field::connection(&mut self.parser, buf, p)
                ),
                RespState::HdrContentLengthV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::ContLen,
                    Slot::Raw,
                    RespState::Hdr,
                    Parse::Header("content-length"),
                    field::content_length(&mut self.parser, buf, p, &mut self.content_length)
                ),
                RespState::HdrTransferEncodingV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::TransEncod,
                    Slot::Raw,
                    RespState::Hdr,
                    Parse::Header("transfer-encoding"),
                    field::transfer_encoding(&mut self.parser, buf, p)
                ),
                RespState::HdrExpiresV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::Expires,
                    Slot::Known(Response::HDR_EXPIRES),
                    RespState::Hdr,
                    Parse::Header("expires"),
                    date::expires(&mut self.parser, buf, p, &mut self.expires)
                ),
                RespState::HdrKeepAliveV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::KeepAlive,
                    Slot::Known(Response::HDR_KEEP_ALIVE),
                    RespState::Hdr,
                    Parse::Header("keep-alive"),
                    keep_alive(&mut self.parser, buf, p, &mut self.keep_alive)
                ),

                RespState::HdrOther => match buf[p..].iter().position(|&b| b == b'\n') {
                    Some(k) => {
                        let mut line = self.parser.take_field(buf, p + k);
                        line.trim_trailing(b'\r');
                        self.headers.close(Slot::Raw, line);
                        mv_n!(self, buf, p, k + 1, RespState::Hdr);
                    }
                    None => return self.postpone(buf),
                },
                RespState::HdrDone => {
                    if c == b'\n' {
                        init_body!(self, buf, p, RespState::Body);
                    }
                    return self.block(p, Parse::HeaderName);
                }

                // ----------------    Response body    ----------------
                RespState::Body => {
                    if self.parser.to_read == 0 {
                        match decode::chunk_size(&mut self.parser, buf, p) {
                            Ok(Scanned::Int { consumed, .. }) => {
                                mv_n!(self, buf, p, consumed, RespState::BodyChunkEol)
                            }
                            Ok(Scanned::Postpone) => return self.postpone(buf),
                            Err(_) => return self.block(p, Parse::Chunk),
                        }
                    }
                    jmp!(self, RespState::BodyReadChunk);
                }
                RespState::BodyChunkEol => {
                    if c == b'\n' {
                        if self.parser.to_read > 0 {
                            mv!(self, buf, p, RespState::BodyReadChunk);
                        }
                        mv!(self, buf, p, RespState::Hdr);
                    }
                    if decode::is_chunk_ext_char(c) {
                        mv!(self, buf, p, RespState::BodyChunkEol);
                    }
                    return self.block(p, Parse::Chunk);
                }
                RespState::BodyReadChunk => {
                    let mlen = decode::read_span(&mut self.parser, &mut self.body, buf, p);
                    if self.parser.to_read > 0 {
                        mv_n!(self, buf, p, mlen, RespState::BodyReadChunk);
                    }
                    if self.parser.chunked {
                        mv_n!(self, buf, p, mlen, RespState::BodyChunkEnd);
                    }
                    return self.pass(p + mlen);
                }
                RespState::BodyChunkEnd => {
                    if c == b'\n' {
                        mv!(self, buf, p, RespState::Body);
                    }
                    if c == b'\r' {
                        mv!(self, buf, p, RespState::BodyChunkEnd);
                    }
                    return self.block(p, Parse::Chunk);
                }
                RespState::Done => {
                    if c == b'\n' {
                        return self.pass(p + 1);
                    }
                    return self.block(p, Parse::Chunk);
                }

                st => {
                    if let Some((want, next)) = version_tx(st) {
                        if c == want {
                            mv!(self, buf, p, next);
                        }
                        return self.block(p, Parse::Version);
                    }
                    if let Some((want, next)) = name_tx(st) {
                        if c.to_ascii_lowercase() == want {
                            mv!(self, buf, p, next);
                        }
                        if scan::is_hdr_token(c) {
                            mv!(self, buf, p, RespState::HdrOther);
                        }
                        return self.block(p, Parse::HeaderName);
                    }
                    if let Some(target) = colon_tx(st) {
                        if c == b':' {
                            self.lws_next = target;
                            mv!(self, buf, p, RespState::Lws);
                        }
                        if scan::is_hdr_token(c) {
                            mv!(self, buf, p, RespState::HdrOther);
                        }
                        return self.block(p, Parse::HeaderName);
                    }
                    return self.block(p, Parse::Internal);
                }
            }
        }
    }
}

impl Default for Response {
    fn default() -> Response {
        Response::new()
    }
}

fn version_tx(st: RespState) -> Option<(u8, RespState)> {
    Some(match st {
        RespState::HttpVerT1 => (b'T', RespState::HttpVerT2),
        RespState::HttpVerT2 => (b'T', RespState::HttpVerP),
        RespState::HttpVerP => (b'P', RespState::HttpVerSlash),
        RespState::HttpVerSlash => (b'/', RespState::HttpVerMajor),
        RespState::HttpVerMajor => (b'1', RespState::HttpVerDot),
        RespState::HttpVerDot => (b'.', RespState::HttpVerMinor),
        _ => return None,
    })
}

fn name_tx(st: RespState) -> Option<(u8, RespState)> {
    Some(match st {
        // Cache-Control.
        RespState::HdrCa => (b'c', RespState::HdrCac),
        RespState::HdrCac => (b'h', RespState::HdrCach),
        RespState::HdrCach => (b'e', RespState::HdrCache),
        RespState::HdrCache => (b'-', RespState::HdrCacheDash),
        RespState::HdrCacheDash => (b'c', RespState::HdrCacheC),
        RespState::HdrCacheC => (b'o', RespState::HdrCacheCo),
        RespState::HdrCacheCo => (b'n', RespState::HdrCacheCon),
        RespState::HdrCacheCon => (b't', RespState::HdrCacheCont),
        RespState::HdrCacheCont => (b'r', RespState::HdrCacheContr),
        RespState::HdrCacheContr => (b'o', RespState::HdrCacheContro),
        RespState::HdrCacheContro => (b'l', RespState::HdrCacheControl),
        // Connection.
        RespState::HdrCo => (b'n', RespState::HdrCon),
        RespState::HdrConn => (b'e', RespState::HdrConne),
        RespState::HdrConne => (b'c', RespState::HdrConnec),
        RespState::HdrConnec => (b't', RespState::HdrConnect),
        RespState::HdrConnect => (b'i', RespState::HdrConnecti),
        RespState::HdrConnecti => (b'o', RespState::HdrConnectio),
        RespState::HdrConnectio => (b'n', RespState::HdrConnection),
        // Content-Length.
        RespState::HdrCont => (b'e', RespState::HdrConte),
        RespState::HdrConte => (b'n', RespState::HdrConten),
        RespState::HdrConten => (b't', RespState::HdrContent),
        RespState::HdrContent => (b'-', RespState::HdrContentDash),
        RespState::HdrContentDash => (b'l', RespState::HdrContentL),
        RespState::HdrContentL => (b'e', RespState::HdrContentLe),
        RespState::HdrContentLe => (b'n', RespState::HdrContentLen),
        RespState::HdrContentLen => (b'g', RespState::HdrContentLeng),
        RespState::HdrContentLeng => (b't', RespState::HdrContentLengt),
        RespState::HdrContentLengt => (b'h', RespState::HdrContentLength),
        // Expires.
        RespState::HdrE => (b'x', RespState::HdrEx),
        RespState::HdrEx => (b'p', RespState::HdrExp),
        RespState::HdrExp => (b'i', RespState::HdrExpi),
        RespState::HdrExpi => (b'r', RespState::HdrExpir),
        RespState::HdrExpir => (b'e', RespState::HdrExpire),
        RespState::HdrExpire => (b's', RespState::HdrExpires),
        // Keep-Alive.
        RespState::HdrK => (b'e', RespState::HdrKe),
        RespState::HdrKe => (b'e', RespState::HdrKee),
        RespState::HdrKee => (b'p', RespState::HdrKeep),
        RespState::HdrKeep => (b'-', RespState::HdrKeepDash),
        RespState::HdrKeepDash => (b'a', RespState::HdrKeepA),
        RespState::HdrKeepA => (b'l', RespState::HdrKeepAl),
        RespState::HdrKeepAl => (b'i', RespState::HdrKeepAli),
        RespState::HdrKeepAli => (b'v', RespState::HdrKeepAliv),
        RespState::HdrKeepAliv => (b'e', RespState::HdrKeepAlive),
        // Transfer-Encoding.
        RespState::HdrT => (b'r', RespState::HdrTr),
        RespState::HdrTr => (b'a', RespState::HdrTra),
        RespState::HdrTra => (b'n', RespState::HdrTran),
        RespState::HdrTran => (b's', RespState::HdrTrans),
        RespState::HdrTrans => (b'f', RespState::HdrTransf),
        RespState::HdrTransf => (b'e', RespState::HdrTransfe),
        RespState::HdrTransfe => (b'r', RespState::HdrTransfer),
        RespState::HdrTransfer => (b'-', RespState::HdrTransferDash),
        RespState::HdrTransferDash => (b'e', RespState::HdrTransferE),
        RespState::HdrTransferE => (b'n', RespState::HdrTransferEn),
        RespState::HdrTransferEn => (b'c', RespState::HdrTransferEnc),
        RespState::HdrTransferEnc => (b'o', RespState::HdrTransferEnco),
        RespState::HdrTransferEnco => (b'd', RespState::HdrTransferEncod),
        RespState::HdrTransferEncod => (b'i', RespState::HdrTransferEncodi),
        RespState::HdrTransferEncodi => (b'n', RespState::HdrTransferEncodin),
        RespState::HdrTransferEncodin => (b'g', RespState::HdrTransferEncoding),
        _ => return None,
    })
}

fn colon_tx(st: RespState) -> Option<RespState> {
    Some(match st {
        RespState::HdrCacheControl => RespState::HdrCacheControlV,
        RespState::HdrConnection => RespState::HdrConnectionV,
        RespState::HdrContentLength => RespState::HdrContentLengthV,
        RespState::HdrExpires => RespState::HdrExpiresV,
        RespState::HdrKeepAlive => RespState::HdrKeepAliveV,
        RespState::HdrTransferEncoding => RespState::HdrTransferEncodingV,
        _ => return None,
    })
}

/// Response `Cache-Control` value: the request directive set plus
/// `must-revalidate`, `proxy-revalidate`, `public`/`private` and
/// `s-maxage=N`.
fn cache_control(
    parser: &mut Parser,
    buf: &Bytes,
    at: usize,
    cc: &mut CacheControl,
) -> super::field::FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::RespCc => match first_token_byte(parser, buf, i).to_ascii_lowercase() {
                b'm' => {
                    try_str!(parser, buf, i, b"max-age=", {
                        i_enter!(parser, buf, i, Inner::RespCcMaxAge);
                    });
                    try_str!(parser, buf, i, b"must-revalidate", {
                        cc.must_revalidate = true;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    });
                    i_jmp!(parser, Inner::RespCcExt);
                }
                b'n' => {
                    try_str!(parser, buf, i, b"no-cache", {
                        cc.no_cache = true;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    });
                    try_str!(parser, buf, i, b"no-store", {
                        cc.no_store = true;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    });
                    try_str!(parser, buf, i, b"no-transform", {
                        cc.no_transform = true;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    });
                    i_jmp!(parser, Inner::RespCcExt);
                }
                b'p' => {
                    try_str!(parser, buf, i, b"public", {
                        cc.public = true;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    });
                    try_str!(parser, buf, i, b"private", {
                        cc.public = true;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    });
                    try_str!(parser, buf, i, b"proxy-revalidate", {
                        cc.proxy_revalidate = true;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    });
                    i_jmp!(parser, Inner::RespCcExt);
                }
                b's' => {
                    try_str!(parser, buf, i, b"s-maxage=", {
                        i_enter!(parser, buf, i, Inner::RespCcSMaxAge);
                    });
                    i_jmp!(parser, Inner::RespCcExt);
                }
                _ => i_jmp!(parser, Inner::RespCcExt),
            },
            Inner::RespCcMaxAge => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::list_delim)? {
                    Scanned::Int { consumed, .. } => {
                        cc.max_age = acc;
                        i += consumed;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::RespCcSMaxAge => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::list_delim)? {
                    Scanned::Int { consumed, .. } => {
                        cc.s_maxage = acc;
                        i += consumed;
                        i_enter!(parser, buf, i, Inner::RespCcEot);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::RespCcExt => match field::ext(buf, i) {
                field::Sep::Eot(j) => {
                    i = j;
                    i_jmp!(parser, Inner::RespCcEot);
                }
                field::Sep::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::RespCcEol);
                }
                field::Sep::Postpone => return Ok(Field::Postpone),
            },
            Inner::RespCcEot => match field::eot(buf, i, true)? {
                field::Term::Token(j) => {
                    i = j;
                    i_jmp!(parser, Inner::RespCc);
                }
                field::Term::Ext(j) => {
                    i = j;
                    i_enter!(parser, buf, i, Inner::RespCcExt);
                }
                field::Term::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::RespCcEol);
                }
                field::Term::Postpone => return Ok(Field::Postpone),
            },
            Inner::RespCcEol => return eol(parser, buf, i, at),
            _ => unreachable!("cache-control sub-parser entered in {:?}", parser.inner),
        }
    }
}

/// `Keep-Alive` value: decodes `timeout=N`; other extensions (for
/// example `max=N`) are skipped.
fn keep_alive(
    parser: &mut Parser,
    buf: &Bytes,
    at: usize,
    out: &mut u32,
) -> super::field::FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::KeepAlive => match first_token_byte(parser, buf, i).to_ascii_lowercase() {
                b't' => {
                    try_str!(parser, buf, i, b"timeout=", {
                        i_enter!(parser, buf, i, Inner::KeepAliveTmo);
                    });
                    i_jmp!(parser, Inner::KeepAliveExt);
                }
                _ => i_jmp!(parser, Inner::KeepAliveExt),
            },
            Inner::KeepAliveTmo => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::list_delim)? {
                    Scanned::Int { consumed, .. } => {
                        *out = acc;
                        i += consumed;
                        i_enter!(parser, buf, i, Inner::KeepAliveEot);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::KeepAliveExt => match field::ext(buf, i) {
                field::Sep::Eot(j) => {
                    i = j;
                    i_jmp!(parser, Inner::KeepAliveEot);
                }
                field::Sep::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::KeepAliveEol);
                }
                field::Sep::Postpone => return Ok(Field::Postpone),
            },
            Inner::KeepAliveEot => match field::eot(buf, i, true)? {
                field::Term::Token(j) => {
                    i = j;
                    i_jmp!(parser, Inner::KeepAlive);
                }
                field::Term::Ext(j) => {
                    i = j;
                    i_enter!(parser, buf, i, Inner::KeepAliveExt);
                }
                field::Term::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::KeepAliveEol);
                }
                field::Term::Postpone => return Ok(Field::Postpone),
            },
            Inner::KeepAliveEol => return eol(parser, buf, i, at),
            _ => unreachable!("keep-alive sub-parser entered in {:?}", parser.inner),
        }
    }
}

fn first_token_byte(parser: &Parser, buf: &Bytes, i: usize) -> u8 {
    parser.carry.first().unwrap_or(buf[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(raw: &[u8]) -> (Verdict, Response) {
        let mut resp = Response::new();
        let buf = Bytes::copy_from_slice(raw);
        let v = resp.parse(&buf);
        (v, resp)
    }

    #[test]
    fn minimal_response() {
        let (v, resp) = parse_one(b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.version(), Version::HTTP_11);
        assert!(resp.body().is_empty());
    }

    #[test]
    fn reason_phrase_is_skipped() {
        let (v, resp) = parse_one(b"HTTP/1.0 404 Not Found, truly\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.version(), Version::HTTP_10);
    }

    #[test]
    fn two_digit_status_blocks() {
        let (v, _) = parse_one(b"HTTP/1.1 99 Nope\r\n\r\n");
        assert_eq!(v, Verdict::Block);
    }

    #[test]
    fn bad_version_blocks() {
        let (v, _) = parse_one(b"HTTP/2.0 200 OK\r\n\r\n");
        assert_eq!(v, Verdict::Block);
    }

    #[test]
    fn content_length_body() {
        let (v, resp) = parse_one(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nwxyz");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(resp.content_length(), 4);
        assert_eq!(resp.body(), &b"wxyz"[..]);
    }

    #[test]
    fn chunked_body() {
        let (v, resp) = parse_one(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n6\r\nfoobar\r\n0\r\n\r\n",
        );
        assert_eq!(v, Verdict::Pass);
        assert!(resp.is_chunked());
        assert_eq!(resp.body(), &b"foobar"[..]);
    }

    #[test]
    fn expires_epoch() {
        let (v, resp) =
            parse_one(b"HTTP/1.1 200 OK\r\nExpires: Sun, 06 Nov 1994 08:49:37 GMT\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(resp.expires(), 784111777);
        assert_eq!(
            resp.headers().known()[Response::HDR_EXPIRES],
            b"Expires: Sun, 06 Nov 1994 08:49:37 GMT"[..]
        );
    }

    #[test]
    fn keep_alive_timeout() {
        let (v, resp) = parse_one(b"HTTP/1.1 200 OK\r\nKeep-Alive: timeout=15, max=100\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(resp.keep_alive(), 15);
    }

    #[test]
    fn response_cache_control() {
        let (v, resp) = parse_one(
            b"HTTP/1.1 200 OK\r\nCache-Control: private, must-revalidate, s-maxage=90\r\n\r\n",
        );
        assert_eq!(v, Verdict::Pass);
        let cc = resp.cache_control();
        // `private` currently raises the same flag as `public`.
        assert!(cc.public);
        assert!(cc.must_revalidate);
        assert_eq!(cc.s_maxage, 90);
    }

    #[test]
    fn connection_goes_to_raw_area() {
        let (v, resp) = parse_one(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert!(resp.is_conn_close());
        assert_eq!(resp.headers().raw()[0], b"Connection: close"[..]);
    }

    #[test]
    fn slow_path_version() {
        // One byte at a time forces the per-character version chain.
        let raw = b"HTTP/1.0 200 OK\r\n\r\n";
        let mut resp = Response::new();
        let mut verdict = Verdict::Postpone;
        for b in raw.iter() {
            let buf = Bytes::copy_from_slice(&[*b]);
            verdict = resp.parse(&buf);
            if verdict != Verdict::Postpone {
                break;
            }
        }
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.version(), Version::HTTP_10);
    }
}
