//! HTTP/1 request parsing: request line, header dispatch, body framing.

use bytes::Bytes;
use http::{Method, Version};

use super::decode;
use super::field::{self, eol, Field};
use super::headers::{HeaderTable, Slot, DEFAULT_MAX_RAW_HEADERS};
use super::parse::{self, Inner, LwsStep, Parser};
use super::scan::{self, Lit, Reject, Scanned};
use super::CacheControl;
use crate::error::{Error, Parse};
use crate::proto::Verdict;
use crate::str::Str;

/// Main request parser states. Names track the bytes of the header
/// name matched so far; the `*V` states hand off to the value
/// sub-parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
enum ReqState {
    Start,
    Method,
    MUSpace,
    UriHost,
    UriHostEnd,
    UriPort,
    UriAbsPath,
    HttpVer,
    HttpVerT1,
    HttpVerT2,
    HttpVerP,
    HttpVerSlash,
    HttpVerMajor,
    HttpVerDot,
    HttpVerMinor,
    LineEol,
    // Headers.
    Hdr,
    Lws,
    HdrH,
    HdrHo,
    HdrHos,
    HdrHost,
    HdrHostV,
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
    HdrX,
    HdrXDash,
    HdrXF,
    HdrXFo,
    HdrXFor,
    HdrXForw,
    HdrXForwa,
    HdrXForwar,
    HdrXForward,
    HdrXForwarde,
    HdrXForwarded,
    HdrXForwardedDash,
    HdrXForwardedF,
    HdrXForwardedFo,
    HdrXForwardedFor,
    HdrXffV,
    HdrOther,
    HdrDone,
    // Body.
    Body,
    BodyChunkEol,
    BodyChunkEnd,
    BodyReadChunk,
    Done,
}

/// An incoming HTTP/1 request being parsed.
///
/// Feed network buffers to [`parse`](Request::parse) as they arrive;
/// the structured view (method, target, headers, body framing) fills
/// in place, borrowing the fed buffers. After [`Verdict::Pass`] or
/// [`Verdict::Block`] the message is final and must not be fed again.
#[derive(Debug)]
pub struct Request {
    method: Method,
    version: Version,
    host: Str,
    port: Str,
    uri_path: Str,
    headers: HeaderTable,
    body: Str,
    content_length: u32,
    cache_ctl: CacheControl,
    uri_host: bool,
    state: ReqState,
    lws_next: ReqState,
    parser: Parser,
}

impl Request {
    /// Known-header slot of the `Host` line.
    pub const HDR_HOST: usize = 0;
    /// Known-header slot of the `Content-Length` line.
    pub const HDR_CONTENT_LENGTH: usize = 1;
    /// Known-header slot of the `Connection` line.
    pub const HDR_CONNECTION: usize = 2;
    /// Known-header slot of the `Transfer-Encoding` line.
    pub const HDR_TRANSFER_ENCODING: usize = 3;
    /// Known-header slot of the `X-Forwarded-For` line.
    pub const HDR_X_FORWARDED_FOR: usize = 4;
    const KNOWN: usize = 5;

    /// Creates an empty request with the default raw-header ceiling.
    pub fn new() -> Request {
        Request::with_max_raw_headers(DEFAULT_MAX_RAW_HEADERS)
    }

    /// Creates an empty request whose raw-header area refuses to grow
    /// past `max` slots.
    pub fn with_max_raw_headers(max: usize) -> Request {
        Request {
            method: Method::GET,
            version: Version::HTTP_11,
            host: Str::new(),
            port: Str::new(),
            uri_path: Str::new(),
            headers: HeaderTable::new(Request::KNOWN, max),
            body: Str::new(),
            content_length: 0,
            cache_ctl: CacheControl::default(),
            uri_host: false,
            state: ReqState::Start,
            lws_next: ReqState::Hdr,
            parser: Parser::new(),
        }
    }

    /// Request method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Protocol version of the request line.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Authority host: from the absolute-URI target if present, else
    /// from the `Host` header. Empty if neither was seen.
    #[inline]
    pub fn host(&self) -> &Str {
        &self.host
    }

    /// Authority port digits, if given. Empty otherwise.
    #[inline]
    pub fn port(&self) -> &Str {
        &self.port
    }

    /// Absolute path of the request target (leading `/` included).
    #[inline]
    pub fn uri_path(&self) -> &Str {
        &self.uri_path
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

    /// Why the request was blocked, if it was.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.parser.error()
    }

    /// Starts this request where `prior` ended inside the same buffer,
    /// for pipelined messages. Call before the first `parse`.
    pub fn inherit_offset(&mut self, prior: &Request) {
        self.parser.inherit(&prior.parser);
    }

    fn postpone(&mut self, buf: &Bytes) -> Verdict {
        trace!("request postponed in {:?}", self.state);
        self.parser.suspend(buf);
        Verdict::Postpone
    }

    fn block(&mut self, at: usize, kind: Parse) -> Verdict {
        debug!("request blocked in {:?}: {:?}", self.state, kind);
        self.parser.fail(at, kind);
        Verdict::Block
    }

    fn pass(&mut self, off: usize) -> Verdict {
        trace!("request complete, {} bytes consumed", off);
        self.parser.finish_pass(off);
        Verdict::Pass
    }

    /// Feeds the next input buffer. See [`Verdict`] for the outcomes.
    ///
    /// Buffers must be delivered in stream order; after `Pass` or
    /// `Block` the request is final and further calls are not
    /// permitted.
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
        trace!("request parse: {} bytes in {:?}", buf.len() - p, self.state);
        loop {
            let c = buf[p];
            match self.state {
                // ----------------    Request line    ----------------
                ReqState::Start => {
                    if c == b'\r' || c == b'\n' {
                        mv!(self, buf, p, ReqState::Start);
                    }
                    jmp!(self, ReqState::Method);
                }
                ReqState::Method => {
                    match scan::literal(&mut self.parser.carry, buf, p, b"GET ", false) {
                        Ok(Lit::Match(n)) => {
                            self.method = Method::GET;
                            mv_n!(self, buf, p, n, ReqState::MUSpace);
                        }
                        Ok(Lit::Postpone) => return self.postpone(buf),
                        Ok(Lit::Miss) => {}
                        Err(_) => return self.block(p, Parse::Method),
                    }
                    match scan::literal(&mut self.parser.carry, buf, p, b"HEAD", false) {
                        Ok(Lit::Match(n)) => {
                            self.method = Method::HEAD;
                            mv_n!(self, buf, p, n, ReqState::MUSpace);
                        }
                        Ok(Lit::Postpone) => return self.postpone(buf),
                        Ok(Lit::Miss) => {}
                        Err(_) => return self.block(p, Parse::Method),
                    }
                    match scan::literal(&mut self.parser.carry, buf, p, b"POST", false) {
                        Ok(Lit::Match(n)) => {
                            self.method = Method::POST;
                            mv_n!(self, buf, p, n, ReqState::MUSpace);
                        }
                        Ok(Lit::Postpone) => return self.postpone(buf),
                        _ => return self.block(p, Parse::Method),
                    }
                }
                // Spaces between method and target; only the `http`
                // scheme is meaningful for a plaintext proxy.
                ReqState::MUSpace => {
                    if self.parser.carry.is_empty() {
                        if c == b' ' {
                            mv!(self, buf, p, ReqState::MUSpace);
                        }
                        if c == b'/' {
                            self.parser.field.begin(p);
                            mv!(self, buf, p, ReqState::UriAbsPath);
                        }
                    }
                    match scan::literal(&mut self.parser.carry, buf, p, b"http://", true) {
                        Ok(Lit::Match(n)) => {
                            // The target names the authority; a later
                            // Host header must not override it.
                            self.uri_host = true;
                            mv_n!(self, buf, p, n, ReqState::UriHost);
                        }
                        Ok(Lit::Postpone) => return self.postpone(buf),
                        _ => return self.block(p, Parse::Uri),
                    }
                }
                ReqState::UriHost => {
                    if !self.parser.field.is_active() {
                        self.parser.field.begin(p);
                    }
                    if c.is_ascii_alphanumeric() || c == b'.' || c == b'-' {
                        mv!(self, buf, p, ReqState::UriHost);
                    }
                    jmp!(self, ReqState::UriHostEnd);
                }
                ReqState::UriHostEnd => {
                    self.host = self.parser.take_field(buf, p);
                    if c == b'/' {
                        self.parser.field.begin(p);
                        mv!(self, buf, p, ReqState::UriAbsPath);
                    }
                    if c == b':' {
                        mv!(self, buf, p, ReqState::UriPort);
                    }
                    return self.block(p, Parse::Uri);
                }
                ReqState::UriPort => {
                    if !self.parser.field.is_active() {
                        self.parser.field.begin(p);
                    }
                    if c.is_ascii_digit() {
                        mv!(self, buf, p, ReqState::UriPort);
                    }
                    if c == b'/' {
                        self.port = self.parser.take_field(buf, p);
                        self.parser.field.begin(p);
                        mv!(self, buf, p, ReqState::UriAbsPath);
                    }
                    return self.block(p, Parse::Uri);
                }
                ReqState::UriAbsPath => {
                    if scan::is_uri_char(c) {
                        mv!(self, buf, p, ReqState::UriAbsPath);
                    }
                    if c == b' ' {
                        self.uri_path = self.parser.take_field(buf, p);
                        mv!(self, buf, p, ReqState::HttpVer);
                    }
                    return self.block(p, Parse::Uri);
                }
                ReqState::HttpVer => {
                    if p + 8 <= buf.len() {
                        // Fast path: the whole version fits.
                        let w = &buf[p..p + 8];
                        if w == b"HTTP/1.1" {
                            self.version = Version::HTTP_11;
                            mv_n!(self, buf, p, 8, ReqState::LineEol);
                        }
                        if w == b"HTTP/1.0" {
                            self.version = Version::HTTP_10;
                            mv_n!(self, buf, p, 8, ReqState::LineEol);
                        }
                        return self.block(p, Parse::Version);
                    }
                    if c == b'H' {
                        mv!(self, buf, p, ReqState::HttpVerT1);
                    }
                    return self.block(p, Parse::Version);
                }
                ReqState::HttpVerMinor => {
                    if c == b'1' {
                        self.version = Version::HTTP_11;
                        mv!(self, buf, p, ReqState::LineEol);
                    }
                    if c == b'0' {
                        self.version = Version::HTTP_10;
                        mv!(self, buf, p, ReqState::LineEol);
                    }
                    return self.block(p, Parse::Version);
                }
                ReqState::LineEol => {
                    if c == b'\r' {
                        mv!(self, buf, p, ReqState::LineEol);
                    }
                    if c == b'\n' {
                        mv!(self, buf, p, ReqState::Hdr);
                    }
                    return self.block(p, Parse::Version);
                }

                // ----------------    Header lines    ----------------
                ReqState::Hdr => {
                    if c == b'\r' {
                        if self.parser.body_started {
                            mv!(self, buf, p, ReqState::Done);
                        }
                        mv!(self, buf, p, ReqState::HdrDone);
                    }
                    if c == b'\n' {
                        if self.parser.body_started {
                            return self.pass(p + 1);
                        }
                        init_body!(self, buf, p, ReqState::Body);
                    }
                    if !scan::is_hdr_token(c) {
                        return self.block(p, Parse::HeaderName);
                    }
                    // A new header line starts here.
                    self.parser.field.begin(p);
                    match c.to_ascii_lowercase() {
                        b'c' => mv!(self, buf, p, ReqState::HdrC),
                        b'h' => {
                            if buf.len() >= p + 5
                                && buf[p + 1..p + 5].eq_ignore_ascii_case(b"ost:")
                            {
                                self.lws_next = ReqState::HdrHostV;
                                mv_n!(self, buf, p, 5, ReqState::Lws);
                            }
                            mv!(self, buf, p, ReqState::HdrH);
                        }
                        b't' => {
                            if buf.len() >= p + 18
                                && buf[p..p + 18].eq_ignore_ascii_case(b"transfer-encoding:")
                            {
                                self.lws_next = ReqState::HdrTransferEncodingV;
                                mv_n!(self, buf, p, 18, ReqState::Lws);
                            }
                            mv!(self, buf, p, ReqState::HdrT);
                        }
                        b'x' => {
                            // The value may open with `[`, which the
                            // whitespace transition rejects, so the
                            // sub-parser eats its own leading OWS.
                            if buf.len() >= p + 16
                                && buf[p..p + 16].eq_ignore_ascii_case(b"x-forwarded-for:")
                            {
                                mv_n!(self, buf, p, 16, ReqState::HdrXffV);
                            }
                            mv!(self, buf, p, ReqState::HdrX);
                        }
                        _ => jmp!(self, ReqState::HdrOther),
                    }
                }
                ReqState::Lws => match parse::lws_step(&mut self.parser, c) {
                    LwsStep::Stay => mv!(self, buf, p, ReqState::Lws),
                    LwsStep::Next => jmp!(self, self.lws_next),
                    LwsStep::Reject => return self.block(p, Parse::HeaderName),
                },
                ReqState::HdrC => {
                    if !scan::is_hdr_token(c) {
                        return self.block(p, Parse::HeaderName);
                    }
                    match c.to_ascii_lowercase() {
                        b'a' => {
                            if buf.len() >= p + 13
                                && buf[p..p + 13].eq_ignore_ascii_case(b"ache-control:")
                            {
                                self.lws_next = ReqState::HdrCacheControlV;
                                mv_n!(self, buf, p, 13, ReqState::Lws);
                            }
                            mv!(self, buf, p, ReqState::HdrCa);
                        }
                        b'o' => {
                            if buf.len() >= p + 14
                                && buf[p..p + 14].eq_ignore_ascii_case(b"ontent-length:")
                            {
                                self.lws_next = ReqState::HdrContentLengthV;
                                mv_n!(self, buf, p, 14, ReqState::Lws);
                            }
                            if buf.len() >= p + 9
                                && buf[p..p + 9].eq_ignore_ascii_case(b"onnection")
                            {
                                mv_n!(self, buf, p, 9, ReqState::HdrConnection);
                            }
                            mv!(self, buf, p, ReqState::HdrCo);
                        }
                        _ => jmp!(self, ReqState::HdrOther),
                    }
                }
                ReqState::HdrCon => {
                    if !scan::is_hdr_token(c) {
                        return self.block(p, Parse::HeaderName);
                    }
                    match c.to_ascii_lowercase() {
                        b'n' => mv!(self, buf, p, ReqState::HdrConn),
                        b't' => mv!(self, buf, p, ReqState::HdrCont),
                        _ => mv!(self, buf, p, ReqState::HdrOther),
                    }
                }

                // `Host ":" OWS` was read; the value keeps the
                // authority fields when the target did not.
                ReqState::HdrHostV => {
                    if self.parser.inner == Inner::None {
                        self.parser.begin_value(p, Inner::Host);
                    }
                    match host(&mut self.parser, buf, p) {
                        Ok(Field::Done(n)) => {
                            let voff = self.parser.line_base;
                            let host_end = self.parser.mark.take();
                            let port_end = self.parser.mark2.take();
                            let line = self.parser.close_line(buf);
                            if !self.uri_host && self.host.is_empty() {
                                if let Some(he) = host_end {
                                    self.host = line.substr(voff, he);
                                    if let Some(pe) = port_end {
                                        self.port = line.substr(voff + he + 1, pe - he - 1);
                                    }
                                }
                            }
                            self.headers.close(Slot::Known(Request::HDR_HOST), line);
                            self.state = ReqState::Hdr;
                            p += n;
                            if p >= buf.len() {
                                return self.postpone(buf);
                            }
                            continue;
                        }
                        Ok(Field::Postpone) => {
                            self.parser.value_len += buf.len() - p;
                            return self.postpone(buf);
                        }
                        Err(_) => return self.block(p, Parse::Header("host")),
                    }
                }
                ReqState::HdrCacheControlV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::ReqCc,
                    Slot::Raw,
                    ReqState::Hdr,
                    Parse::Header("cache-control"),
                    cache_control(&mut self.parser, buf, p, &mut self.cache_ctl)
                ),
                ReqState::HdrConnectionV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::Conn,
                    Slot::Known(Request::HDR_CONNECTION),
                    ReqState::Hdr,
                    Parse::Header("connection"),
                    field::connection(&mut self.parser, buf, p)
                ),
                ReqState::HdrContentLengthV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::ContLen,
                    Slot::Known(Request::HDR_CONTENT_LENGTH),
                    ReqState::Hdr,
                    Parse::Header("content-length"),
                    field::content_length(&mut self.parser, buf, p, &mut self.content_length)
                ),
                ReqState::HdrTransferEncodingV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::TransEncod,
                    Slot::Known(Request::HDR_TRANSFER_ENCODING),
                    ReqState::Hdr,
                    Parse::Header("transfer-encoding"),
                    field::transfer_encoding(&mut self.parser, buf, p)
                ),
                ReqState::HdrXffV => hdr_value!(
                    self,
                    buf,
                    p,
                    Inner::Xff,
                    Slot::Known(Request::HDR_X_FORWARDED_FOR),
                    ReqState::Hdr,
                    Parse::Header("x-forwarded-for"),
                    x_forwarded_for(&mut self.parser, buf, p)
                ),

                // Uninteresting header: scan for LF, store the line
                // opaque. Cookie or User-Agent can be very long.
                ReqState::HdrOther => match buf[p..].iter().position(|&b| b == b'\n') {
                    Some(k) => {
                        let mut line = self.parser.take_field(buf, p + k);
                        line.trim_trailing(b'\r');
                        self.headers.close(Slot::Raw, line);
                        mv_n!(self, buf, p, k + 1, ReqState::Hdr);
                    }
                    None => return self.postpone(buf),
                },
                ReqState::HdrDone => {
                    if c == b'\n' {
                        init_body!(self, buf, p, ReqState::Body);
                    }
                    return self.block(p, Parse::HeaderName);
                }

                // ----------------    Request body    ----------------
                ReqState::Body => {
                    if self.parser.to_read == 0 {
                        match decode::chunk_size(&mut self.parser, buf, p) {
                            Ok(Scanned::Int { consumed, .. }) => {
                                mv_n!(self, buf, p, consumed, ReqState::BodyChunkEol)
                            }
                            Ok(Scanned::Postpone) => return self.postpone(buf),
                            Err(_) => return self.block(p, Parse::Chunk),
                        }
                    }
                    jmp!(self, ReqState::BodyReadChunk);
                }
                ReqState::BodyChunkEol => {
                    if c == b'\n' {
                        if self.parser.to_read > 0 {
                            mv!(self, buf, p, ReqState::BodyReadChunk);
                        }
                        // Zero chunk: trailer headers follow.
                        mv!(self, buf, p, ReqState::Hdr);
                    }
                    if decode::is_chunk_ext_char(c) {
                        mv!(self, buf, p, ReqState::BodyChunkEol);
                    }
                    return self.block(p, Parse::Chunk);
                }
                ReqState::BodyReadChunk => {
                    let mlen = decode::read_span(&mut self.parser, &mut self.body, buf, p);
                    if self.parser.to_read > 0 {
                        mv_n!(self, buf, p, mlen, ReqState::BodyReadChunk);
                    }
                    if self.parser.chunked {
                        mv_n!(self, buf, p, mlen, ReqState::BodyChunkEnd);
                    }
                    return self.pass(p + mlen);
                }
                ReqState::BodyChunkEnd => {
                    if c == b'\n' {
                        mv!(self, buf, p, ReqState::Body);
                    }
                    if c == b'\r' {
                        mv!(self, buf, p, ReqState::BodyChunkEnd);
                    }
                    return self.block(p, Parse::Chunk);
                }
                ReqState::Done => {
                    if c == b'\n' {
                        return self.pass(p + 1);
                    }
                    return self.block(p, Parse::Chunk);
                }

                // Per-character walks of the known header names and the
                // slow-path version match.
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
                            mv!(self, buf, p, ReqState::HdrOther);
                        }
                        return self.block(p, Parse::HeaderName);
                    }
                    if let Some(target) = colon_tx(st) {
                        if c == b':' {
                            if st == ReqState::HdrXForwardedFor {
                                mv!(self, buf, p, target);
                            }
                            self.lws_next = target;
                            mv!(self, buf, p, ReqState::Lws);
                        }
                        if scan::is_hdr_token(c) {
                            mv!(self, buf, p, ReqState::HdrOther);
                        }
                        return self.block(p, Parse::HeaderName);
                    }
                    return self.block(p, Parse::Internal);
                }
            }
        }
    }
}

impl Default for Request {
    fn default() -> Request {
        Request::new()
    }
}

fn version_tx(st: ReqState) -> Option<(u8, ReqState)> {
    Some(match st {
        ReqState::HttpVerT1 => (b'T', ReqState::HttpVerT2),
        ReqState::HttpVerT2 => (b'T', ReqState::HttpVerP),
        ReqState::HttpVerP => (b'P', ReqState::HttpVerSlash),
        ReqState::HttpVerSlash => (b'/', ReqState::HttpVerMajor),
        ReqState::HttpVerMajor => (b'1', ReqState::HttpVerDot),
        ReqState::HttpVerDot => (b'.', ReqState::HttpVerMinor),
        _ => return None,
    })
}

fn name_tx(st: ReqState) -> Option<(u8, ReqState)> {
    Some(match st {
        // Host.
        ReqState::HdrH => (b'o', ReqState::HdrHo),
        ReqState::HdrHo => (b's', ReqState::HdrHos),
        ReqState::HdrHos => (b't', ReqState::HdrHost),
        // Cache-Control.
        ReqState::HdrCa => (b'c', ReqState::HdrCac),
        ReqState::HdrCac => (b'h', ReqState::HdrCach),
        ReqState::HdrCach => (b'e', ReqState::HdrCache),
        ReqState::HdrCache => (b'-', ReqState::HdrCacheDash),
        ReqState::HdrCacheDash => (b'c', ReqState::HdrCacheC),
        ReqState::HdrCacheC => (b'o', ReqState::HdrCacheCo),
        ReqState::HdrCacheCo => (b'n', ReqState::HdrCacheCon),
        ReqState::HdrCacheCon => (b't', ReqState::HdrCacheCont),
        ReqState::HdrCacheCont => (b'r', ReqState::HdrCacheContr),
        ReqState::HdrCacheContr => (b'o', ReqState::HdrCacheContro),
        ReqState::HdrCacheContro => (b'l', ReqState::HdrCacheControl),
        // Connection.
        ReqState::HdrCo => (b'n', ReqState::HdrCon),
        ReqState::HdrConn => (b'e', ReqState::HdrConne),
        ReqState::HdrConne => (b'c', ReqState::HdrConnec),
        ReqState::HdrConnec => (b't', ReqState::HdrConnect),
        ReqState::HdrConnect => (b'i', ReqState::HdrConnecti),
        ReqState::HdrConnecti => (b'o', ReqState::HdrConnectio),
        ReqState::HdrConnectio => (b'n', ReqState::HdrConnection),
        // Content-Length.
        ReqState::HdrCont => (b'e', ReqState::HdrConte),
        ReqState::HdrConte => (b'n', ReqState::HdrConten),
        ReqState::HdrConten => (b't', ReqState::HdrContent),
        ReqState::HdrContent => (b'-', ReqState::HdrContentDash),
        ReqState::HdrContentDash => (b'l', ReqState::HdrContentL),
        ReqState::HdrContentL => (b'e', ReqState::HdrContentLe),
        ReqState::HdrContentLe => (b'n', ReqState::HdrContentLen),
        ReqState::HdrContentLen => (b'g', ReqState::HdrContentLeng),
        ReqState::HdrContentLeng => (b't', ReqState::HdrContentLengt),
        ReqState::HdrContentLengt => (b'h', ReqState::HdrContentLength),
        // Transfer-Encoding.
        ReqState::HdrT => (b'r', ReqState::HdrTr),
        ReqState::HdrTr => (b'a', ReqState::HdrTra),
        ReqState::HdrTra => (b'n', ReqState::HdrTran),
        ReqState::HdrTran => (b's', ReqState::HdrTrans),
        ReqState::HdrTrans => (b'f', ReqState::HdrTransf),
        ReqState::HdrTransf => (b'e', ReqState::HdrTransfe),
        ReqState::HdrTransfe => (b'r', ReqState::HdrTransfer),
        ReqState::HdrTransfer => (b'-', ReqState::HdrTransferDash),
        ReqState::HdrTransferDash => (b'e', ReqState::HdrTransferE),
        ReqState::HdrTransferE => (b'n', ReqState::HdrTransferEn),
        ReqState::HdrTransferEn => (b'c', ReqState::HdrTransferEnc),
        ReqState::HdrTransferEnc => (b'o', ReqState::HdrTransferEnco),
        ReqState::HdrTransferEnco => (b'd', ReqState::HdrTransferEncod),
        ReqState::HdrTransferEncod => (b'i', ReqState::HdrTransferEncodi),
        ReqState::HdrTransferEncodi => (b'n', ReqState::HdrTransferEncodin),
        ReqState::HdrTransferEncodin => (b'g', ReqState::HdrTransferEncoding),
        // X-Forwarded-For.
        ReqState::HdrX => (b'-', ReqState::HdrXDash),
        ReqState::HdrXDash => (b'f', ReqState::HdrXF),
        ReqState::HdrXF => (b'o', ReqState::HdrXFo),
        ReqState::HdrXFo => (b'r', ReqState::HdrXFor),
        ReqState::HdrXFor => (b'w', ReqState::HdrXForw),
        ReqState::HdrXForw => (b'a', ReqState::HdrXForwa),
        ReqState::HdrXForwa => (b'r', ReqState::HdrXForwar),
        ReqState::HdrXForwar => (b'd', ReqState::HdrXForward),
        ReqState::HdrXForward => (b'e', ReqState::HdrXForwarde),
        ReqState::HdrXForwarde => (b'd', ReqState::HdrXForwarded),
        ReqState::HdrXForwarded => (b'-', ReqState::HdrXForwardedDash),
        ReqState::HdrXForwardedDash => (b'f', ReqState::HdrXForwardedF),
        ReqState::HdrXForwardedF => (b'o', ReqState::HdrXForwardedFo),
        ReqState::HdrXForwardedFo => (b'r', ReqState::HdrXForwardedFor),
        _ => return None,
    })
}

fn colon_tx(st: ReqState) -> Option<ReqState> {
    Some(match st {
        ReqState::HdrHost => ReqState::HdrHostV,
        ReqState::HdrCacheControl => ReqState::HdrCacheControlV,
        ReqState::HdrConnection => ReqState::HdrConnectionV,
        ReqState::HdrContentLength => ReqState::HdrContentLengthV,
        ReqState::HdrTransferEncoding => ReqState::HdrTransferEncodingV,
        // No whitespace transition: the value may open with `[`.
        ReqState::HdrXForwardedFor => ReqState::HdrXffV,
        _ => return None,
    })
}

/// `Host` header value: `host [":" port]`, the alphabet matching the
/// URI authority parse. Bracketed IPv6 literals are not accepted.
fn host(parser: &mut Parser, buf: &Bytes, at: usize) -> super::field::FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::Host => {
                let c = buf[i];
                if c.is_ascii_alphanumeric() || c == b'.' || c == b'-' {
                    i_move!(parser, buf, i, Inner::Host);
                }
                if c == b':' {
                    if parser.mark.is_none() {
                        parser.mark = Some(parser.value_len + (i - at));
                    }
                    i_move!(parser, buf, i, Inner::HostPort);
                }
                if scan::is_space(c) {
                    if parser.mark.is_none() {
                        parser.mark = Some(parser.value_len + (i - at));
                    }
                    i_jmp!(parser, Inner::HostEol);
                }
                return Err(Reject::Neq);
            }
            Inner::HostPort => {
                let c = buf[i];
                if c.is_ascii_digit() {
                    i_move!(parser, buf, i, Inner::HostPort);
                }
                if scan::is_space(c) {
                    if parser.mark2.is_none() {
                        parser.mark2 = Some(parser.value_len + (i - at));
                    }
                    i_jmp!(parser, Inner::HostEol);
                }
                return Err(Reject::Neq);
            }
            Inner::HostEol => return eol(parser, buf, i, at),
            _ => unreachable!("host sub-parser entered in {:?}", parser.inner),
        }
    }
}

/// Request `Cache-Control` value: the request directives, with unknown
/// extensions tolerated and skipped.
fn cache_control(
    parser: &mut Parser,
    buf: &Bytes,
    at: usize,
    cc: &mut CacheControl,
) -> super::field::FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::ReqCc => match first_token_byte(parser, buf, i).to_ascii_lowercase() {
                b'm' => {
                    try_str!(parser, buf, i, b"max-age=", {
                        i_enter!(parser, buf, i, Inner::ReqCcMaxAge);
                    });
                    try_str!(parser, buf, i, b"min-fresh=", {
                        i_enter!(parser, buf, i, Inner::ReqCcMinFresh);
                    });
                    try_str!(parser, buf, i, b"max-stale", {
                        cc.max_stale = true;
                        i_enter!(parser, buf, i, Inner::ReqCcEot);
                    });
                    i_jmp!(parser, Inner::ReqCcExt);
                }
                b'n' => {
                    try_str!(parser, buf, i, b"no-cache", {
                        cc.no_cache = true;
                        i_enter!(parser, buf, i, Inner::ReqCcEot);
                    });
                    try_str!(parser, buf, i, b"no-store", {
                        cc.no_store = true;
                        i_enter!(parser, buf, i, Inner::ReqCcEot);
                    });
                    try_str!(parser, buf, i, b"no-transform", {
                        cc.no_transform = true;
                        i_enter!(parser, buf, i, Inner::ReqCcEot);
                    });
                    i_jmp!(parser, Inner::ReqCcExt);
                }
                b'o' => {
                    try_str!(parser, buf, i, b"only-if-cached", {
                        cc.only_if_cached = true;
                        i_enter!(parser, buf, i, Inner::ReqCcEot);
                    });
                    i_jmp!(parser, Inner::ReqCcExt);
                }
                _ => i_jmp!(parser, Inner::ReqCcExt),
            },
            Inner::ReqCcMaxAge => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::list_delim)? {
                    Scanned::Int { consumed, .. } => {
                        cc.max_age = acc;
                        i += consumed;
                        i_enter!(parser, buf, i, Inner::ReqCcEot);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ReqCcMinFresh => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::list_delim)? {
                    Scanned::Int { consumed, .. } => {
                        cc.min_fresh = acc;
                        i += consumed;
                        i_enter!(parser, buf, i, Inner::ReqCcEot);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ReqCcExt => match field::ext(buf, i) {
                field::Sep::Eot(j) => {
                    i = j;
                    i_jmp!(parser, Inner::ReqCcEot);
                }
                field::Sep::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::ReqCcEol);
                }
                field::Sep::Postpone => return Ok(Field::Postpone),
            },
            Inner::ReqCcEot => match field::eot(buf, i, true)? {
                field::Term::Token(j) => {
                    i = j;
                    i_jmp!(parser, Inner::ReqCc);
                }
                field::Term::Ext(j) => {
                    i = j;
                    i_enter!(parser, buf, i, Inner::ReqCcExt);
                }
                field::Term::Eol(j) => {
                    i = j;
                    i_jmp!(parser, Inner::ReqCcEol);
                }
                field::Term::Postpone => return Ok(Field::Postpone),
            },
            Inner::ReqCcEol => return eol(parser, buf, i, at),
            _ => unreachable!("cache-control sub-parser entered in {:?}", parser.inner),
        }
    }
}

/// `X-Forwarded-For` value: a non-empty comma-separated list of node
/// identifiers. Characters are validated individually; the node ids
/// themselves are kept opaque in the header slot.
fn x_forwarded_for(parser: &mut Parser, buf: &Bytes, at: usize) -> super::field::FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::Xff => {
                let c = buf[i];
                if scan::is_ows(c) {
                    i_move!(parser, buf, i, Inner::Xff);
                }
                if scan::is_xff_char(c) {
                    i_jmp!(parser, Inner::XffNodeId);
                }
                return Err(Reject::Neq);
            }
            Inner::XffNodeId => {
                if scan::is_xff_char(buf[i]) {
                    i_move!(parser, buf, i, Inner::XffNodeId);
                }
                i_jmp!(parser, Inner::XffSep);
            }
            Inner::XffSep => {
                let c = buf[i];
                if c == b'\r' {
                    i_jmp!(parser, Inner::XffEol);
                }
                if scan::is_ows(c) {
                    i_move!(parser, buf, i, Inner::XffSep);
                }
                if c == b',' {
                    i_move!(parser, buf, i, Inner::Xff);
                }
                return Err(Reject::Neq);
            }
            Inner::XffEol => {
                parser.mark_line_end(i - at);
                loop {
                    if i >= buf.len() {
                        return Ok(Field::Postpone);
                    }
                    match buf[i] {
                        b'\r' => i += 1,
                        b'\n' => return Ok(Field::Done(i + 1 - at)),
                        _ => return Err(Reject::Neq),
                    }
                }
            }
            _ => unreachable!("x-forwarded-for sub-parser entered in {:?}", parser.inner),
        }
    }
}

fn first_token_byte(parser: &Parser, buf: &Bytes, i: usize) -> u8 {
    parser.carry.first().unwrap_or(buf[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(raw: &[u8]) -> (Verdict, Request) {
        let mut req = Request::new();
        let buf = Bytes::copy_from_slice(raw);
        let v = req.parse(&buf);
        (v, req)
    }

    #[test]
    fn minimal_get() {
        let (v, req) = parse_one(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.version(), Version::HTTP_11);
        assert_eq!(req.uri_path(), &b"/"[..]);
        assert_eq!(req.host(), &b"a"[..]);
        assert!(req.body().is_empty());
        assert_eq!(req.content_length(), 0);
        assert_eq!(req.data_off(), 27);
    }

    #[test]
    fn unsupported_method_blocks() {
        let (v, req) = parse_one(b"PUT / HTTP/1.1\r\n\r\n");
        assert_eq!(v, Verdict::Block);
        assert!(req.error().is_some());
    }

    #[test]
    fn absolute_uri_sets_authority() {
        let (v, req) = parse_one(b"GET http://example.com:8080/p/q HTTP/1.0\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.host(), &b"example.com"[..]);
        assert_eq!(req.port(), &b"8080"[..]);
        assert_eq!(req.uri_path(), &b"/p/q"[..]);
        assert_eq!(req.version(), Version::HTTP_10);
    }

    #[test]
    fn absolute_uri_wins_over_host_header() {
        let (v, req) = parse_one(b"GET http://a/ HTTP/1.1\r\nHost: b:99\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.host(), &b"a"[..]);
        assert!(req.port().is_empty());
        assert_eq!(req.headers().known()[Request::HDR_HOST], b"Host: b:99"[..]);
    }

    #[test]
    fn host_header_port() {
        let (v, req) = parse_one(b"GET / HTTP/1.1\r\nHost: a.example:8080\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.host(), &b"a.example"[..]);
        assert_eq!(req.port(), &b"8080"[..]);
    }

    #[test]
    fn query_and_fragment_accepted_in_target() {
        let (v, req) = parse_one(b"GET /a/b?x=1#f HTTP/1.1\r\nHost: a\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.uri_path(), &b"/a/b?x=1#f"[..]);
    }

    #[test]
    fn content_length_body() {
        let (v, req) = parse_one(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.content_length(), 5);
        assert_eq!(req.body(), &b"hello"[..]);
    }

    #[test]
    fn chunked_body_with_extension() {
        let (v, req) = parse_one(
            b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5;n=1\r\nhello\r\n0\r\n\r\n",
        );
        assert_eq!(v, Verdict::Pass);
        assert!(req.is_chunked());
        assert_eq!(req.body(), &b"hello"[..]);
    }

    #[test]
    fn conflicting_connection_blocks() {
        let (v, _) = parse_one(b"GET / HTTP/1.1\r\nConnection: close, keep-alive\r\n\r\n");
        assert_eq!(v, Verdict::Block);
    }

    #[test]
    fn connection_close_flag() {
        let (v, req) = parse_one(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert!(req.is_conn_close());
        assert!(!req.is_conn_keep_alive());
    }

    #[test]
    fn cache_control_directives() {
        let (v, req) = parse_one(
            b"GET / HTTP/1.1\r\nCache-Control: no-cache, max-age=60, min-fresh=5, ext=1\r\n\r\n",
        );
        assert_eq!(v, Verdict::Pass);
        let cc = req.cache_control();
        assert!(cc.no_cache);
        assert_eq!(cc.max_age, 60);
        assert_eq!(cc.min_fresh, 5);
        assert!(!cc.no_store);
    }

    #[test]
    fn unknown_headers_stored_raw() {
        let (v, req) = parse_one(b"GET / HTTP/1.1\r\nHost: a\r\nX-Custom: a, b\r\nCookie: k=v\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.headers().raw().len(), 2);
        assert_eq!(req.headers().raw()[0], b"X-Custom: a, b"[..]);
        assert_eq!(req.headers().raw()[1], b"Cookie: k=v"[..]);
    }

    #[test]
    fn known_prefix_with_early_colon_blocks() {
        let (v, _) = parse_one(b"GET / HTTP/1.1\r\nHo: x\r\n\r\n");
        assert_eq!(v, Verdict::Block);
    }

    #[test]
    fn obs_fold_value_accepted() {
        let (v, req) = parse_one(b"GET / HTTP/1.1\r\nContent-Length:\r\n 5\r\n\r\nhello");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.content_length(), 5);
        assert_eq!(req.body(), &b"hello"[..]);
    }

    #[test]
    fn empty_chunked_body_passes() {
        let (v, req) =
            parse_one(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert!(req.body().is_empty());
    }

    #[test]
    fn chunked_trailers_reenter_header_parsing() {
        let (v, req) = parse_one(
            b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\nX-T: 1\r\n\r\n",
        );
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.body(), &b"abc"[..]);
        assert_eq!(req.headers().raw().len(), 1);
        assert_eq!(req.headers().raw()[0], b"X-T: 1"[..]);
    }

    #[test]
    fn leading_crlf_skipped() {
        let (v, req) = parse_one(b"\r\n\r\nGET / HTTP/1.1\r\nHost: a\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(req.method(), &Method::GET);
    }

    #[test]
    fn xff_stored_in_known_slot() {
        let (v, req) =
            parse_one(b"GET / HTTP/1.1\r\nX-Forwarded-For: 10.0.0.1, [::1]:8080\r\n\r\n");
        assert_eq!(v, Verdict::Pass);
        assert_eq!(
            req.headers().known()[Request::HDR_X_FORWARDED_FOR],
            b"X-Forwarded-For: 10.0.0.1, [::1]:8080"[..]
        );
    }

    #[test]
    fn empty_xff_blocks() {
        let (v, _) = parse_one(b"GET / HTTP/1.1\r\nX-Forwarded-For: \r\n\r\n");
        assert_eq!(v, Verdict::Block);
    }
}
