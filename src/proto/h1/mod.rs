//! HTTP/1 wire parsing: request line, status line, headers, body framing.

#[macro_use]
mod macros;

pub(crate) mod date;
pub(crate) mod decode;
pub(crate) mod field;
pub(crate) mod headers;
pub(crate) mod parse;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod scan;

/// Decoded `Cache-Control` directives.
///
/// One structure serves both directions; the response-only directives
/// (`must-revalidate`, `proxy-revalidate`, `public`/`private`,
/// `s-maxage`) stay at their defaults on requests.
///
/// Numeric fields default to `0` when the directive is absent, matching
/// the wire default of "no constraint".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheControl {
    /// `no-cache` was present.
    pub no_cache: bool,
    /// `no-store` was present.
    pub no_store: bool,
    /// `no-transform` was present.
    pub no_transform: bool,
    /// `max-stale` was present (request only).
    pub max_stale: bool,
    /// `only-if-cached` was present (request only).
    pub only_if_cached: bool,
    /// `must-revalidate` was present (response only).
    pub must_revalidate: bool,
    /// `proxy-revalidate` was present (response only).
    pub proxy_revalidate: bool,
    /// `public` or `private` was present (response only).
    pub public: bool,
    /// Value of `max-age=N`.
    pub max_age: u32,
    /// Value of `min-fresh=N` (request only).
    pub min_fresh: u32,
    /// Value of `s-maxage=N` (response only).
    pub s_maxage: u32,
}
