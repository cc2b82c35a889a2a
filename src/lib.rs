#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(rust_2018_idioms))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # weir
//!
//! weir is a **fast** and **strict** streaming HTTP/1 message parser,
//! built for reverse proxies and traffic filters.
//!
//! ## Design
//!
//! - **Streaming**: input arrives as [`bytes::Bytes`] buffers cut at
//!   arbitrary positions. The parser suspends with [`Verdict::Postpone`]
//!   at a buffer boundary and resumes exactly where it left off, even in
//!   the middle of a token, a header name, an integer, or a chunk size.
//! - **Zero copy**: every parsed field is a [`Str`], an ordered sequence
//!   of refcounted slices of the input buffers. Payload bytes are never
//!   copied.
//! - **Strict**: a single malformed byte yields [`Verdict::Block`]; there
//!   is no partial acceptance and no retry. Ambiguous framing (for
//!   example conflicting `Connection` directives) is rejected.
//!
//! The parser only classifies and structures bytes. It does not perform
//! I/O, generate responses, route requests, or speak HTTP/2.
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use weir::{Request, Verdict};
//!
//! let mut req = Request::new();
//! let buf = Bytes::from_static(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! assert_eq!(req.parse(&buf), Verdict::Pass);
//! assert_eq!(req.method(), &http::Method::GET);
//! assert_eq!(req.host(), &b"example.com"[..]);
//! ```

#[doc(hidden)]
pub use http;

#[macro_use]
mod trace;

mod error;
mod proto;
mod str;

pub use crate::error::Error;
pub use crate::proto::h1::headers::HeaderTable;
pub use crate::proto::h1::request::Request;
pub use crate::proto::h1::response::Response;
pub use crate::proto::h1::CacheControl;
pub use crate::proto::Verdict;
pub use crate::str::Str;
