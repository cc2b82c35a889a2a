//! Pieces pertaining to the HTTP message protocol.

pub(crate) mod h1;

/// The outcome of feeding one input buffer to a message parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The buffer completed the message. `data_off()` holds the number
    /// of bytes consumed; the remainder of the buffer belongs to the
    /// next message (see `inherit_offset`).
    Pass,
    /// The buffer was exhausted mid-message; call `parse` again with the
    /// next buffer.
    Postpone,
    /// Protocol error. The message is invalid and the connection should
    /// be dropped. No retry is possible.
    Block,
}
