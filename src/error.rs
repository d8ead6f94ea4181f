// error.rs - error taxonomy for the RADIUS codec
//
// Packet-level errors abort parsing or serialization outright. Per-attribute
// problems (unknown dictionary entries, undecodable values on inbound
// packets) are never raised as errors here; they are logged and the
// attribute is simply omitted, matching FreeRADIUS's own tolerance.

use std::io;

/// Errors the codec can return from `parse`, `serialize`, and dictionary
/// loading.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The `Length` field in the header disagrees with the number of bytes
    /// actually supplied, or the header itself is too short/malformed to
    /// read at all (truncated header, unrecognized packet code).
    #[error("invalid framing: {0}")]
    InvalidFraming(String),

    /// The Request Authenticator recomputed over an Accounting-Request or
    /// Disconnect-Request does not match the one on the wire. Usually means
    /// the shared secret is wrong.
    #[error("invalid request authenticator (check the shared secret)")]
    InvalidRequestAuthenticator,

    /// The Message-Authenticator attribute did not verify under HMAC-MD5.
    #[error("invalid message authenticator")]
    InvalidMessageAuthenticator,

    /// An attribute's declared length would run past the end of the packet.
    #[error("malformed attribute at offset {offset}: length {length} exceeds remaining packet data")]
    MalformedAttribute { offset: usize, length: usize },

    /// `serialize` was asked to encode an attribute name the dictionary
    /// does not know. Fatal on outbound; inbound dictionary misses are
    /// recoverable and do not produce this error.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The encoder has no rule for turning this value into wire bytes.
    #[error("unsupported attribute type for {name}: {reason}")]
    UnsupportedAttributeType { name: String, reason: String },

    /// A dictionary line could not be safely skipped (e.g. an `ATTRIBUTE`
    /// line referencing a vendor context that was never opened).
    #[error("dictionary parse error in {file}:{line}: {reason}")]
    DictionaryParse {
        file: String,
        line: usize,
        reason: String,
    },

    /// Reading a dictionary file, or a caller-supplied byte stream for TCP
    /// framing, failed at the I/O layer.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
