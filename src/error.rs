//! Error types for encode and decode sessions.
//!
//! This module provides the [`CodecError`] type covering the failure modes
//! of the codec, along with a convenient [`Result<T>`] alias.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Stream | [`CorruptStream`] | Decoded bits match no symbol of the current code |
//! | Session | [`SessionActive`], [`NoSession`] | Encode/decode calls out of order |
//! | Resources | [`Alloc`] | Output buffer reservation failed |
//! | Setup | [`AlphabetSize`] | Model constructed with an unsupported alphabet |
//!
//! Everything inside the per-symbol hot path is expected to succeed by
//! construction; the only error a healthy stream can surface during
//! decoding is [`CorruptStream`].
//!
//! [`CorruptStream`]: CodecError::CorruptStream
//! [`SessionActive`]: CodecError::SessionActive
//! [`NoSession`]: CodecError::NoSession
//! [`Alloc`]: CodecError::Alloc
//! [`AlphabetSize`]: CodecError::AlphabetSize

use thiserror::Error;

/// Error type for codec operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The decoded bit pattern does not correspond to any symbol of the
    /// model's current code.
    ///
    /// This means the input bytes were corrupted, truncated in the middle
    /// of a code, or decoded with a model whose update history diverged
    /// from the encoder's. The session cannot continue; every later symbol
    /// would be garbage.
    #[error("corrupt bitstream: decoded bits match no symbol of the current code")]
    CorruptStream,

    /// Reserving the output buffer failed.
    ///
    /// Reported from `start_encoding`; the session is aborted and the
    /// codec stays idle.
    #[error("failed to reserve {bytes} bytes for the output buffer")]
    Alloc {
        /// Number of bytes the reservation asked for.
        bytes: usize,
    },

    /// A new session was started while another one is still open.
    ///
    /// A codec instance drives exactly one encode pass or one decode pass
    /// at a time; close the current session with `stop_encoding` /
    /// `stop_decoding` first.
    #[error("a coding session is already active on this codec")]
    SessionActive,

    /// A session-level call arrived without a matching open session.
    ///
    /// The `&str` names the expected session kind (`"encode"` or
    /// `"decode"`).
    #[error("no active {0} session")]
    NoSession(&'static str),

    /// A model was constructed with an alphabet size outside `1..=8192`.
    #[error("unsupported alphabet size {total_syms} (supported: 1..=8192)")]
    AlphabetSize {
        /// The rejected alphabet size.
        total_syms: usize,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;
