//! X10 RF wire protocol module
//!
//! This module implements frame classification, the bit-level X10 decoding
//! tables, and duplicate-transmission suppression.

pub mod codec;
pub mod dedup;
pub mod frame;

pub use self::codec::{decode_command, decode_security, reverse_byte, Command, Security};
pub use self::dedup::DuplicateSuppressor;
pub use self::frame::{classify, FrameKind};
