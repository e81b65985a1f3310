use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Av1HwError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("parser error: {0}")]
    Parser(String),

    /// The bitstream buffer could not grow to hold `requested` bytes.
    #[error("out of memory: cannot grow bitstream buffer to {requested} bytes")]
    OutOfMemory { requested: usize },

    /// Frame end was reached after an append for the same frame failed.
    #[error("frame abandoned after a failed bitstream append")]
    FrameAbandoned,

    /// Failure reported by the hardware decode session.
    #[error("decode session error: {0}")]
    Session(String),

    /// A callback arrived after the decode session was closed.
    #[error("decode session is closed")]
    SessionClosed,

    #[error("parse int error: {0}")]
    ParseInt(#[from] ParseIntError),
}

pub type Result<T> = std::result::Result<T, Av1HwError>;
