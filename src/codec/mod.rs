pub mod av1;

// Re-export common types and functions
pub use av1::Av1HwDecoder;
pub use av1::Av1Parser;
pub use av1::SequenceHeader;
