use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecType {
    AV1,
}

pub trait CodecData: Send + Sync {
    fn codec_type(&self) -> CodecType;
    fn width(&self) -> Option<u32>;
    fn height(&self) -> Option<u32>;
    fn extra_data(&self) -> Option<&[u8]>;
}

/// A decoder fed one access unit at a time.
#[async_trait]
pub trait VideoDecoder: Send {
    type Frame: Send;

    /// Decodes one access unit; `None` when it produced no picture.
    async fn decode(&mut self, data: Bytes) -> crate::Result<Option<Self::Frame>>;
    fn close(&mut self);
}
