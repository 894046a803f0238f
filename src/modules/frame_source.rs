use std::ops::{Deref, DerefMut};
use std::path::Path;
use anyhow::Error;
use crate::error::AnalysisError;

/// VideoSource opens videos as streams of frames.
pub trait VideoSource: Send + Sync {
    type Frame;
    type Stream: FrameStream<Frame = Self::Frame>;

    /// open fails with `AnalysisError::SourceUnavailable` when the video
    /// cannot be opened.
    fn open(&self, path: &Path) -> Result<Self::Stream, AnalysisError>;
}

/// FrameStream yields the frames of one opened video in order.
pub trait FrameStream {
    type Frame;

    /// next_frame returns `Ok(None)` at the end of the stream.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error>;

    /// close releases the underlying handle. Calling it twice is a no-op.
    fn close(&mut self);
}

/// StreamGuard closes the wrapped stream when it goes out of scope.
pub struct StreamGuard<S: FrameStream> {
    stream: S,
}

impl<S: FrameStream> StreamGuard<S> {
    pub fn new(stream: S) -> Self {
        StreamGuard { stream }
    }
}

impl<S: FrameStream> Deref for StreamGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.stream
    }
}

impl<S: FrameStream> DerefMut for StreamGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: FrameStream> Drop for StreamGuard<S> {
    fn drop(&mut self) {
        self.stream.close();
    }
}
