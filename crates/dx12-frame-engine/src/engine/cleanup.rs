use tracing::error;
use tracing::info;

use super::Engine;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::FrameOp;
use crate::graphics_api::GraphicsApi;

impl<A: GraphicsApi> Engine<A> {
    /// Drains the GPU one last time and closes the fence event.
    ///
    /// Must run before the engine is dropped. Calling it again is a no-op.
    /// A failed drain is returned and the event is left to the engine's drop.
    pub fn cleanup(&mut self) -> EngineResult<()> {
        if self.is_cleaned_up() {
            return Ok(());
        }
        self.wait_for_gpu_idle()?;
        if let Some(fence_event) = self.fence_event.take() {
            self.api
                .close_fence_event(fence_event)
                .map_err(EngineError::runtime(FrameOp::CloseFenceEvent))?;
        }
        info!(frames = self.frames_rendered, "engine cleaned up");
        Ok(())
    }
}

impl<A: GraphicsApi> Drop for Engine<A> {
    fn drop(&mut self) {
        if !self.is_cleaned_up() {
            if let Err(e) = self.cleanup() {
                error!("Error waiting for GPU idle on drop: {}", e);
            }
        }
    }
}
