use tracing::trace;

use super::checked_frame_index;
use super::Engine;
use super::FramePhase;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::FrameOp;
use crate::graphics_api::GraphicsApi;

impl<A: GraphicsApi> Engine<A> {
    /// Signals the fence behind all submitted work and blocks until the GPU reaches it.
    pub(super) fn wait_for_gpu_idle(&mut self) -> EngineResult<()> {
        let fence_event = self.fence_event.as_ref().ok_or(EngineError::CleanedUp)?;

        let target = self.fence_value;
        self.api
            .signal(&self.command_queue, &self.fence, target)
            .map_err(EngineError::runtime(FrameOp::SignalFence))?;
        self.fence_value += 1;

        if self.api.completed_value(&self.fence) < target {
            self.api
                .set_event_on_completion(&self.fence, target, fence_event)
                .map_err(EngineError::runtime(FrameOp::SetEventOnCompletion))?;
            trace!(target, "waiting for fence");
            self.api
                .wait_for_event(fence_event)
                .map_err(EngineError::runtime(FrameOp::WaitForFence))?;
        }
        Ok(())
    }

    /// Drains the GPU, then takes the next frame index from the swapchain.
    pub(super) fn move_to_next_frame(&mut self) -> EngineResult<()> {
        self.wait_for_gpu_idle()?;
        self.frame_index =
            checked_frame_index(self.api.current_back_buffer_index(&self.swap_chain))?;
        self.phase.advance(FramePhase::Synced);
        Ok(())
    }
}
