use tracing::trace;

use super::CommandListState;
use super::Engine;
use super::FramePhase;
use super::PRESENT_SYNC_INTERVAL;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::FrameOp;
use crate::graphics_api::GraphicsApi;

impl<A: GraphicsApi> Engine<A> {
    /// Renders one frame: record, submit, present, then drain the GPU.
    ///
    /// Returns only once the GPU has finished the frame and `frame_index`
    /// names the back buffer the swapchain will hand out next.
    pub fn render_frame(&mut self) -> EngineResult<()> {
        if self.is_cleaned_up() {
            return Err(EngineError::CleanedUp);
        }
        // A failed frame is fatal; anything after it starts from scratch.
        self.phase = FramePhase::Idle;

        self.populate_command_list()?;
        self.submit()?;
        self.present()?;
        self.move_to_next_frame()?;

        self.phase.advance(FramePhase::Idle);
        self.frames_rendered += 1;
        trace!(
            frame = self.frames_rendered,
            frame_index = self.frame_index,
            "frame complete"
        );
        Ok(())
    }

    pub(crate) fn submit(&mut self) -> EngineResult<()> {
        if self.command_list_state != CommandListState::Closed {
            return Err(EngineError::CommandListOpen);
        }
        self.api
            .execute_command_list(&self.command_queue, &self.command_list)
            .map_err(EngineError::runtime(FrameOp::ExecuteCommandList))?;
        self.phase.advance(FramePhase::Submitted);
        Ok(())
    }

    fn present(&mut self) -> EngineResult<()> {
        self.api
            .present(&self.swap_chain, PRESENT_SYNC_INTERVAL)
            .map_err(EngineError::runtime(FrameOp::Present))?;
        self.phase.advance(FramePhase::Presented);
        Ok(())
    }
}
