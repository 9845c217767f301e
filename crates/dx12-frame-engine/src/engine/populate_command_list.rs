use super::CommandListState;
use super::Engine;
use super::FramePhase;
use super::CLEAR_COLOR;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::FrameOp;
use crate::graphics_api::GraphicsApi;
use crate::graphics_api::ResourceState;

impl<A: GraphicsApi> Engine<A> {
    /// Records the clear of the current back buffer into the shared command list.
    pub(super) fn populate_command_list(&mut self) -> EngineResult<()> {
        let index = self.frame_index as usize;

        // Only safe because the previous frame ended with a full GPU drain.
        let command_allocator = &self.command_allocators[index];
        self.api
            .reset_command_allocator(command_allocator)
            .map_err(EngineError::runtime(FrameOp::ResetCommandAllocator))?;

        let command_list = &self.command_list;
        self.api
            .reset_command_list(command_list, command_allocator)
            .map_err(EngineError::runtime(FrameOp::ResetCommandList))?;
        self.command_list_state = CommandListState::Recording;
        self.phase.advance(FramePhase::Recording);

        let render_target = &self.render_targets[index];
        self.api.transition(
            command_list,
            &render_target.resource,
            ResourceState::Present,
            ResourceState::RenderTarget,
        );
        self.api.set_render_target(command_list, render_target.rtv);
        self.api
            .clear_render_target(command_list, render_target.rtv, CLEAR_COLOR);
        self.api.transition(
            command_list,
            &render_target.resource,
            ResourceState::RenderTarget,
            ResourceState::Present,
        );

        self.api
            .close_command_list(command_list)
            .map_err(EngineError::runtime(FrameOp::CloseCommandList))?;
        self.command_list_state = CommandListState::Closed;
        Ok(())
    }
}
