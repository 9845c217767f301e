use tracing::debug;

use super::FRAME_COUNT;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::InitStep;
use crate::graphics_api::GraphicsApi;

pub(super) struct CommandObjects<A: GraphicsApi> {
    pub command_queue: A::CommandQueue,
    pub command_allocators: [A::CommandAllocator; FRAME_COUNT],
    pub command_list: A::CommandList,
}

// Queue, one allocator per buffered frame, and the shared command list.
pub(super) fn create_command_objects<A: GraphicsApi>(
    api: &A,
    device: &A::Device,
) -> EngineResult<CommandObjects<A>> {
    let command_queue = api
        .create_command_queue(device)
        .map_err(EngineError::init(InitStep::CreateCommandQueue))?;

    let command_allocators: [A::CommandAllocator; FRAME_COUNT] =
        array_init::try_array_init(|_| {
            api.create_command_allocator(device)
                .map_err(EngineError::init(InitStep::CreateCommandAllocator))
        })?;

    let command_list = api
        .create_command_list(device, &command_allocators[0])
        .map_err(EngineError::init(InitStep::CreateCommandList))?;

    // Lists are created recording; the frame loop expects to find it closed.
    api.close_command_list(&command_list)
        .map_err(EngineError::init(InitStep::CloseCommandList))?;

    debug!(allocators = FRAME_COUNT, "command objects created");
    Ok(CommandObjects {
        command_queue,
        command_allocators,
        command_list,
    })
}
