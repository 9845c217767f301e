use tracing::debug;

use super::checked_frame_index;
use super::FRAME_COUNT;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::InitStep;
use crate::graphics_api::GraphicsApi;
use crate::graphics_api::SwapChainDesc;

/// Creates the swapchain and returns it with the back buffer it reports as current.
pub(super) fn create_swap_chain<A: GraphicsApi>(
    api: &A,
    command_queue: &A::CommandQueue,
    window: A::Window,
    width: u32,
    height: u32,
) -> EngineResult<(A::SwapChain, u32)> {
    let desc = SwapChainDesc::new(FRAME_COUNT as u32, width, height);
    let swap_chain = api
        .create_swap_chain(command_queue, window, &desc)
        .map_err(EngineError::init(InitStep::CreateSwapChain))?;

    let frame_index = checked_frame_index(api.current_back_buffer_index(&swap_chain))?;
    debug!(width, height, frame_index, "swapchain created");
    Ok((swap_chain, frame_index))
}
