use tracing::debug;

use super::RenderTarget;
use super::FRAME_COUNT;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::InitStep;
use crate::graphics_api::GraphicsApi;

pub(super) struct RenderTargets<A: GraphicsApi> {
    pub rtv_heap: A::DescriptorHeap,
    pub rtv_descriptor_size: u32,
    pub render_targets: [RenderTarget<A>; FRAME_COUNT],
}

pub(super) fn create_render_targets<A: GraphicsApi>(
    api: &A,
    device: &A::Device,
    swap_chain: &A::SwapChain,
) -> EngineResult<RenderTargets<A>> {
    let rtv_heap = api
        .create_rtv_heap(device, FRAME_COUNT as u32)
        .map_err(EngineError::init(InitStep::CreateRtvHeap))?;
    let rtv_descriptor_size = api.rtv_descriptor_size(device);
    let heap_start = api.rtv_heap_start(&rtv_heap);

    let render_targets: [RenderTarget<A>; FRAME_COUNT] = array_init::try_array_init(|i| {
        let index = i as u32;
        let resource = api
            .get_back_buffer(swap_chain, index)
            .map_err(EngineError::init(InitStep::GetSwapChainBuffer))?;
        let rtv = heap_start.offset(index, rtv_descriptor_size);
        api.create_render_target_view(device, &resource, rtv);
        Ok::<_, EngineError>(RenderTarget { resource, rtv })
    })?;

    debug!(rtv_descriptor_size, "render target views created");
    Ok(RenderTargets {
        rtv_heap,
        rtv_descriptor_size,
        render_targets,
    })
}
