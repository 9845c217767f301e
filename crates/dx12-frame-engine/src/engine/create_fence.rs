use tracing::debug;

use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::InitStep;
use crate::graphics_api::GraphicsApi;

/// The GPU fence starts at 0; the first value the engine signals is 1.
pub(super) const FIRST_FENCE_VALUE: u64 = 1;

pub(super) fn create_fence<A: GraphicsApi>(
    api: &A,
    device: &A::Device,
) -> EngineResult<(A::Fence, A::FenceEvent)> {
    let fence = api
        .create_fence(device, 0)
        .map_err(EngineError::init(InitStep::CreateFence))?;
    let fence_event = api
        .create_fence_event()
        .map_err(EngineError::init(InitStep::CreateFenceEvent))?;
    debug!("fence created");
    Ok((fence, fence_event))
}
