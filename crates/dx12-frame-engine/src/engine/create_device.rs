use tracing::debug;

use crate::error::EngineError;
use crate::error::EngineResult;
use crate::error::InitStep;
use crate::graphics_api::GraphicsApi;

pub(super) fn create_device<A: GraphicsApi>(api: &mut A) -> EngineResult<A::Device> {
    let device = api
        .create_device()
        .map_err(EngineError::init(InitStep::CreateDevice))?;
    debug!("graphics device created");
    Ok(device)
}
