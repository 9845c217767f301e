use tracing::error;
use tracing::info;

use super::create_command_objects::create_command_objects;
use super::create_command_objects::CommandObjects;
use super::create_device::create_device;
use super::create_fence::create_fence;
use super::create_fence::FIRST_FENCE_VALUE;
use super::create_render_targets::create_render_targets;
use super::create_render_targets::RenderTargets;
use super::create_swap_chain::create_swap_chain;
use super::CommandListState;
use super::Engine;
use super::FramePhase;
use crate::error::EngineResult;
use crate::graphics_api::GraphicsApi;

impl<A: GraphicsApi> Engine<A> {
    /// Runs the initialization sequence against `window`.
    ///
    /// Device, command objects, swapchain, render target views and fence are
    /// created strictly in that order. The first failure stops the sequence;
    /// whatever was created so far is released and only the error is returned.
    pub fn initialize(mut api: A, window: A::Window, width: u32, height: u32) -> EngineResult<Self> {
        match Self::create_objects(&mut api, window, width, height) {
            Ok(objects) => {
                let engine = Self::assemble(api, window, width, height, objects);
                info!(
                    width,
                    height,
                    frame_index = engine.frame_index,
                    "engine initialized"
                );
                Ok(engine)
            }
            Err(e) => {
                error!("Initialization failed: {}", e);
                api.flush_debug_messages();
                Err(e)
            }
        }
    }

    fn create_objects(
        api: &mut A,
        window: A::Window,
        width: u32,
        height: u32,
    ) -> EngineResult<CreatedObjects<A>> {
        let device = create_device(api)?;
        let command_objects = create_command_objects(api, &device)?;
        let (swap_chain, frame_index) =
            create_swap_chain(api, &command_objects.command_queue, window, width, height)?;
        let render_targets = create_render_targets(api, &device, &swap_chain)?;
        let (fence, fence_event) = create_fence(api, &device)?;
        Ok(CreatedObjects {
            device,
            command_objects,
            swap_chain,
            frame_index,
            render_targets,
            fence,
            fence_event,
        })
    }

    fn assemble(
        api: A,
        window: A::Window,
        width: u32,
        height: u32,
        objects: CreatedObjects<A>,
    ) -> Self {
        let CreatedObjects {
            device,
            command_objects,
            swap_chain,
            frame_index,
            render_targets,
            fence,
            fence_event,
        } = objects;
        Engine {
            fence_event: Some(fence_event),
            fence,
            render_targets: render_targets.render_targets,
            rtv_heap: render_targets.rtv_heap,
            swap_chain,
            command_list: command_objects.command_list,
            command_allocators: command_objects.command_allocators,
            command_queue: command_objects.command_queue,
            device,
            api,
            window,
            width,
            height,
            rtv_descriptor_size: render_targets.rtv_descriptor_size,
            frame_index,
            fence_value: FIRST_FENCE_VALUE,
            command_list_state: CommandListState::Closed,
            phase: FramePhase::Idle,
            frames_rendered: 0,
        }
    }
}

struct CreatedObjects<A: GraphicsApi> {
    device: A::Device,
    command_objects: CommandObjects<A>,
    swap_chain: A::SwapChain,
    frame_index: u32,
    render_targets: RenderTargets<A>,
    fence: A::Fence,
    fence_event: A::FenceEvent,
}
