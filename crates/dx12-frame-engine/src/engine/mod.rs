mod cleanup;
mod create_command_objects;
mod create_device;
mod create_fence;
mod create_render_targets;
mod create_swap_chain;
mod initialize;
mod populate_command_list;
mod render_frame;
mod wait_for_gpu;

use crate::error::EngineError;
use crate::error::EngineResult;
use crate::graphics_api::DescriptorHandle;
use crate::graphics_api::GraphicsApi;

/// Number of buffered frames (swapchain buffers, allocators, views).
pub const FRAME_COUNT: usize = 2;

/// RGBA the back buffer is cleared to every frame.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.2, 0.4, 1.0];

/// Present waits for one vertical blank.
pub const PRESENT_SYNC_INTERVAL: u32 = 1;

/// Where the engine is inside one iteration of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    Idle,
    Recording,
    Submitted,
    Presented,
    Synced,
}

impl FramePhase {
    pub fn next(self) -> FramePhase {
        match self {
            FramePhase::Idle => FramePhase::Recording,
            FramePhase::Recording => FramePhase::Submitted,
            FramePhase::Submitted => FramePhase::Presented,
            FramePhase::Presented => FramePhase::Synced,
            FramePhase::Synced => FramePhase::Idle,
        }
    }

    fn advance(&mut self, to: FramePhase) {
        tracing::trace!(from = ?*self, ?to, "frame phase");
        *self = to;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandListState {
    Recording,
    Closed,
}

/// A swapchain back buffer and the view it is rendered through.
pub struct RenderTarget<A: GraphicsApi> {
    pub resource: A::Resource,
    pub rtv: DescriptorHandle,
}

/// Borrowed view of everything belonging to one buffered frame.
pub struct FrameSlot<'a, A: GraphicsApi> {
    pub index: u32,
    pub command_allocator: &'a A::CommandAllocator,
    pub render_target: &'a RenderTarget<A>,
}

pub struct Engine<A: GraphicsApi> {
    // Fields drop top to bottom: per-frame objects first, the device last.
    fence_event: Option<A::FenceEvent>,
    fence: A::Fence,
    render_targets: [RenderTarget<A>; FRAME_COUNT],
    #[allow(dead_code)] // backs the views in `render_targets`
    rtv_heap: A::DescriptorHeap,
    swap_chain: A::SwapChain,
    command_list: A::CommandList,
    command_allocators: [A::CommandAllocator; FRAME_COUNT],
    command_queue: A::CommandQueue,
    #[allow(dead_code)]
    device: A::Device,
    api: A,

    window: A::Window,
    width: u32,
    height: u32,
    rtv_descriptor_size: u32,
    frame_index: u32,
    fence_value: u64,
    command_list_state: CommandListState,
    phase: FramePhase,
    frames_rendered: u64,
}

impl<A: GraphicsApi> Engine<A> {
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// The value the next synchronization will signal.
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }

    pub fn frame_phase(&self) -> FramePhase {
        self.phase
    }

    pub fn command_list_state(&self) -> CommandListState {
        self.command_list_state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn window(&self) -> A::Window {
        self.window
    }

    pub fn rtv_descriptor_size(&self) -> u32 {
        self.rtv_descriptor_size
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.fence_event.is_none()
    }

    pub fn current_slot(&self) -> FrameSlot<'_, A> {
        let index = self.frame_index as usize;
        FrameSlot {
            index: self.frame_index,
            command_allocator: &self.command_allocators[index],
            render_target: &self.render_targets[index],
        }
    }
}

/// Checks a back buffer index reported by the swapchain.
fn checked_frame_index(index: u32) -> EngineResult<u32> {
    if (index as usize) < FRAME_COUNT {
        Ok(index)
    } else {
        Err(EngineError::BackBufferIndexOutOfRange {
            index,
            count: FRAME_COUNT,
        })
    }
}
