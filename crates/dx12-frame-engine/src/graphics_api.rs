//! The GPU/OS capability set the engine is written against.
//!
//! Everything the engine needs from the platform graphics subsystem goes
//! through [`GraphicsApi`]: device creation, a queue with allocators and a
//! command list that has explicit open/closed recording states, resource
//! transition barriers, a swapchain with a queryable current back buffer, and a
//! fence with a blocking wait. Object types are associated types so each
//! backend keeps its own owned handles (COM pointers on Direct3D 12).

/// CPU address of a descriptor inside a descriptor heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DescriptorHandle {
    pub ptr: usize,
}

impl DescriptorHandle {
    /// Handle `index` descriptors past `self`, each `stride` bytes wide.
    pub fn offset(self, index: u32, stride: u32) -> Self {
        Self {
            ptr: self.ptr + (index as usize) * (stride as usize),
        }
    }
}

/// Usage state of a back buffer, as far as barriers are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Present,
    RenderTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8Unorm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapEffect {
    FlipDiscard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapChainDesc {
    pub buffer_count: u32,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub swap_effect: SwapEffect,
    pub sample_count: u32,
}

impl SwapChainDesc {
    pub fn new(buffer_count: u32, width: u32, height: u32) -> Self {
        Self {
            buffer_count,
            width,
            height,
            format: PixelFormat::Rgba8Unorm,
            swap_effect: SwapEffect::FlipDiscard,
            sample_count: 1,
        }
    }
}

pub trait GraphicsApi {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Native window the swapchain presents into.
    type Window: Copy;

    type Device;
    type CommandQueue;
    type CommandAllocator;
    type CommandList;
    type SwapChain;
    type DescriptorHeap;
    type Resource;
    type Fence;
    /// Owns the OS event; dropping it releases the event.
    type FenceEvent;

    // Creation

    fn create_device(&mut self) -> Result<Self::Device, Self::Error>;

    /// Creates a direct (graphics capable) queue.
    fn create_command_queue(&self, device: &Self::Device) -> Result<Self::CommandQueue, Self::Error>;

    fn create_command_allocator(
        &self,
        device: &Self::Device,
    ) -> Result<Self::CommandAllocator, Self::Error>;

    /// Creates a command list in the recording state, with no pipeline state bound.
    fn create_command_list(
        &self,
        device: &Self::Device,
        allocator: &Self::CommandAllocator,
    ) -> Result<Self::CommandList, Self::Error>;

    fn create_swap_chain(
        &self,
        queue: &Self::CommandQueue,
        window: Self::Window,
        desc: &SwapChainDesc,
    ) -> Result<Self::SwapChain, Self::Error>;

    fn get_back_buffer(
        &self,
        swap_chain: &Self::SwapChain,
        index: u32,
    ) -> Result<Self::Resource, Self::Error>;

    fn create_rtv_heap(
        &self,
        device: &Self::Device,
        descriptor_count: u32,
    ) -> Result<Self::DescriptorHeap, Self::Error>;

    fn rtv_descriptor_size(&self, device: &Self::Device) -> u32;

    fn rtv_heap_start(&self, heap: &Self::DescriptorHeap) -> DescriptorHandle;

    fn create_render_target_view(
        &self,
        device: &Self::Device,
        resource: &Self::Resource,
        handle: DescriptorHandle,
    );

    fn create_fence(&self, device: &Self::Device, initial_value: u64) -> Result<Self::Fence, Self::Error>;

    /// Creates the auto-reset OS event used to wait on the fence.
    fn create_fence_event(&self) -> Result<Self::FenceEvent, Self::Error>;

    // Recording

    fn reset_command_allocator(&self, allocator: &Self::CommandAllocator) -> Result<(), Self::Error>;

    fn reset_command_list(
        &self,
        list: &Self::CommandList,
        allocator: &Self::CommandAllocator,
    ) -> Result<(), Self::Error>;

    fn transition(
        &self,
        list: &Self::CommandList,
        resource: &Self::Resource,
        before: ResourceState,
        after: ResourceState,
    );

    fn set_render_target(&self, list: &Self::CommandList, rtv: DescriptorHandle);

    fn clear_render_target(&self, list: &Self::CommandList, rtv: DescriptorHandle, color: [f32; 4]);

    fn close_command_list(&self, list: &Self::CommandList) -> Result<(), Self::Error>;

    // Submission and presentation

    fn execute_command_list(
        &self,
        queue: &Self::CommandQueue,
        list: &Self::CommandList,
    ) -> Result<(), Self::Error>;

    fn present(&self, swap_chain: &Self::SwapChain, sync_interval: u32) -> Result<(), Self::Error>;

    fn current_back_buffer_index(&self, swap_chain: &Self::SwapChain) -> u32;

    // Synchronization

    fn signal(
        &self,
        queue: &Self::CommandQueue,
        fence: &Self::Fence,
        value: u64,
    ) -> Result<(), Self::Error>;

    fn completed_value(&self, fence: &Self::Fence) -> u64;

    fn set_event_on_completion(
        &self,
        fence: &Self::Fence,
        value: u64,
        event: &Self::FenceEvent,
    ) -> Result<(), Self::Error>;

    /// Blocks the calling thread until `event` fires. No timeout.
    fn wait_for_event(&self, event: &Self::FenceEvent) -> Result<(), Self::Error>;

    /// Releases `event` now rather than when it is dropped.
    fn close_fence_event(&self, event: Self::FenceEvent) -> Result<(), Self::Error>;

    /// Emits whatever diagnostics the backend buffered (debug layer messages).
    fn flush_debug_messages(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_offset_is_stride_times_index() {
        let start = DescriptorHandle { ptr: 0x1000 };
        assert_eq!(start.offset(0, 32), start);
        assert_eq!(start.offset(1, 32).ptr, 0x1020);
        assert_eq!(start.offset(3, 64).ptr, 0x1000 + 192);
    }

    #[test]
    fn swap_chain_desc_defaults_to_flip_discard_single_sample() {
        let desc = SwapChainDesc::new(2, 1280, 720);
        assert_eq!(desc.format, PixelFormat::Rgba8Unorm);
        assert_eq!(desc.swap_effect, SwapEffect::FlipDiscard);
        assert_eq!(desc.sample_count, 1);
    }
}
