/// Order in which the simulated swapchain hands out back buffers after each present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PresentOrder {
    /// `0, 1, 0, 1, ...` starting after the initial buffer.
    #[default]
    RoundRobin,
    /// The listed indices, cycled. Values may lie outside the buffer count.
    Scripted(Vec<u32>),
}

/// How quickly the simulated GPU finishes submitted work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuTiming {
    /// Every signal completes as soon as it is queued.
    #[default]
    Instant,
    /// A signal queued behind unfinished work completes only once the CPU waits for it.
    Lagging,
}

/// A backend call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    CreateDevice,
    CreateCommandQueue,
    CreateCommandAllocator,
    CreateCommandList,
    CloseCommandList,
    CreateSwapChain,
    CreateRtvHeap,
    GetBackBuffer,
    CreateFence,
    CreateFenceEvent,
    ResetCommandAllocator,
    ResetCommandList,
    ExecuteCommandList,
    Present,
    Signal,
    SetEventOnCompletion,
    WaitForEvent,
    CloseFenceEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessConfig {
    /// Back buffer the swapchain reports right after creation.
    pub initial_back_buffer: u32,
    pub present_order: PresentOrder,
    pub timing: GpuTiming,
    pub fail_at: Option<FailPoint>,
    pub rtv_descriptor_size: u32,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            initial_back_buffer: 0,
            present_order: PresentOrder::RoundRobin,
            timing: GpuTiming::Instant,
            fail_at: None,
            rtv_descriptor_size: 32,
        }
    }
}
