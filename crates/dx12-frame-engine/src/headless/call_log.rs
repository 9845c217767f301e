use crate::error::InitStage;
use crate::graphics_api::DescriptorHandle;
use crate::graphics_api::ResourceState;
use crate::graphics_api::SwapChainDesc;

/// One call made into the simulated backend, in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateDevice,
    CreateCommandQueue,
    CreateCommandAllocator { allocator: usize },
    CreateCommandList { allocator: usize },
    CloseCommandList,
    CreateSwapChain { desc: SwapChainDesc },
    GetBackBuffer { buffer: u32 },
    CreateRtvHeap { descriptors: u32 },
    CreateRenderTargetView { buffer: u32, handle: DescriptorHandle },
    CreateFence { initial_value: u64 },
    CreateFenceEvent,
    ResetCommandAllocator { allocator: usize },
    ResetCommandList { allocator: usize },
    Transition { buffer: u32, before: ResourceState, after: ResourceState },
    SetRenderTarget { handle: DescriptorHandle },
    ClearRenderTarget { handle: DescriptorHandle, color: [f32; 4] },
    ExecuteCommandList,
    Present { sync_interval: u32 },
    GetCurrentBackBufferIndex,
    Signal { value: u64 },
    SetEventOnCompletion { value: u64 },
    WaitForEvent { value: u64 },
    CloseFenceEvent,
}

impl ApiCall {
    /// The initialization stage a creation call belongs to.
    pub fn init_stage(&self) -> Option<InitStage> {
        match self {
            ApiCall::CreateDevice => Some(InitStage::Device),
            ApiCall::CreateCommandQueue
            | ApiCall::CreateCommandAllocator { .. }
            | ApiCall::CreateCommandList { .. } => Some(InitStage::CommandObjects),
            ApiCall::CreateSwapChain { .. } => Some(InitStage::SwapChain),
            ApiCall::CreateRtvHeap { .. }
            | ApiCall::GetBackBuffer { .. }
            | ApiCall::CreateRenderTargetView { .. } => Some(InitStage::RenderTargets),
            ApiCall::CreateFence { .. } | ApiCall::CreateFenceEvent => Some(InitStage::Fence),
            _ => None,
        }
    }
}

/// A rule of the real API that a caller broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    ExecuteWhileRecording,
    ResetWhileRecording,
    CloseWhileClosed,
    RecordWhileClosed,
    AllocatorInFlight { allocator: usize },
    AllocatorResetWhileRecording { allocator: usize },
    BarrierStateMismatch { buffer: u32, expected: ResourceState, actual: ResourceState },
    BarrierOnInactiveBuffer { buffer: u32, current: u32 },
    TargetNotCurrent { handle: DescriptorHandle },
    ClearOutsideRenderTargetState { buffer: u32 },
    PresentFromState { buffer: u32, state: ResourceState },
    SignalNotIncreasing { value: u64, last: u64 },
    WaitWithoutArm,
    WaitNeverSignalled { value: u64 },
    ViewOutsideHeap { handle: DescriptorHandle },
}
