use std::fmt;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type EngineResult<T, E = EngineError> = core::result::Result<T, E>;

/// The initialization stages, in the order they must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitStage {
    Device,
    CommandObjects,
    SwapChain,
    RenderTargets,
    Fence,
}

/// The individual calls made while initializing, used to say exactly what failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStep {
    CreateDevice,
    CreateCommandQueue,
    CreateCommandAllocator,
    CreateCommandList,
    CloseCommandList,
    CreateSwapChain,
    CreateRtvHeap,
    GetSwapChainBuffer,
    CreateFence,
    CreateFenceEvent,
}

impl InitStep {
    pub fn stage(self) -> InitStage {
        match self {
            InitStep::CreateDevice => InitStage::Device,
            InitStep::CreateCommandQueue
            | InitStep::CreateCommandAllocator
            | InitStep::CreateCommandList
            | InitStep::CloseCommandList => InitStage::CommandObjects,
            InitStep::CreateSwapChain => InitStage::SwapChain,
            InitStep::CreateRtvHeap | InitStep::GetSwapChainBuffer => InitStage::RenderTargets,
            InitStep::CreateFence | InitStep::CreateFenceEvent => InitStage::Fence,
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InitStep::CreateDevice => "create graphics device",
            InitStep::CreateCommandQueue => "create command queue",
            InitStep::CreateCommandAllocator => "create command allocator",
            InitStep::CreateCommandList => "create command list",
            InitStep::CloseCommandList => "close initial command list",
            InitStep::CreateSwapChain => "create swapchain",
            InitStep::CreateRtvHeap => "create RTV heap",
            InitStep::GetSwapChainBuffer => "get swapchain buffer",
            InitStep::CreateFence => "create fence",
            InitStep::CreateFenceEvent => "create fence event",
        };
        f.write_str(text)
    }
}

/// Operations of the frame loop and the synchronization protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameOp {
    ResetCommandAllocator,
    ResetCommandList,
    CloseCommandList,
    ExecuteCommandList,
    Present,
    SignalFence,
    SetEventOnCompletion,
    WaitForFence,
    CloseFenceEvent,
}

impl fmt::Display for FrameOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FrameOp::ResetCommandAllocator => "reset command allocator",
            FrameOp::ResetCommandList => "reset command list",
            FrameOp::CloseCommandList => "close command list",
            FrameOp::ExecuteCommandList => "execute command list",
            FrameOp::Present => "present",
            FrameOp::SignalFence => "signal fence",
            FrameOp::SetEventOnCompletion => "set fence event",
            FrameOp::WaitForFence => "wait for fence",
            FrameOp::CloseFenceEvent => "close fence event",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// A step of the initialization sequence failed; nothing was kept.
    #[error("Failed to {step}: {source}")]
    Init {
        step: InitStep,
        #[source]
        source: BoxError,
    },

    /// The frame loop or the GPU synchronization failed.
    #[error("Failed to {op}: {source}")]
    Runtime {
        op: FrameOp,
        #[source]
        source: BoxError,
    },

    #[error("Command list submitted while still recording")]
    CommandListOpen,

    #[error("Swapchain reported back buffer {index}, but only {count} exist")]
    BackBufferIndexOutOfRange { index: u32, count: usize },

    #[error("Engine has already been cleaned up")]
    CleanedUp,
}

impl EngineError {
    pub(crate) fn init<E>(step: InitStep) -> impl FnOnce(E) -> EngineError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |error| EngineError::Init {
            step,
            source: Box::new(error),
        }
    }

    pub(crate) fn runtime<E>(op: FrameOp) -> impl FnOnce(E) -> EngineError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |error| EngineError::Runtime {
            op,
            source: Box::new(error),
        }
    }

    /// Fatal-Init as opposed to Fatal-Runtime.
    pub fn is_init(&self) -> bool {
        matches!(self, EngineError::Init { .. })
    }

    pub fn init_stage(&self) -> Option<InitStage> {
        match self {
            EngineError::Init { step, .. } => Some(step.stage()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("device removed")]
    struct DeviceRemoved;

    #[test]
    fn stages_are_ordered_like_the_init_sequence() {
        assert!(InitStage::Device < InitStage::CommandObjects);
        assert!(InitStage::CommandObjects < InitStage::SwapChain);
        assert!(InitStage::SwapChain < InitStage::RenderTargets);
        assert!(InitStage::RenderTargets < InitStage::Fence);
    }

    #[test]
    fn steps_map_to_their_stage() {
        assert_eq!(InitStep::CloseCommandList.stage(), InitStage::CommandObjects);
        assert_eq!(InitStep::GetSwapChainBuffer.stage(), InitStage::RenderTargets);
        assert_eq!(InitStep::CreateFenceEvent.stage(), InitStage::Fence);
    }

    #[test]
    fn init_error_is_human_readable() {
        let error = EngineError::init(InitStep::CreateFence)(DeviceRemoved);
        assert_eq!(error.to_string(), "Failed to create fence: device removed");
        assert!(error.is_init());
        assert_eq!(error.init_stage(), Some(InitStage::Fence));
    }

    #[test]
    fn runtime_error_keeps_its_source() {
        let error = EngineError::runtime(FrameOp::SignalFence)(DeviceRemoved);
        assert!(!error.is_init());
        assert_eq!(error.init_stage(), None);
        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("device removed"));
    }
}
