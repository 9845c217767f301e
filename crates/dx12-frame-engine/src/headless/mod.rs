//! A simulated [`GraphicsApi`] that runs anywhere.
//!
//! Every call is logged, the command list, allocator, barrier, present and fence
//! rules of Direct3D 12 are enforced, and any call can be made to fail. Breaking
//! a rule records a [`Violation`]; calls that the real API would reject also
//! return an error. A [`HeadlessMonitor`] cloned from the backend before it is
//! handed to the engine reads all of this back.

mod call_log;
mod config;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

pub use call_log::ApiCall;
pub use call_log::Violation;
pub use config::FailPoint;
pub use config::GpuTiming;
pub use config::HeadlessConfig;
pub use config::PresentOrder;

use crate::graphics_api::DescriptorHandle;
use crate::graphics_api::GraphicsApi;
use crate::graphics_api::ResourceState;
use crate::graphics_api::SwapChainDesc;

const RTV_HEAP_BASE: usize = 0x1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeadlessError {
    #[error("injected failure in {0:?}")]
    Injected(FailPoint),
    #[error("rejected call: {0:?}")]
    Rejected(Violation),
    #[error("back buffer {index} does not exist")]
    NoSuchBuffer { index: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeadlessWindow {
    pub id: u32,
}

#[derive(Debug)]
pub struct HeadlessDevice;
#[derive(Debug)]
pub struct HeadlessQueue;
#[derive(Debug)]
pub struct HeadlessAllocator {
    index: usize,
}
#[derive(Debug)]
pub struct HeadlessCommandList;
#[derive(Debug)]
pub struct HeadlessSwapChain;
#[derive(Debug)]
pub struct HeadlessDescriptorHeap {
    start: DescriptorHandle,
}
#[derive(Debug)]
pub struct HeadlessResource {
    buffer: u32,
}
#[derive(Debug)]
pub struct HeadlessFence;
/// Counts as open until dropped, whether or not it was closed explicitly.
#[derive(Debug)]
pub struct HeadlessFenceEvent {
    state: Rc<RefCell<SimState>>,
}

impl Drop for HeadlessFenceEvent {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.open_events = state.open_events.saturating_sub(1);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct AllocatorState {
    /// Executed since the last signal, so no fence value covers it yet.
    awaiting_signal: bool,
    busy_until: u64,
}

#[derive(Debug, Default)]
struct SimState {
    config: HeadlessConfig,
    calls: Vec<ApiCall>,
    violations: Vec<Violation>,

    allocators: Vec<AllocatorState>,
    list_open: bool,
    list_allocator: usize,

    heap_descriptors: u32,
    views: HashMap<DescriptorHandle, u32>,
    buffer_states: Vec<ResourceState>,
    back_buffer: u32,
    presents: usize,

    completed: u64,
    last_signal: u64,
    pending_signal: Option<u64>,
    queue_busy: bool,
    armed: Option<u64>,
    blocking_waits: usize,
    open_events: usize,
}

impl SimState {
    fn call(&mut self, call: ApiCall, point: FailPoint) -> Result<(), HeadlessError> {
        trace!(?call, "headless call");
        self.calls.push(call);
        if self.config.fail_at == Some(point) {
            return Err(HeadlessError::Injected(point));
        }
        Ok(())
    }

    fn violate(&mut self, violation: Violation) {
        trace!(?violation, "headless violation");
        self.violations.push(violation);
    }

    fn reject(&mut self, violation: Violation) -> HeadlessError {
        self.violate(violation.clone());
        HeadlessError::Rejected(violation)
    }

    fn require_recording(&mut self) -> bool {
        if !self.list_open {
            self.violate(Violation::RecordWhileClosed);
        }
        self.list_open
    }

    fn complete(&mut self, value: u64) {
        self.completed = self.completed.max(value);
        self.queue_busy = false;
    }

    fn next_back_buffer(&self) -> u32 {
        match &self.config.present_order {
            PresentOrder::Scripted(order) if !order.is_empty() => order[(self.presents - 1) % order.len()],
            _ => {
                let count = self.buffer_states.len().max(1) as u32;
                (self.back_buffer + 1) % count
            }
        }
    }
}

/// Simulated backend. Cheap to clone; clones share one simulated GPU.
#[derive(Debug, Clone, Default)]
pub struct HeadlessApi {
    state: Rc<RefCell<SimState>>,
}

/// Read side of a [`HeadlessApi`], kept by tests after the backend moves into an engine.
#[derive(Debug, Clone)]
pub struct HeadlessMonitor {
    state: Rc<RefCell<SimState>>,
}

impl HeadlessApi {
    pub fn new(config: HeadlessConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                config,
                ..Default::default()
            })),
        }
    }

    pub fn monitor(&self) -> HeadlessMonitor {
        HeadlessMonitor {
            state: Rc::clone(&self.state),
        }
    }
}

impl HeadlessMonitor {
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.borrow().calls.clone()
    }

    pub fn violations(&self) -> Vec<Violation> {
        self.state.borrow().violations.clone()
    }

    /// Waits that actually had to block for the GPU.
    pub fn blocking_waits(&self) -> usize {
        self.state.borrow().blocking_waits
    }

    pub fn completed_value(&self) -> u64 {
        self.state.borrow().completed
    }

    pub fn back_buffer_index(&self) -> u32 {
        self.state.borrow().back_buffer
    }

    pub fn buffer_state(&self, buffer: u32) -> Option<ResourceState> {
        self.state.borrow().buffer_states.get(buffer as usize).copied()
    }

    pub fn open_fence_events(&self) -> usize {
        self.state.borrow().open_events
    }

    pub fn set_fail_point(&self, point: Option<FailPoint>) {
        self.state.borrow_mut().config.fail_at = point;
    }
}

impl GraphicsApi for HeadlessApi {
    type Error = HeadlessError;
    type Window = HeadlessWindow;
    type Device = HeadlessDevice;
    type CommandQueue = HeadlessQueue;
    type CommandAllocator = HeadlessAllocator;
    type CommandList = HeadlessCommandList;
    type SwapChain = HeadlessSwapChain;
    type DescriptorHeap = HeadlessDescriptorHeap;
    type Resource = HeadlessResource;
    type Fence = HeadlessFence;
    type FenceEvent = HeadlessFenceEvent;

    fn create_device(&mut self) -> Result<HeadlessDevice, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::CreateDevice, FailPoint::CreateDevice)?;
        Ok(HeadlessDevice)
    }

    fn create_command_queue(&self, _device: &HeadlessDevice) -> Result<HeadlessQueue, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::CreateCommandQueue, FailPoint::CreateCommandQueue)?;
        Ok(HeadlessQueue)
    }

    fn create_command_allocator(
        &self,
        _device: &HeadlessDevice,
    ) -> Result<HeadlessAllocator, HeadlessError> {
        let mut state = self.state.borrow_mut();
        let index = state.allocators.len();
        state.call(
            ApiCall::CreateCommandAllocator { allocator: index },
            FailPoint::CreateCommandAllocator,
        )?;
        state.allocators.push(AllocatorState::default());
        Ok(HeadlessAllocator { index })
    }

    fn create_command_list(
        &self,
        _device: &HeadlessDevice,
        allocator: &HeadlessAllocator,
    ) -> Result<HeadlessCommandList, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(
            ApiCall::CreateCommandList {
                allocator: allocator.index,
            },
            FailPoint::CreateCommandList,
        )?;
        state.list_open = true;
        state.list_allocator = allocator.index;
        Ok(HeadlessCommandList)
    }

    fn create_swap_chain(
        &self,
        _queue: &HeadlessQueue,
        _window: HeadlessWindow,
        desc: &SwapChainDesc,
    ) -> Result<HeadlessSwapChain, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::CreateSwapChain { desc: *desc }, FailPoint::CreateSwapChain)?;
        state.buffer_states = vec![ResourceState::Present; desc.buffer_count as usize];
        state.back_buffer = state.config.initial_back_buffer;
        Ok(HeadlessSwapChain)
    }

    fn get_back_buffer(
        &self,
        _swap_chain: &HeadlessSwapChain,
        index: u32,
    ) -> Result<HeadlessResource, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::GetBackBuffer { buffer: index }, FailPoint::GetBackBuffer)?;
        if index as usize >= state.buffer_states.len() {
            return Err(HeadlessError::NoSuchBuffer { index });
        }
        Ok(HeadlessResource { buffer: index })
    }

    fn create_rtv_heap(
        &self,
        _device: &HeadlessDevice,
        descriptor_count: u32,
    ) -> Result<HeadlessDescriptorHeap, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(
            ApiCall::CreateRtvHeap {
                descriptors: descriptor_count,
            },
            FailPoint::CreateRtvHeap,
        )?;
        state.heap_descriptors = descriptor_count;
        Ok(HeadlessDescriptorHeap {
            start: DescriptorHandle { ptr: RTV_HEAP_BASE },
        })
    }

    fn rtv_descriptor_size(&self, _device: &HeadlessDevice) -> u32 {
        self.state.borrow().config.rtv_descriptor_size
    }

    fn rtv_heap_start(&self, heap: &HeadlessDescriptorHeap) -> DescriptorHandle {
        heap.start
    }

    fn create_render_target_view(
        &self,
        _device: &HeadlessDevice,
        resource: &HeadlessResource,
        handle: DescriptorHandle,
    ) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ApiCall::CreateRenderTargetView {
            buffer: resource.buffer,
            handle,
        });
        let stride = state.config.rtv_descriptor_size.max(1) as usize;
        let offset = handle.ptr.wrapping_sub(RTV_HEAP_BASE);
        let inside = handle.ptr >= RTV_HEAP_BASE
            && offset % stride == 0
            && offset / stride < state.heap_descriptors as usize;
        if !inside {
            state.violate(Violation::ViewOutsideHeap { handle });
            return;
        }
        state.views.insert(handle, resource.buffer);
    }

    fn create_fence(&self, _device: &HeadlessDevice, initial_value: u64) -> Result<HeadlessFence, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::CreateFence { initial_value }, FailPoint::CreateFence)?;
        state.completed = initial_value;
        state.last_signal = initial_value;
        Ok(HeadlessFence)
    }

    fn create_fence_event(&self) -> Result<HeadlessFenceEvent, HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::CreateFenceEvent, FailPoint::CreateFenceEvent)?;
        state.open_events += 1;
        Ok(HeadlessFenceEvent {
            state: Rc::clone(&self.state),
        })
    }

    fn reset_command_allocator(&self, allocator: &HeadlessAllocator) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        let index = allocator.index;
        state.call(
            ApiCall::ResetCommandAllocator { allocator: index },
            FailPoint::ResetCommandAllocator,
        )?;
        if state.list_open && state.list_allocator == index {
            return Err(state.reject(Violation::AllocatorResetWhileRecording { allocator: index }));
        }
        let slot = state.allocators[index];
        if slot.awaiting_signal || slot.busy_until > state.completed {
            return Err(state.reject(Violation::AllocatorInFlight { allocator: index }));
        }
        Ok(())
    }

    fn reset_command_list(
        &self,
        _list: &HeadlessCommandList,
        allocator: &HeadlessAllocator,
    ) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(
            ApiCall::ResetCommandList {
                allocator: allocator.index,
            },
            FailPoint::ResetCommandList,
        )?;
        if state.list_open {
            return Err(state.reject(Violation::ResetWhileRecording));
        }
        state.list_open = true;
        state.list_allocator = allocator.index;
        Ok(())
    }

    fn transition(
        &self,
        _list: &HeadlessCommandList,
        resource: &HeadlessResource,
        before: ResourceState,
        after: ResourceState,
    ) {
        let mut state = self.state.borrow_mut();
        let buffer = resource.buffer;
        state.calls.push(ApiCall::Transition {
            buffer,
            before,
            after,
        });
        if !state.require_recording() {
            return;
        }
        if buffer != state.back_buffer {
            let current = state.back_buffer;
            state.violate(Violation::BarrierOnInactiveBuffer { buffer, current });
        }
        let actual = state.buffer_states[buffer as usize];
        if actual != before {
            state.violate(Violation::BarrierStateMismatch {
                buffer,
                expected: before,
                actual,
            });
        }
        state.buffer_states[buffer as usize] = after;
    }

    fn set_render_target(&self, _list: &HeadlessCommandList, rtv: DescriptorHandle) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ApiCall::SetRenderTarget { handle: rtv });
        if state.require_recording() && state.views.get(&rtv) != Some(&state.back_buffer) {
            state.violate(Violation::TargetNotCurrent { handle: rtv });
        }
    }

    fn clear_render_target(&self, _list: &HeadlessCommandList, rtv: DescriptorHandle, color: [f32; 4]) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ApiCall::ClearRenderTarget { handle: rtv, color });
        if !state.require_recording() {
            return;
        }
        match state.views.get(&rtv).copied() {
            Some(buffer) if buffer == state.back_buffer => {
                if state.buffer_states[buffer as usize] != ResourceState::RenderTarget {
                    state.violate(Violation::ClearOutsideRenderTargetState { buffer });
                }
            }
            _ => state.violate(Violation::TargetNotCurrent { handle: rtv }),
        }
    }

    fn close_command_list(&self, _list: &HeadlessCommandList) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::CloseCommandList, FailPoint::CloseCommandList)?;
        if !state.list_open {
            return Err(state.reject(Violation::CloseWhileClosed));
        }
        state.list_open = false;
        Ok(())
    }

    fn execute_command_list(
        &self,
        _queue: &HeadlessQueue,
        _list: &HeadlessCommandList,
    ) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::ExecuteCommandList, FailPoint::ExecuteCommandList)?;
        if state.list_open {
            return Err(state.reject(Violation::ExecuteWhileRecording));
        }
        let allocator = state.list_allocator;
        state.allocators[allocator].awaiting_signal = true;
        state.queue_busy = true;
        Ok(())
    }

    fn present(&self, _swap_chain: &HeadlessSwapChain, sync_interval: u32) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::Present { sync_interval }, FailPoint::Present)?;
        let buffer = state.back_buffer;
        let buffer_state = state
            .buffer_states
            .get(buffer as usize)
            .copied()
            .ok_or(HeadlessError::NoSuchBuffer { index: buffer })?;
        if buffer_state != ResourceState::Present {
            return Err(state.reject(Violation::PresentFromState {
                buffer,
                state: buffer_state,
            }));
        }
        state.presents += 1;
        state.back_buffer = state.next_back_buffer();
        Ok(())
    }

    fn current_back_buffer_index(&self, _swap_chain: &HeadlessSwapChain) -> u32 {
        let mut state = self.state.borrow_mut();
        state.calls.push(ApiCall::GetCurrentBackBufferIndex);
        state.back_buffer
    }

    fn signal(&self, _queue: &HeadlessQueue, _fence: &HeadlessFence, value: u64) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::Signal { value }, FailPoint::Signal)?;
        if value <= state.last_signal {
            let last = state.last_signal;
            state.violate(Violation::SignalNotIncreasing { value, last });
        }
        state.last_signal = state.last_signal.max(value);
        for allocator in state.allocators.iter_mut().filter(|a| a.awaiting_signal) {
            allocator.awaiting_signal = false;
            allocator.busy_until = value;
        }
        if state.config.timing == GpuTiming::Lagging && state.queue_busy {
            state.pending_signal = Some(value);
        } else {
            state.complete(value);
        }
        Ok(())
    }

    fn completed_value(&self, _fence: &HeadlessFence) -> u64 {
        self.state.borrow().completed
    }

    fn set_event_on_completion(
        &self,
        _fence: &HeadlessFence,
        value: u64,
        _event: &HeadlessFenceEvent,
    ) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        state.call(ApiCall::SetEventOnCompletion { value }, FailPoint::SetEventOnCompletion)?;
        state.armed = Some(value);
        Ok(())
    }

    fn wait_for_event(&self, _event: &HeadlessFenceEvent) -> Result<(), HeadlessError> {
        let mut state = self.state.borrow_mut();
        let armed = state.armed.take();
        state.call(
            ApiCall::WaitForEvent {
                value: armed.unwrap_or_default(),
            },
            FailPoint::WaitForEvent,
        )?;
        let Some(value) = armed else {
            return Err(state.reject(Violation::WaitWithoutArm));
        };
        if value <= state.completed {
            return Ok(());
        }
        match state.pending_signal {
            Some(pending) if pending >= value => {
                state.pending_signal = None;
                state.complete(pending);
                state.blocking_waits += 1;
                Ok(())
            }
            _ => Err(state.reject(Violation::WaitNeverSignalled { value })),
        }
    }

    fn close_fence_event(&self, event: HeadlessFenceEvent) -> Result<(), HeadlessError> {
        let result = self
            .state
            .borrow_mut()
            .call(ApiCall::CloseFenceEvent, FailPoint::CloseFenceEvent);
        drop(event);
        result
    }
}
