//! [`GraphicsApi`] on Direct3D 12 and DXGI.

mod adapter_utils;
mod create_device;
mod debug_messages;
mod transition_barrier;

use tracing::warn;
use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::System::Threading::*;

pub use adapter_utils::get_hardware_adapter;
pub use debug_messages::log_dxgi_debug_messages;

use self::create_device::create_device;
use self::create_device::enable_debug_layer;
use self::transition_barrier::resource_state;
use self::transition_barrier::transition_barrier;
use crate::graphics_api::DescriptorHandle;
use crate::graphics_api::GraphicsApi;
use crate::graphics_api::PixelFormat;
use crate::graphics_api::ResourceState;
use crate::graphics_api::SwapChainDesc;
use crate::graphics_api::SwapEffect;
use crate::launch_options::LaunchOptions;

pub struct D3D12Api {
    options: LaunchOptions,
    factory: Option<IDXGIFactory4>,
    info_queue: Option<IDXGIInfoQueue>,
}

impl D3D12Api {
    pub fn new(options: &LaunchOptions) -> Self {
        Self {
            options: options.clone(),
            factory: None,
            info_queue: None,
        }
    }

    fn factory(&self) -> Result<&IDXGIFactory4> {
        self.factory
            .as_ref()
            .ok_or_else(|| Error::new(E_UNEXPECTED, "DXGI factory used before device creation"))
    }
}

fn cpu_handle(handle: DescriptorHandle) -> D3D12_CPU_DESCRIPTOR_HANDLE {
    D3D12_CPU_DESCRIPTOR_HANDLE { ptr: handle.ptr }
}

fn dxgi_format(format: PixelFormat) -> DXGI_FORMAT {
    match format {
        PixelFormat::Rgba8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
    }
}

fn dxgi_swap_effect(effect: SwapEffect) -> DXGI_SWAP_EFFECT {
    match effect {
        SwapEffect::FlipDiscard => DXGI_SWAP_EFFECT_FLIP_DISCARD,
    }
}

impl GraphicsApi for D3D12Api {
    type Error = Error;
    type Window = HWND;
    type Device = ID3D12Device;
    type CommandQueue = ID3D12CommandQueue;
    type CommandAllocator = ID3D12CommandAllocator;
    type CommandList = ID3D12GraphicsCommandList;
    type SwapChain = IDXGISwapChain3;
    type DescriptorHeap = ID3D12DescriptorHeap;
    type Resource = ID3D12Resource;
    type Fence = ID3D12Fence;
    type FenceEvent = Owned<HANDLE>;

    fn create_device(&mut self) -> Result<ID3D12Device> {
        let factory_flags = if self.options.enable_debug_layer {
            let (flags, info_queue) = enable_debug_layer();
            self.info_queue = info_queue;
            flags
        } else {
            DXGI_CREATE_FACTORY_FLAGS(0)
        };
        let (factory, device) = create_device(&self.options, factory_flags)?;
        self.factory = Some(factory);
        Ok(device)
    }

    fn create_command_queue(&self, device: &ID3D12Device) -> Result<ID3D12CommandQueue> {
        unsafe {
            device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                ..Default::default()
            })
        }
    }

    fn create_command_allocator(&self, device: &ID3D12Device) -> Result<ID3D12CommandAllocator> {
        unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT) }
    }

    fn create_command_list(
        &self,
        device: &ID3D12Device,
        allocator: &ID3D12CommandAllocator,
    ) -> Result<ID3D12GraphicsCommandList> {
        unsafe {
            device.CreateCommandList(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                allocator,
                None::<&ID3D12PipelineState>,
            )
        }
    }

    fn create_swap_chain(
        &self,
        queue: &ID3D12CommandQueue,
        window: HWND,
        desc: &SwapChainDesc,
    ) -> Result<IDXGISwapChain3> {
        let factory = self.factory()?;
        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
            BufferCount: desc.buffer_count,
            Width: desc.width,
            Height: desc.height,
            Format: dxgi_format(desc.format),
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SwapEffect: dxgi_swap_effect(desc.swap_effect),
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: desc.sample_count,
                ..Default::default()
            },
            ..Default::default()
        };
        let swap_chain: IDXGISwapChain3 = unsafe {
            factory.CreateSwapChainForHwnd(queue, window, &swap_chain_desc, None, None)?
        }
        .cast()?;

        // No fullscreen transitions, the swapchain is never resized.
        unsafe { factory.MakeWindowAssociation(window, DXGI_MWA_NO_ALT_ENTER)? };
        Ok(swap_chain)
    }

    fn get_back_buffer(&self, swap_chain: &IDXGISwapChain3, index: u32) -> Result<ID3D12Resource> {
        unsafe { swap_chain.GetBuffer(index) }
    }

    fn create_rtv_heap(&self, device: &ID3D12Device, descriptor_count: u32) -> Result<ID3D12DescriptorHeap> {
        unsafe {
            device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: descriptor_count,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                ..Default::default()
            })
        }
    }

    fn rtv_descriptor_size(&self, device: &ID3D12Device) -> u32 {
        unsafe { device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV) }
    }

    fn rtv_heap_start(&self, heap: &ID3D12DescriptorHeap) -> DescriptorHandle {
        let start = unsafe { heap.GetCPUDescriptorHandleForHeapStart() };
        DescriptorHandle { ptr: start.ptr }
    }

    fn create_render_target_view(
        &self,
        device: &ID3D12Device,
        resource: &ID3D12Resource,
        handle: DescriptorHandle,
    ) {
        unsafe { device.CreateRenderTargetView(resource, None, cpu_handle(handle)) };
    }

    fn create_fence(&self, device: &ID3D12Device, initial_value: u64) -> Result<ID3D12Fence> {
        unsafe { device.CreateFence(initial_value, D3D12_FENCE_FLAG_NONE) }
    }

    fn create_fence_event(&self) -> Result<Owned<HANDLE>> {
        let event = unsafe { CreateEventA(None, false, false, None)? };
        if event.is_invalid() {
            return Err(Error::from_win32());
        }
        // Owned calls CloseHandle on drop.
        Ok(unsafe { Owned::new(event) })
    }

    fn reset_command_allocator(&self, allocator: &ID3D12CommandAllocator) -> Result<()> {
        unsafe { allocator.Reset() }
    }

    fn reset_command_list(
        &self,
        list: &ID3D12GraphicsCommandList,
        allocator: &ID3D12CommandAllocator,
    ) -> Result<()> {
        unsafe { list.Reset(allocator, None::<&ID3D12PipelineState>) }
    }

    fn transition(
        &self,
        list: &ID3D12GraphicsCommandList,
        resource: &ID3D12Resource,
        before: ResourceState,
        after: ResourceState,
    ) {
        let barrier = transition_barrier(resource, resource_state(before), resource_state(after));
        unsafe { list.ResourceBarrier(&[barrier]) };
    }

    fn set_render_target(&self, list: &ID3D12GraphicsCommandList, rtv: DescriptorHandle) {
        let rtv = cpu_handle(rtv);
        unsafe { list.OMSetRenderTargets(1, Some(&rtv), false, None) };
    }

    fn clear_render_target(&self, list: &ID3D12GraphicsCommandList, rtv: DescriptorHandle, color: [f32; 4]) {
        unsafe { list.ClearRenderTargetView(cpu_handle(rtv), &color, None) };
    }

    fn close_command_list(&self, list: &ID3D12GraphicsCommandList) -> Result<()> {
        unsafe { list.Close() }
    }

    fn execute_command_list(&self, queue: &ID3D12CommandQueue, list: &ID3D12GraphicsCommandList) -> Result<()> {
        let command_lists = [Some(list.cast::<ID3D12CommandList>()?)];
        unsafe { queue.ExecuteCommandLists(&command_lists) };
        Ok(())
    }

    fn present(&self, swap_chain: &IDXGISwapChain3, sync_interval: u32) -> Result<()> {
        unsafe { swap_chain.Present(sync_interval, DXGI_PRESENT(0)) }.ok()
    }

    fn current_back_buffer_index(&self, swap_chain: &IDXGISwapChain3) -> u32 {
        unsafe { swap_chain.GetCurrentBackBufferIndex() }
    }

    fn signal(&self, queue: &ID3D12CommandQueue, fence: &ID3D12Fence, value: u64) -> Result<()> {
        unsafe { queue.Signal(fence, value) }
    }

    fn completed_value(&self, fence: &ID3D12Fence) -> u64 {
        unsafe { fence.GetCompletedValue() }
    }

    fn set_event_on_completion(
        &self,
        fence: &ID3D12Fence,
        value: u64,
        event: &Owned<HANDLE>,
    ) -> Result<()> {
        unsafe { fence.SetEventOnCompletion(value, **event) }
    }

    fn wait_for_event(&self, event: &Owned<HANDLE>) -> Result<()> {
        if unsafe { WaitForSingleObject(**event, INFINITE) } == WAIT_FAILED {
            return Err(Error::from_win32());
        }
        Ok(())
    }

    fn close_fence_event(&self, event: Owned<HANDLE>) -> Result<()> {
        drop(event);
        Ok(())
    }

    fn flush_debug_messages(&self) {
        match &self.info_queue {
            Some(queue) => log_dxgi_debug_messages(queue),
            None if self.options.enable_debug_layer => warn!("DXGI info queue not available"),
            None => {}
        }
    }
}
