use tracing::info;
use tracing::warn;
use windows::core::*;
use windows::Win32::Foundation::E_POINTER;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_12_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;

use super::adapter_utils::get_hardware_adapter;
use crate::launch_options::LaunchOptions;

/// Turns on the D3D12 debug layer and fetches the DXGI info queue.
///
/// Returns the factory flags to use and the info queue, if any. A missing
/// debug layer only logs a warning.
pub fn enable_debug_layer() -> (DXGI_CREATE_FACTORY_FLAGS, Option<IDXGIInfoQueue>) {
    let mut debug: Option<ID3D12Debug> = None;
    let Some(debug) = unsafe { D3D12GetDebugInterface(&mut debug) }.ok().and(debug) else {
        warn!("D3D12 debug layer unavailable");
        return (DXGI_CREATE_FACTORY_FLAGS(0), None);
    };
    unsafe { debug.EnableDebugLayer() };
    info!("D3D12 debug layer enabled");

    let info_queue = match unsafe { DXGIGetDebugInterface1::<IDXGIInfoQueue>(0) } {
        Ok(queue) => Some(queue),
        Err(e) => {
            warn!("Failed to get DXGI info queue: {}", e);
            None
        }
    };
    (DXGI_CREATE_FACTORY_DEBUG, info_queue)
}

/// Creates the DXGI factory and a device at feature level 12_0 on the chosen adapter.
pub fn create_device(
    options: &LaunchOptions,
    factory_flags: DXGI_CREATE_FACTORY_FLAGS,
) -> Result<(IDXGIFactory4, ID3D12Device)> {
    let factory: IDXGIFactory4 = unsafe { CreateDXGIFactory2(factory_flags) }?;

    let adapter: IDXGIAdapter1 = if options.use_warp_device {
        info!("Using WARP adapter");
        unsafe { factory.EnumWarpAdapter()? }
    } else {
        get_hardware_adapter(&factory)?
    };

    let mut device: Option<ID3D12Device> = None;
    unsafe { D3D12CreateDevice(&adapter, D3D_FEATURE_LEVEL_12_0, &mut device) }?;
    let device =
        device.ok_or_else(|| Error::new(E_POINTER, "D3D12CreateDevice returned no device"))?;

    Ok((factory, device))
}
