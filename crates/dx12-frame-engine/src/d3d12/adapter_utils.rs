use tracing::debug;
use tracing::info;
use windows::core::*;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_12_0;
use windows::Win32::Graphics::Direct3D12::D3D12CreateDevice;
use windows::Win32::Graphics::Direct3D12::ID3D12Device;
use windows::Win32::Graphics::Dxgi::*;

/// Returns the first hardware adapter that supports Direct3D 12 at feature level 12_0.
///
/// Software adapters are skipped. Fails with `DXGI_ERROR_NOT_FOUND` when no
/// adapter qualifies.
pub fn get_hardware_adapter(factory: &IDXGIFactory4) -> Result<IDXGIAdapter1> {
    debug!("Enumerating adapters");
    for i in 0.. {
        let adapter = match unsafe { factory.EnumAdapters1(i) } {
            Ok(a) => a,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => return Err(e),
        };

        let desc = unsafe { adapter.GetDesc1()? };
        let adapter_name = String::from_utf16_lossy(&desc.Description)
            .trim_end_matches('\0')
            .to_string();

        if desc.Flags & (DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32) != 0 {
            debug!(index = i, %adapter_name, "software adapter, skipping");
            continue;
        }

        // A null output pointer only asks whether the device could be created.
        let supported = unsafe {
            D3D12CreateDevice(
                &adapter,
                D3D_FEATURE_LEVEL_12_0,
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        }
        .is_ok();
        if supported {
            info!(index = i, %adapter_name, "adapter selected");
            return Ok(adapter);
        }
        debug!(index = i, %adapter_name, "no feature level 12_0 support");
    }

    Err(Error::new(
        DXGI_ERROR_NOT_FOUND,
        "No Direct3D 12 hardware adapter supports feature level 12_0",
    ))
}
