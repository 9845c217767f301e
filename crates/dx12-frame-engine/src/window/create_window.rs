use widestring::U16CString;
use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleExW;
use windows::Win32::UI::WindowsAndMessaging::*;

use super::window_class::WindowClass;

pub fn get_handle_to_file_used_to_create_the_calling_process() -> Result<HMODULE> {
    let mut out = Default::default();
    unsafe { GetModuleHandleExW(Default::default(), None, &mut out)? };
    Ok(out)
}

/// Outer window rectangle whose client area is `width` by `height`.
pub fn window_rect_for_client_size(width: u32, height: u32) -> Result<RECT> {
    let mut window_rect = RECT {
        left: 0,
        top: 0,
        right: width as i32,
        bottom: height as i32,
    };
    unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false)? };
    Ok(window_rect)
}

/// Creates a hidden overlapped window of class `W`.
///
/// `behaviour` receives the window's messages and must outlive the window.
pub fn create_window<W: WindowClass>(
    our_module: HMODULE,
    window_rect: RECT,
    title: &str,
    behaviour: &mut W,
) -> Result<HWND> {
    let title = U16CString::from_str_truncate(title);
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            W::ID,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            window_rect.right - window_rect.left,
            window_rect.bottom - window_rect.top,
            None,
            None,
            Some(our_module.into()),
            Some(behaviour as *mut W as _),
        )
    }?;
    Ok(hwnd)
}
