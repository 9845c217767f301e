use widestring::U16CString;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::*;

pub const INIT_ERROR_TITLE: &str = "D3D12 Initialization Error";

/// Shows a modal error box and returns once it is dismissed.
pub fn show_error_dialog(owner: Option<HWND>, title: &str, text: &str) {
    let title = U16CString::from_str_truncate(title);
    let text = U16CString::from_str_truncate(text);
    unsafe {
        MessageBoxW(
            owner,
            PCWSTR(text.as_ptr()),
            PCWSTR(title.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}
