use windows::core::Error;
use windows::core::Result;
use windows::Win32::UI::WindowsAndMessaging::RegisterClassExW;
use windows::Win32::UI::WindowsAndMessaging::WNDCLASSEXW;

/// Registers `class`, returning its atom.
pub fn register_window_class(class: &WNDCLASSEXW) -> Result<u16> {
    let atom = unsafe { RegisterClassExW(class) };
    if atom == 0 {
        return Err(Error::from_win32());
    }
    Ok(atom)
}
