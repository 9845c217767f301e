use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::UI::WindowsAndMessaging::*;

/// Per-window message handling, reached through the window's user data.
pub trait WindowClass {
    /// The name the class is registered under.
    const ID: PCWSTR;

    /// Returns `true` when the message was handled and must not reach `DefWindowProcW`.
    fn handle(&mut self, message: u32, wparam: WPARAM) -> bool;
}

pub fn create_window_class_struct<W: WindowClass>(instance: HMODULE) -> Result<WNDCLASSEXW> {
    // WNDCLASSEXW - https://learn.microsoft.com/en-us/windows/win32/api/winuser/ns-winuser-wndclassexw
    let wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc::<W>),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
        lpszClassName: W::ID,
        ..Default::default()
    };
    Ok(wc)
}

fn handle_guarded<W: WindowClass>(behaviour: &mut W, message: u32, wparam: WPARAM) -> bool {
    // A panic must not unwind into user32; treat it as unhandled.
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        behaviour.handle(message, wparam)
    }))
    .unwrap_or(false)
}

extern "system" fn wndproc<W: WindowClass>(
    window: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if message == WM_CREATE {
        unsafe {
            let create_struct: &CREATESTRUCTW = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(window, GWLP_USERDATA, create_struct.lpCreateParams as _);
        }
        return LRESULT(0);
    }

    if message == WM_DESTROY {
        unsafe { PostQuitMessage(0) };
        return LRESULT(0);
    }

    // Messages sent before WM_CREATE arrive without user data.
    let user_data = unsafe { GetWindowLongPtrW(window, GWLP_USERDATA) };
    let handled = match std::ptr::NonNull::<W>::new(user_data as *mut W) {
        Some(mut behaviour) => handle_guarded(unsafe { behaviour.as_mut() }, message, wparam),
        None => false,
    };

    if handled {
        LRESULT(0)
    } else {
        unsafe { DefWindowProcW(window, message, wparam, lparam) }
    }
}
