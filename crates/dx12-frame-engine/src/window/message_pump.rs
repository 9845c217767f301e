use windows::Win32::UI::WindowsAndMessaging::*;

use crate::frame_loop::EventPump;
use crate::frame_loop::PumpStatus;

/// Drains the calling thread's message queue without blocking.
#[derive(Debug, Default)]
pub struct Win32MessagePump;

impl EventPump for Win32MessagePump {
    fn poll(&mut self) -> PumpStatus {
        let mut message = MSG::default();
        if !unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) }.as_bool() {
            return PumpStatus::Idle;
        }
        if message.message == WM_QUIT {
            return PumpStatus::Quit(message.wParam.0 as i32);
        }
        unsafe {
            _ = TranslateMessage(&message);
            DispatchMessageW(&message);
        }
        PumpStatus::Dispatched
    }
}
