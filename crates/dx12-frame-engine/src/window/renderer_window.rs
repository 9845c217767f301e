use windows::core::w;
use windows::core::PCWSTR;
use windows::Win32::Foundation::WPARAM;

use super::window_class::WindowClass;

/// The renderer's window. Frames are drawn from the frame loop, so every
/// message goes to `DefWindowProcW`.
#[derive(Debug, Default)]
pub struct RendererWindow;

impl WindowClass for RendererWindow {
    const ID: PCWSTR = w!("DX12RendererWindowClass");

    fn handle(&mut self, _message: u32, _wparam: WPARAM) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use windows::Win32::UI::WindowsAndMessaging::*;

    use super::*;

    #[test]
    fn leaves_every_message_to_the_default_procedure() {
        let mut window = RendererWindow;
        for message in [WM_KEYDOWN, WM_KEYUP, WM_PAINT, WM_SIZE] {
            assert!(!window.handle(message, WPARAM(0x41)), "{message:#x}");
        }
    }
}
