//! Win32 window and message loop glue.

mod create_window;
mod error_dialog;
mod message_pump;
mod register_window_class;
mod renderer_window;
mod window_class;

pub use create_window::create_window;
pub use create_window::get_handle_to_file_used_to_create_the_calling_process;
pub use create_window::window_rect_for_client_size;
pub use error_dialog::show_error_dialog;
pub use error_dialog::INIT_ERROR_TITLE;
pub use message_pump::Win32MessagePump;
pub use register_window_class::register_window_class;
pub use renderer_window::RendererWindow;
pub use window_class::create_window_class_struct;
pub use window_class::WindowClass;
