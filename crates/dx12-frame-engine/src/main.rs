use std::process::ExitCode;

use dx12_frame_engine::logging::init_tracing;

#[cfg(windows)]
fn main() -> eyre::Result<ExitCode> {
    use dx12_frame_engine::d3d12::D3D12Api;
    use dx12_frame_engine::frame_loop::run_frame_loop;
    use dx12_frame_engine::launch_options::build_launch_options;
    use dx12_frame_engine::launch_options::window_title;
    use dx12_frame_engine::window::*;
    use dx12_frame_engine::Engine;
    use tracing::info;
    use windows::Win32::UI::WindowsAndMessaging::ShowWindow;
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOW;

    color_eyre::install()?;
    init_tracing();

    let options = build_launch_options();
    info!(?options, "starting");

    let our_module = get_handle_to_file_used_to_create_the_calling_process()?;
    let window_class = create_window_class_struct::<RendererWindow>(our_module)?;
    register_window_class(&window_class)?;

    let (width, height) = (options.window_width, options.window_height);
    let window_rect = window_rect_for_client_size(width, height)?;
    let title = window_title(&options);

    // Must outlive the window: its messages are routed here.
    let mut behaviour = RendererWindow;
    let hwnd = create_window(our_module, window_rect, &title, &mut behaviour)?;

    let mut engine = match Engine::initialize(D3D12Api::new(&options), hwnd, width, height) {
        Ok(engine) => engine,
        Err(e) => {
            show_error_dialog(Some(hwnd), INIT_ERROR_TITLE, &e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    unsafe { _ = ShowWindow(hwnd, SW_SHOW) };

    let code = run_frame_loop(&mut engine, &mut Win32MessagePump)?;
    engine.cleanup()?;
    info!(code, frames = engine.frames_rendered(), "exiting");
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

#[cfg(not(windows))]
fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();
    tracing::error!("Direct3D 12 is only available on Windows");
    Ok(ExitCode::FAILURE)
}
