pub mod engine;
pub mod error;
pub mod frame_loop;
pub mod graphics_api;
#[cfg(any(test, feature = "headless"))]
pub mod headless;
pub mod launch_options;
pub mod logging;

#[cfg(windows)]
pub mod d3d12;
#[cfg(windows)]
pub mod window;

pub use engine::Engine;
pub use engine::CLEAR_COLOR;
pub use engine::FRAME_COUNT;
pub use error::EngineError;
pub use error::EngineResult;
pub use frame_loop::run_frame_loop;
pub use graphics_api::GraphicsApi;
