pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 720;

/// Settings taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub use_warp_device: bool,
    pub enable_debug_layer: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            use_warp_device: false,
            enable_debug_layer: cfg!(debug_assertions),
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

fn is_flag(arg: &str, name: &str) -> bool {
    match arg.strip_prefix('-').or_else(|| arg.strip_prefix('/')) {
        Some(rest) => rest.eq_ignore_ascii_case(name),
        None => false,
    }
}

/// Reads `-warp`, `-debug` and `-nodebug` (either prefix, any case). Unknown
/// arguments are ignored.
pub fn parse_launch_options<I, S>(args: I) -> LaunchOptions
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = LaunchOptions::default();
    for arg in args {
        let arg = arg.as_ref();
        if is_flag(arg, "warp") {
            options.use_warp_device = true;
        } else if is_flag(arg, "debug") {
            options.enable_debug_layer = true;
        } else if is_flag(arg, "nodebug") {
            options.enable_debug_layer = false;
        }
    }
    options
}

/// Builds the options from the process arguments.
pub fn build_launch_options() -> LaunchOptions {
    parse_launch_options(std::env::args().skip(1))
}

/// Local time this crate was compiled, stamped by the build script.
pub const BUILT_AT: &str = env!("DX12_RENDERER_BUILT_AT");

pub fn window_title(options: &LaunchOptions) -> String {
    window_title_at(options, BUILT_AT)
}

fn window_title_at(options: &LaunchOptions, built: &str) -> String {
    let mut title = format!(
        "DX12 Renderer v{}.{} [internal] - ({built})",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR"),
    );
    if options.use_warp_device {
        title.push_str(" (WARP)");
    }
    title
}
