use tracing::debug;
use tracing::error;

use crate::engine::Engine;
use crate::error::EngineResult;
use crate::graphics_api::GraphicsApi;

/// What a single poll of the platform message queue produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// A message was pending and has been dispatched.
    Dispatched,
    /// Nothing was pending.
    Idle,
    /// The window asked to quit with this exit code.
    Quit(i32),
}

/// Non-blocking source of platform messages.
pub trait EventPump {
    /// Removes and dispatches at most one pending message.
    fn poll(&mut self) -> PumpStatus;
}

/// Pumps messages and renders one frame whenever the queue is empty.
///
/// Returns the quit code once the window closes. A failed frame ends the
/// loop and its error is returned.
pub fn run_frame_loop<A, P>(engine: &mut Engine<A>, pump: &mut P) -> EngineResult<i32>
where
    A: GraphicsApi,
    P: EventPump,
{
    loop {
        match pump.poll() {
            PumpStatus::Dispatched => continue,
            PumpStatus::Idle => {
                if let Err(e) = engine.render_frame() {
                    error!("Render error: {}", e);
                    return Err(e);
                }
            }
            PumpStatus::Quit(code) => {
                debug!(code, frames = engine.frames_rendered(), "quit received");
                return Ok(code);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::headless::FailPoint;
    use crate::headless::HeadlessApi;
    use crate::headless::HeadlessConfig;
    use crate::headless::HeadlessWindow;

    struct ScriptedPump {
        script: VecDeque<PumpStatus>,
    }

    impl ScriptedPump {
        fn new(script: impl IntoIterator<Item = PumpStatus>) -> Self {
            Self {
                script: script.into_iter().collect(),
            }
        }
    }

    impl EventPump for ScriptedPump {
        fn poll(&mut self) -> PumpStatus {
            self.script.pop_front().unwrap_or(PumpStatus::Quit(0))
        }
    }

    fn engine(config: HeadlessConfig) -> Engine<HeadlessApi> {
        Engine::initialize(HeadlessApi::new(config), HeadlessWindow::default(), 1280, 720)
            .expect("headless init")
    }

    #[test]
    fn renders_one_frame_per_idle_tick() {
        let mut engine = engine(HeadlessConfig::default());
        let mut pump = ScriptedPump::new([
            PumpStatus::Idle,
            PumpStatus::Dispatched,
            PumpStatus::Dispatched,
            PumpStatus::Idle,
            PumpStatus::Idle,
            PumpStatus::Quit(0),
        ]);
        let code = run_frame_loop(&mut engine, &mut pump).expect("loop");
        assert_eq!(code, 0);
        assert_eq!(engine.frames_rendered(), 3);
    }

    #[test]
    fn pending_messages_are_drained_before_rendering() {
        let mut engine = engine(HeadlessConfig::default());
        let mut pump = ScriptedPump::new([
            PumpStatus::Dispatched,
            PumpStatus::Dispatched,
            PumpStatus::Quit(7),
            PumpStatus::Idle,
        ]);
        let code = run_frame_loop(&mut engine, &mut pump).expect("loop");
        assert_eq!(code, 7);
        assert_eq!(engine.frames_rendered(), 0);
    }

    #[test]
    fn render_failure_ends_the_loop() {
        let api = HeadlessApi::new(HeadlessConfig::default());
        let monitor = api.monitor();
        let mut engine =
            Engine::initialize(api, HeadlessWindow::default(), 1280, 720).expect("headless init");
        monitor.set_fail_point(Some(FailPoint::Present));

        let mut pump = ScriptedPump::new([PumpStatus::Idle, PumpStatus::Idle]);
        let result = run_frame_loop(&mut engine, &mut pump);
        assert!(matches!(result, Err(ref e) if !e.is_init()));
        assert_eq!(engine.frames_rendered(), 0);
    }
}
