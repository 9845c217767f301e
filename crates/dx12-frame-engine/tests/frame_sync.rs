use dx12_frame_engine::engine::FramePhase;
use dx12_frame_engine::error::FrameOp;
use dx12_frame_engine::graphics_api::ResourceState;
use dx12_frame_engine::headless::ApiCall;
use dx12_frame_engine::headless::FailPoint;
use dx12_frame_engine::headless::GpuTiming;
use dx12_frame_engine::headless::HeadlessApi;
use dx12_frame_engine::headless::HeadlessConfig;
use dx12_frame_engine::headless::HeadlessMonitor;
use dx12_frame_engine::headless::HeadlessWindow;
use dx12_frame_engine::headless::PresentOrder;
use dx12_frame_engine::Engine;
use dx12_frame_engine::EngineError;
use dx12_frame_engine::CLEAR_COLOR;

fn engine_with(config: HeadlessConfig) -> (Engine<HeadlessApi>, HeadlessMonitor) {
    let api = HeadlessApi::new(config);
    let monitor = api.monitor();
    let engine = Engine::initialize(api, HeadlessWindow::default(), 1280, 720).expect("init");
    (engine, monitor)
}

fn lagging() -> HeadlessConfig {
    HeadlessConfig {
        timing: GpuTiming::Lagging,
        ..Default::default()
    }
}

fn signals(calls: &[ApiCall]) -> Vec<u64> {
    calls
        .iter()
        .filter_map(|call| match call {
            ApiCall::Signal { value } => Some(*value),
            _ => None,
        })
        .collect()
}

#[test]
fn a_hundred_frames_advance_fence_and_follow_the_swapchain() {
    let (mut engine, monitor) = engine_with(lagging());

    for frame in 0..100u64 {
        let fence_before = engine.fence_value();
        engine.render_frame().expect("frame");
        assert_eq!(engine.fence_value(), fence_before + 1);
        assert_eq!(engine.frame_index(), monitor.back_buffer_index());
        assert_eq!(engine.frame_index(), ((frame + 1) % 2) as u32);
        assert_eq!(engine.frame_phase(), FramePhase::Idle);
    }

    assert_eq!(engine.frames_rendered(), 100);
    assert_eq!(engine.fence_value(), 101);
    assert_eq!(monitor.completed_value(), 100);
    assert_eq!(signals(&monitor.calls()), (1..=100).collect::<Vec<_>>());
    assert_eq!(monitor.blocking_waits(), 100);
    assert!(monitor.violations().is_empty(), "{:?}", monitor.violations());
}

#[test]
fn each_frame_records_the_clear_between_two_barriers() {
    let (mut engine, monitor) = engine_with(HeadlessConfig::default());
    let before = monitor.calls().len();
    engine.render_frame().expect("frame");
    let frame: Vec<ApiCall> = monitor.calls().split_off(before);

    let rtv = match frame[3] {
        ApiCall::SetRenderTarget { handle } => handle,
        ref other => panic!("expected render target binding, got {other:?}"),
    };
    assert_eq!(
        frame,
        vec![
            ApiCall::ResetCommandAllocator { allocator: 0 },
            ApiCall::ResetCommandList { allocator: 0 },
            ApiCall::Transition {
                buffer: 0,
                before: ResourceState::Present,
                after: ResourceState::RenderTarget,
            },
            ApiCall::SetRenderTarget { handle: rtv },
            ApiCall::ClearRenderTarget {
                handle: rtv,
                color: CLEAR_COLOR,
            },
            ApiCall::Transition {
                buffer: 0,
                before: ResourceState::RenderTarget,
                after: ResourceState::Present,
            },
            ApiCall::CloseCommandList,
            ApiCall::ExecuteCommandList,
            ApiCall::Present { sync_interval: 1 },
            ApiCall::Signal { value: 1 },
            ApiCall::GetCurrentBackBufferIndex,
        ]
    );
    assert_eq!(monitor.buffer_state(0), Some(ResourceState::Present));
}

#[test]
fn frame_index_comes_from_the_swapchain_not_a_counter() {
    let (mut engine, monitor) = engine_with(HeadlessConfig {
        present_order: PresentOrder::Scripted(vec![0, 0, 1, 1, 0]),
        ..lagging()
    });
    let mut seen = Vec::new();
    for _ in 0..5 {
        engine.render_frame().expect("frame");
        seen.push(engine.frame_index());
    }
    assert_eq!(seen, vec![0, 0, 1, 1, 0]);

    let allocators: Vec<usize> = monitor
        .calls()
        .iter()
        .filter_map(|call| match call {
            ApiCall::ResetCommandAllocator { allocator } => Some(*allocator),
            _ => None,
        })
        .collect();
    assert_eq!(allocators, vec![0, 0, 0, 1, 1]);
    assert!(monitor.violations().is_empty(), "{:?}", monitor.violations());
}

#[test]
fn an_out_of_range_index_after_present_is_an_error() {
    let (mut engine, _monitor) = engine_with(HeadlessConfig {
        present_order: PresentOrder::Scripted(vec![3]),
        ..Default::default()
    });
    let error = engine.render_frame().err().expect("frame fails");
    assert!(matches!(
        error,
        EngineError::BackBufferIndexOutOfRange { index: 3, count: 2 }
    ));
    assert_eq!(engine.frame_index(), 0);
}

#[test]
fn a_fast_gpu_never_blocks_the_cpu() {
    let (mut engine, monitor) = engine_with(HeadlessConfig::default());
    for _ in 0..10 {
        engine.render_frame().expect("frame");
    }
    assert_eq!(monitor.blocking_waits(), 0);
    assert!(!monitor
        .calls()
        .iter()
        .any(|call| matches!(call, ApiCall::SetEventOnCompletion { .. } | ApiCall::WaitForEvent { .. })));
}

#[test]
fn cleanup_with_nothing_in_flight_does_not_block() {
    let (mut engine, monitor) = engine_with(lagging());
    for _ in 0..3 {
        engine.render_frame().expect("frame");
    }
    let waits = monitor.blocking_waits();
    let before = monitor.calls().len();

    engine.cleanup().expect("cleanup");
    assert!(engine.is_cleaned_up());
    assert_eq!(monitor.blocking_waits(), waits);
    assert_eq!(
        monitor.calls().split_off(before),
        vec![ApiCall::Signal { value: 4 }, ApiCall::CloseFenceEvent]
    );
    assert_eq!(monitor.open_fence_events(), 0);

    // A second cleanup is a no-op.
    engine.cleanup().expect("second cleanup");
    assert_eq!(monitor.calls().len(), before + 2);
}

#[test]
fn cleanup_right_after_init_drains_without_waiting() {
    let (mut engine, monitor) = engine_with(lagging());
    engine.cleanup().expect("cleanup");
    assert_eq!(monitor.blocking_waits(), 0);
    assert_eq!(monitor.completed_value(), 1);
}

#[test]
fn dropping_an_engine_cleans_it_up() {
    let (mut engine, monitor) = engine_with(lagging());
    engine.render_frame().expect("frame");
    drop(engine);
    assert_eq!(monitor.open_fence_events(), 0);
    assert_eq!(monitor.calls().last(), Some(&ApiCall::CloseFenceEvent));
}

#[test]
fn a_failed_final_drain_still_releases_the_event() {
    let (mut engine, monitor) = engine_with(lagging());
    engine.render_frame().expect("frame");
    monitor.set_fail_point(Some(FailPoint::Signal));

    let error = engine.cleanup().err().expect("cleanup fails");
    assert!(matches!(
        error,
        EngineError::Runtime {
            op: FrameOp::SignalFence,
            ..
        }
    ));
    assert!(!engine.is_cleaned_up());
    assert_eq!(monitor.open_fence_events(), 1);

    drop(engine);
    assert_eq!(monitor.open_fence_events(), 0);
    assert!(!monitor.calls().contains(&ApiCall::CloseFenceEvent));
}

#[test]
fn a_failed_signal_is_fatal() {
    let (mut engine, monitor) = engine_with(HeadlessConfig::default());
    engine.render_frame().expect("first frame");
    monitor.set_fail_point(Some(FailPoint::Signal));

    let error = engine.render_frame().err().expect("frame fails");
    assert!(matches!(
        error,
        EngineError::Runtime {
            op: FrameOp::SignalFence,
            ..
        }
    ));
    assert!(!error.is_init());
    assert_eq!(engine.fence_value(), 2);
    assert_eq!(engine.frames_rendered(), 1);
}

#[test]
fn a_failed_wait_is_fatal() {
    let (mut engine, monitor) = engine_with(lagging());
    monitor.set_fail_point(Some(FailPoint::WaitForEvent));

    let error = engine.render_frame().err().expect("frame fails");
    assert!(matches!(
        error,
        EngineError::Runtime {
            op: FrameOp::WaitForFence,
            ..
        }
    ));
}

#[test]
fn rendering_after_cleanup_is_refused() {
    let (mut engine, monitor) = engine_with(HeadlessConfig::default());
    engine.cleanup().expect("cleanup");
    let before = monitor.calls().len();
    assert!(matches!(engine.render_frame(), Err(EngineError::CleanedUp)));
    assert_eq!(monitor.calls().len(), before);
}
