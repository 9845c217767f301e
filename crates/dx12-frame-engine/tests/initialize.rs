use dx12_frame_engine::engine::CommandListState;
use dx12_frame_engine::engine::FramePhase;
use dx12_frame_engine::error::InitStage;
use dx12_frame_engine::error::InitStep;
use dx12_frame_engine::graphics_api::DescriptorHandle;
use dx12_frame_engine::graphics_api::PixelFormat;
use dx12_frame_engine::graphics_api::SwapEffect;
use dx12_frame_engine::headless::ApiCall;
use dx12_frame_engine::headless::FailPoint;
use dx12_frame_engine::headless::HeadlessApi;
use dx12_frame_engine::headless::HeadlessConfig;
use dx12_frame_engine::headless::HeadlessWindow;
use dx12_frame_engine::Engine;
use dx12_frame_engine::EngineError;
use dx12_frame_engine::FRAME_COUNT;

fn creation_stages(calls: &[ApiCall]) -> Vec<InitStage> {
    calls.iter().filter_map(ApiCall::init_stage).collect()
}

#[test]
fn initializes_a_1280x720_engine() {
    let api = HeadlessApi::new(HeadlessConfig {
        initial_back_buffer: 1,
        ..Default::default()
    });
    let monitor = api.monitor();
    let engine = Engine::initialize(api, HeadlessWindow { id: 7 }, 1280, 720).expect("init");

    assert_eq!(engine.size(), (1280, 720));
    assert_eq!(engine.window(), HeadlessWindow { id: 7 });
    assert_eq!(engine.frame_index(), 1);
    assert_eq!(engine.fence_value(), 1);
    assert_eq!(engine.command_list_state(), CommandListState::Closed);
    assert_eq!(engine.frame_phase(), FramePhase::Idle);
    assert!(!engine.is_cleaned_up());

    let calls = monitor.calls();
    let swap_chain = calls
        .iter()
        .find_map(|call| match call {
            ApiCall::CreateSwapChain { desc } => Some(*desc),
            _ => None,
        })
        .expect("swapchain created");
    assert_eq!(swap_chain.buffer_count, FRAME_COUNT as u32);
    assert_eq!((swap_chain.width, swap_chain.height), (1280, 720));
    assert_eq!(swap_chain.format, PixelFormat::Rgba8Unorm);
    assert_eq!(swap_chain.swap_effect, SwapEffect::FlipDiscard);
    assert_eq!(swap_chain.sample_count, 1);

    assert!(calls.contains(&ApiCall::CreateFence { initial_value: 0 }));
    assert!(calls.contains(&ApiCall::CreateRtvHeap {
        descriptors: FRAME_COUNT as u32
    }));
    assert!(monitor.violations().is_empty());
}

#[test]
fn creates_one_queue_and_an_allocator_per_frame() {
    let api = HeadlessApi::default();
    let monitor = api.monitor();
    let _engine = Engine::initialize(api, HeadlessWindow::default(), 1280, 720).expect("init");

    let calls = monitor.calls();
    let queues = calls
        .iter()
        .filter(|call| matches!(call, ApiCall::CreateCommandQueue))
        .count();
    let allocators = calls
        .iter()
        .filter(|call| matches!(call, ApiCall::CreateCommandAllocator { .. }))
        .count();
    assert_eq!(queues, 1);
    assert_eq!(allocators, FRAME_COUNT);

    // The list is opened against allocator 0 and closed right away.
    let list_at = calls
        .iter()
        .position(|call| *call == ApiCall::CreateCommandList { allocator: 0 })
        .expect("list created");
    assert_eq!(calls[list_at + 1], ApiCall::CloseCommandList);
}

#[test]
fn render_target_views_are_laid_out_linearly() {
    let api = HeadlessApi::new(HeadlessConfig {
        rtv_descriptor_size: 48,
        ..Default::default()
    });
    let monitor = api.monitor();
    let engine = Engine::initialize(api, HeadlessWindow::default(), 640, 480).expect("init");
    assert_eq!(engine.rtv_descriptor_size(), 48);

    let views: Vec<(u32, DescriptorHandle)> = monitor
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ApiCall::CreateRenderTargetView { buffer, handle } => Some((buffer, handle)),
            _ => None,
        })
        .collect();
    assert_eq!(views.len(), FRAME_COUNT);
    let start = views[0].1;
    for (i, (buffer, handle)) in views.iter().enumerate() {
        assert_eq!(*buffer, i as u32);
        assert_eq!(handle.ptr, start.ptr + i * 48);
    }
    assert_eq!(engine.current_slot().render_target.rtv, start);
}

#[test]
fn stages_run_in_dependency_order() {
    let api = HeadlessApi::default();
    let monitor = api.monitor();
    let _engine = Engine::initialize(api, HeadlessWindow::default(), 1280, 720).expect("init");

    let stages = creation_stages(&monitor.calls());
    assert!(stages.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(stages.first(), Some(&InitStage::Device));
    assert_eq!(stages.last(), Some(&InitStage::Fence));
}

#[test]
fn device_failure_creates_nothing_else() {
    let api = HeadlessApi::new(HeadlessConfig {
        fail_at: Some(FailPoint::CreateDevice),
        ..Default::default()
    });
    let monitor = api.monitor();
    let error = Engine::initialize(api, HeadlessWindow::default(), 1280, 720)
        .err()
        .expect("init fails");

    assert!(matches!(
        error,
        EngineError::Init {
            step: InitStep::CreateDevice,
            ..
        }
    ));
    assert_eq!(error.init_stage(), Some(InitStage::Device));
    assert!(error.to_string().starts_with("Failed to create graphics device"));
    assert_eq!(monitor.calls(), vec![ApiCall::CreateDevice]);
}

#[test]
fn a_failed_stage_stops_all_later_stages() {
    let cases = [
        (FailPoint::CreateCommandQueue, InitStage::CommandObjects),
        (FailPoint::CreateCommandAllocator, InitStage::CommandObjects),
        (FailPoint::CreateCommandList, InitStage::CommandObjects),
        (FailPoint::CloseCommandList, InitStage::CommandObjects),
        (FailPoint::CreateSwapChain, InitStage::SwapChain),
        (FailPoint::CreateRtvHeap, InitStage::RenderTargets),
        (FailPoint::GetBackBuffer, InitStage::RenderTargets),
        (FailPoint::CreateFence, InitStage::Fence),
        (FailPoint::CreateFenceEvent, InitStage::Fence),
    ];
    for (fail_at, stage) in cases {
        let api = HeadlessApi::new(HeadlessConfig {
            fail_at: Some(fail_at),
            ..Default::default()
        });
        let monitor = api.monitor();
        let error = Engine::initialize(api, HeadlessWindow::default(), 1280, 720)
            .err()
            .expect("init fails");

        assert_eq!(error.init_stage(), Some(stage), "{fail_at:?}");
        let stages = creation_stages(&monitor.calls());
        assert!(stages.iter().all(|s| *s <= stage), "{fail_at:?}: {stages:?}");
        assert_eq!(stages.last(), Some(&stage), "{fail_at:?}");
    }
}

#[test]
fn an_out_of_range_back_buffer_index_is_an_init_error() {
    let api = HeadlessApi::new(HeadlessConfig {
        initial_back_buffer: 2,
        ..Default::default()
    });
    let error = Engine::initialize(api, HeadlessWindow::default(), 1280, 720)
        .err()
        .expect("init fails");
    assert!(matches!(
        error,
        EngineError::BackBufferIndexOutOfRange { index: 2, count: 2 }
    ));
}
