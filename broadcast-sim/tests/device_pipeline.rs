mod common;

use std::sync::Arc;

use approx::assert_relative_eq;

use broadcast_core::models::config::{AspectMode, CameraPosition};
use broadcast_core::models::devices::{Rect, SlotInput};
use broadcast_core::{BroadcastError, EngineError, ImageSource};
use broadcast_sim::catalog::{
    two_camera_catalog, BACK_ULTRA_WIDE_URN, BACK_WIDE_URN, FRONT_URN, MICROPHONE_URN,
};
use broadcast_sim::{Dispatch, SimulatedEngine};

use common::{controller, PreviewSink, TestView};

#[test]
fn back_swap_from_front_picks_default_back_lens() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    let sink = PreviewSink::default();
    controller
        .set_camera_position(CameraPosition::Front, sink.callback())
        .unwrap();
    controller.initiate().unwrap();
    let session = engine.last_session().unwrap();
    assert_eq!(session.attached_camera().unwrap().urn, FRONT_URN);

    controller
        .set_camera_position(CameraPosition::Back, sink.callback())
        .unwrap();

    let camera = session.attached_camera().unwrap();
    assert_eq!(camera.urn, BACK_WIDE_URN);
    assert_ne!(camera.urn, BACK_ULTRA_WIDE_URN);
    assert_eq!(
        controller.attached_devices().unwrap().camera_urn(),
        Some(BACK_WIDE_URN)
    );
    let previews = sink.received();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].camera_urn.as_deref(), Some(BACK_WIDE_URN));
}

#[test]
fn camera_position_before_initiate_only_seeds_initial_camera() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    let sink = PreviewSink::default();

    controller
        .set_camera_position(CameraPosition::Front, sink.callback())
        .unwrap();
    controller
        .set_camera_position(CameraPosition::Back, sink.callback())
        .unwrap();
    controller.initiate().unwrap();

    let session = engine.last_session().unwrap();
    assert_eq!(session.attached_camera().unwrap().urn, BACK_WIDE_URN);
    assert!(session.history().is_empty());
    assert!(sink.received().is_empty());
}

#[test]
fn camera_position_already_attached_is_skipped() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let sink = PreviewSink::default();

    controller
        .set_camera_position(CameraPosition::Back, sink.callback())
        .unwrap();

    assert!(engine.last_session().unwrap().history().is_empty());
    assert!(sink.received().is_empty());
}

#[test]
#[allow(deprecated)]
fn deprecated_swap_toggles_between_positions() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let session = engine.last_session().unwrap();
    let sink = PreviewSink::default();

    controller.swap_camera(sink.callback()).unwrap();
    assert_eq!(session.attached_camera().unwrap().urn, FRONT_URN);

    controller.swap_camera(sink.callback()).unwrap();
    assert_eq!(session.attached_camera().unwrap().urn, BACK_WIDE_URN);
    assert_eq!(sink.received().len(), 2);
}

#[test]
fn two_camera_device_swaps_to_any_opposite_camera() {
    let engine = SimulatedEngine::with_catalog(two_camera_catalog(), Dispatch::Immediate);
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let sink = PreviewSink::default();

    controller
        .set_camera_position(CameraPosition::Front, sink.callback())
        .unwrap();

    assert_eq!(
        engine.last_session().unwrap().attached_camera().unwrap().urn,
        FRONT_URN
    );
}

#[test]
fn failed_exchange_keeps_camera_and_unblocks_pipeline() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let session = engine.last_session().unwrap();
    session.fail_next_exchange(EngineError::new(-5, "SimulatedBroadcastErrorDomain", "busy"));
    let sink = PreviewSink::default();

    controller
        .set_camera_position(CameraPosition::Front, sink.callback())
        .unwrap();
    controller.set_is_muted(true).unwrap();

    assert_eq!(session.attached_camera().unwrap().urn, BACK_WIDE_URN);
    assert_eq!(
        controller.attached_devices().unwrap().camera_urn(),
        Some(BACK_WIDE_URN)
    );
    assert!(sink.received().is_empty());
    assert_eq!(session.gain(MICROPHONE_URN), Some(0.0));
}

#[test]
fn runtime_mute_sets_microphone_gain() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let session = engine.last_session().unwrap();

    controller.set_is_muted(true).unwrap();
    assert_eq!(session.gain(MICROPHONE_URN), Some(0.0));

    controller.set_is_muted(false).unwrap();
    assert_eq!(session.gain(MICROPHONE_URN), Some(1.0));
}

#[test]
fn operations_wait_for_quiescence_and_run_in_order() {
    let engine = SimulatedEngine::manual();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let session = engine.last_session().unwrap();
    let sink = PreviewSink::default();

    controller.set_is_muted(true).unwrap();
    controller
        .set_camera_position(CameraPosition::Front, sink.callback())
        .unwrap();
    controller.set_is_muted(false).unwrap();

    assert_eq!(controller.pending_device_operations(), 2);
    assert!(session.history().is_empty());

    session.run_pending();

    let history = session.history();
    assert_eq!(history.len(), 3, "{history:?}");
    assert!(history[0].starts_with("set-gain"));
    assert!(history[1].starts_with("exchange"));
    assert!(history[2].starts_with("set-gain"));
    assert_eq!(session.overlapping_mutations(), 0);
    assert_eq!(session.gain(MICROPHONE_URN), Some(1.0));
    assert_eq!(session.attached_camera().unwrap().urn, FRONT_URN);
    assert_eq!(controller.pending_device_operations(), 0);
    assert_eq!(sink.received().len(), 1);
}

#[test]
fn add_slot_without_session_is_a_no_op() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);

    controller
        .add_slot(&TestView::new(Rect::new(0.0, 0.0, 10.0, 10.0), 1), "logo")
        .unwrap();
    controller.initiate().unwrap();

    let session = engine.last_session().unwrap();
    assert!(session.mixer_slots().is_empty());
    assert!(session.created_sources().is_empty());
}

#[test]
fn add_slot_maps_view_into_canvas_units() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();

    controller
        .add_slot(&TestView::new(Rect::new(100.0, 200.0, 50.0, 100.0), 1), "logo")
        .unwrap();

    let slots = engine.last_session().unwrap().mixer_slots();
    assert_eq!(slots.len(), 1);
    let slot = &slots[0];
    assert_eq!(slot.name, "logo");
    assert_eq!(slot.z_index, 2);
    assert_eq!(slot.aspect, AspectMode::Fit);
    assert_eq!(slot.preferred_video_input, SlotInput::UserImage);
    assert_relative_eq!(slot.frame.origin.x, 320.0);
    assert_relative_eq!(slot.frame.origin.y, 180.0);
    assert_relative_eq!(slot.frame.size.width, 160.0);
    assert_relative_eq!(slot.frame.size.height, 90.0);
}

#[test]
fn add_slot_injects_one_snapshot() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();

    controller
        .add_slot(&TestView::new(Rect::new(0.0, 0.0, 40.0, 40.0), 7), "badge")
        .unwrap();

    let session = engine.last_session().unwrap();
    let sources = session.created_sources();
    assert_eq!(sources.len(), 1);
    let frames = sources[0].frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].bgra, vec![7; 16]);
    assert!(controller.has_slot_source("badge"));
    assert_eq!(session.live_sources("badge").len(), 1);
}

#[test]
fn blank_slot_name_is_rejected() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();

    let err = controller
        .add_slot(&TestView::new(Rect::new(0.0, 0.0, 40.0, 40.0), 7), " ")
        .unwrap_err();

    assert!(matches!(err, BroadcastError::Configuration(_)));
}

#[test]
fn same_slot_name_keeps_one_live_source() {
    for engine in [SimulatedEngine::new(), SimulatedEngine::manual()] {
        let (mut controller, _) = controller(&engine);
        controller.initiate().unwrap();
        let session = engine.last_session().unwrap();

        controller
            .add_slot(&TestView::new(Rect::new(0.0, 0.0, 40.0, 40.0), 1), "logo")
            .unwrap();
        controller
            .add_slot(&TestView::new(Rect::new(10.0, 10.0, 40.0, 40.0), 2), "logo")
            .unwrap();
        session.run_pending();

        let sources = session.created_sources();
        assert_eq!(sources.len(), 2);
        let (first, second) = (sources[0].id().to_string(), sources[1].id().to_string());
        assert_eq!(session.live_sources("logo"), vec![second.clone()]);
        assert_eq!(session.max_live_sources_per_slot(), 1);
        assert_eq!(session.overlapping_mutations(), 0);
        assert_eq!(controller.live_slot_count(), 1);

        let history = session.history();
        let detached = history
            .iter()
            .position(|entry| *entry == format!("detach {first}"))
            .unwrap();
        let attached = history
            .iter()
            .position(|entry| *entry == format!("attach logo {second}"))
            .unwrap();
        assert!(detached < attached, "{history:?}");
    }
}

#[test]
fn teardown_releases_slot_sources() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    controller
        .add_slot(&TestView::new(Rect::new(0.0, 0.0, 40.0, 40.0), 1), "logo")
        .unwrap();
    let source = engine.last_session().unwrap().created_sources().remove(0);
    let held = Arc::strong_count(&source);

    controller.deinitiate();

    assert_eq!(Arc::strong_count(&source), held - 1);
}

#[test]
fn queued_operations_are_dropped_after_teardown() {
    let engine = SimulatedEngine::manual();
    let (mut controller, _) = controller(&engine);
    controller.initiate().unwrap();
    let session = engine.last_session().unwrap();
    let sink = PreviewSink::default();

    controller
        .set_camera_position(CameraPosition::Front, sink.callback())
        .unwrap();
    controller
        .add_slot(&TestView::new(Rect::new(0.0, 0.0, 40.0, 40.0), 1), "logo")
        .unwrap();
    controller.deinitiate();
    session.run_pending();

    assert!(session.history().is_empty());
    assert!(session.created_sources().is_empty());
    assert!(sink.received().is_empty());
}

#[test]
fn preview_settings_apply_to_delivered_previews() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    let sink = PreviewSink::default();
    controller
        .set_camera_preview_aspect_mode(AspectMode::Fill, sink.callback())
        .unwrap();
    controller.initiate().unwrap();
    assert_eq!(
        controller.configuration().unwrap().preview.aspect_mode,
        AspectMode::Fill
    );
    assert!(sink.received().is_empty());

    controller
        .set_is_camera_preview_mirrored(true, sink.callback())
        .unwrap();
    controller.get_camera_preview_async(sink.callback()).unwrap();

    let previews = sink.received();
    assert_eq!(previews.len(), 2);
    for preview in previews {
        assert_eq!(preview.aspect_mode, AspectMode::Fill);
        assert!(preview.mirrored);
        assert_eq!(preview.camera_urn.as_deref(), Some(BACK_WIDE_URN));
    }
}

#[test]
fn zoom_targets_back_wide_camera_regardless_of_attachment() {
    let engine = SimulatedEngine::new();
    let (mut controller, _) = controller(&engine);
    let sink = PreviewSink::default();
    controller
        .set_camera_position(CameraPosition::Front, sink.callback())
        .unwrap();
    controller.initiate().unwrap();

    controller.set_zoom(2.5).unwrap();

    assert_eq!(engine.zoom_ramps(), vec![(2.5, 3.0)]);
    assert!(!engine.zoom_is_locked());
}

#[test]
fn zoom_lock_contention_is_swallowed() {
    let engine = SimulatedEngine::new();
    let (controller, _) = controller(&engine);
    engine.set_zoom_contended(true);

    controller.set_zoom(2.0).unwrap();

    assert!(engine.zoom_ramps().is_empty());
}
