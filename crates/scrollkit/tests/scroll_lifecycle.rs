//! End-to-end scenarios: controller, scenes, pins and tweens against the
//! in-memory environment.

use scrollkit::dom::{shared, DomEnv, ManualPacer, MockDom, SharedDom};
use scrollkit::tween::{Timeline, TweenLike};
use scrollkit::{
    Controller, ControllerOptions, Driver, Duration, PinOptions, Scene, SceneEventKind,
    SceneOptions, ScrollTarget, TriggerHook,
};
use scrollkit_core::{Point, SceneState, Size};
use std::sync::{Arc, Mutex};

fn init_logs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn document_controller() -> Controller {
    init_logs();
    let mock = MockDom::new(Size::new(800.0, 600.0));
    Controller::new(shared(mock), ControllerOptions::default()).unwrap()
}

fn scene_at(dom: SharedDom, offset: f64, duration: f64) -> Scene {
    Scene::new(
        dom,
        SceneOptions {
            duration: Duration::Fixed(duration),
            offset,
            trigger_hook: TriggerHook::OnLeave,
            ..SceneOptions::default()
        },
    )
}

fn scroll(controller: &mut Controller, pos: f64) {
    let dom = controller.dom();
    let container = controller.info().container;
    dom.lock().unwrap().set_scroll_offset(container, true, pos);
    controller.tick_frame();
}

#[test]
fn pin_lifecycle_against_the_document() {
    init_logs();
    let mut mock = MockDom::new(Size::new(800.0, 600.0));
    let boxed = mock.create_element("box");
    mock.set_position(boxed, Point::new(0.0, 100.0));
    mock.set_size(boxed, Size::new(800.0, 80.0));
    let root = mock.document_root();
    let dom = shared(mock);

    let mut controller = Controller::new(dom.clone(), ControllerOptions::default()).unwrap();
    let mut scene = scene_at(controller.dom(), 100.0, 100.0);
    scene.set_pin(boxed, PinOptions::default());
    let id = controller.add_scene(scene);
    controller.update(true);

    // The spacer holds the box's place in the tree from the start.
    let spacer = {
        let env = dom.lock().unwrap();
        let spacer = env.parent(boxed).unwrap();
        assert!(env.is_pin_spacer(spacer));
        assert!(env.has_class(spacer, "scrollkit-pin-spacer"));
        assert_eq!(env.parent(spacer), Some(root));
        spacer
    };

    // Mid-scene the box is fixed and the spacer padding splits the
    // duration around the current progress.
    scroll(&mut controller, 150.0);
    {
        let env = dom.lock().unwrap();
        assert_eq!(
            env.computed_position(boxed),
            scrollkit::dom::PositionMode::Fixed
        );
        let padding = env.resolved_padding(spacer);
        assert_eq!(padding.top, 50.0);
        assert_eq!(padding.bottom, 50.0);
    }
    assert_eq!(controller.scene(id).unwrap().state(), SceneState::During);

    // Past the end the box returns to flow and the spacer keeps the full
    // duration as leading padding.
    scroll(&mut controller, 300.0);
    {
        let env = dom.lock().unwrap();
        assert_eq!(
            env.computed_position(boxed),
            scrollkit::dom::PositionMode::Relative
        );
        let padding = env.resolved_padding(spacer);
        assert_eq!(padding.top, 100.0);
        assert_eq!(padding.bottom, 0.0);
    }

    // Removing with reset unwraps the box and drops the spacer.
    controller.scene_mut(id).unwrap().remove_pin(true);
    {
        let env = dom.lock().unwrap();
        assert_eq!(env.parent(boxed), Some(root));
        assert!(!env.element_exists(spacer));
    }
}

#[test]
fn disabling_a_pinned_scene_unpins_in_place() {
    init_logs();
    let mut mock = MockDom::new(Size::new(800.0, 600.0));
    let boxed = mock.create_element("box");
    mock.set_position(boxed, Point::new(0.0, 100.0));
    mock.set_size(boxed, Size::new(800.0, 80.0));
    let dom = shared(mock);

    let mut controller = Controller::new(dom.clone(), ControllerOptions::default()).unwrap();
    let mut scene = scene_at(controller.dom(), 100.0, 100.0);
    scene.set_pin(boxed, PinOptions::default());
    let id = controller.add_scene(scene);

    scroll(&mut controller, 150.0);
    assert_eq!(controller.scene(id).unwrap().state(), SceneState::During);
    {
        let env = dom.lock().unwrap();
        assert_eq!(
            env.computed_position(boxed),
            scrollkit::dom::PositionMode::Fixed
        );
    }

    // Disabling mid-scene releases the fixed positioning but keeps the
    // spacer padding, so the element stays where it was pinned.
    controller.scene_mut(id).unwrap().set_enabled(false);
    {
        let env = dom.lock().unwrap();
        assert_eq!(
            env.computed_position(boxed),
            scrollkit::dom::PositionMode::Relative
        );
        let spacer = env.parent(boxed).unwrap();
        let padding = env.resolved_padding(spacer);
        assert_eq!(padding.top, 50.0);
        assert_eq!(padding.bottom, 50.0);
    }
}

#[test]
fn tween_is_positioned_by_scene_progress() {
    let mut controller = document_controller();
    let mut timeline = Timeline::new();
    timeline.add(0.0, 1000.0, 0.0, 1.0, Default::default());
    let mut scene = scene_at(controller.dom(), 100.0, 100.0);
    scene.set_tween(Box::new(timeline));
    let id = controller.add_scene(scene);

    scroll(&mut controller, 150.0);
    assert_eq!(controller.scene(id).unwrap().progress(), 0.5);

    let tween = controller
        .scene_mut(id)
        .unwrap()
        .remove_tween(false)
        .unwrap();
    assert!((tween.progress() - 0.5).abs() < 1e-9);
    assert!(tween.paused());
}

#[test]
fn zero_duration_scene_round_trip_event_order() {
    let mut controller = document_controller();
    let mut scene = scene_at(controller.dom(), 0.0, 0.0);
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    scene.on(
        &[
            SceneEventKind::Enter,
            SceneEventKind::Leave,
            SceneEventKind::Start,
            SceneEventKind::End,
            SceneEventKind::Progress,
        ],
        move |event| {
            sink.lock().unwrap().push(format!("{:?}", event.kind()));
        },
    );
    controller.add_scene(scene);
    controller.update(true);

    scroll(&mut controller, 50.0);
    scroll(&mut controller, 0.0);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["Enter", "Start", "Progress", "Progress", "Start", "Leave"]
    );
}

#[test]
fn shifted_scenes_are_resorted() {
    let mut controller = document_controller();
    let first = controller.add_scene(scene_at(controller.dom(), 100.0, 100.0));
    let second = controller.add_scene(scene_at(controller.dom(), 300.0, 100.0));
    controller.update(true);
    assert_eq!(controller.scene_ids(), &[first, second]);

    controller.scene_mut(first).unwrap().set_offset(400.0);
    controller.update(true);
    assert_eq!(controller.scene_ids(), &[second, first]);
}

#[test]
fn driver_steps_feed_the_controller() {
    let controller = document_controller();
    let mut driver = Driver::with_pacer(controller, Box::new(ManualPacer::new()));
    let id = {
        let controller = driver.controller_mut();
        let scene = scene_at(controller.dom(), 100.0, 100.0);
        controller.add_scene(scene)
    };

    {
        let controller = driver.controller_mut();
        let dom = controller.dom();
        let container = controller.info().container;
        dom.lock().unwrap().set_scroll_offset(container, true, 175.0);
    }
    driver.step();
    assert_eq!(driver.controller().scene(id).unwrap().progress(), 0.75);
}

#[test]
fn scroll_to_scene_then_update_lands_before_the_window() {
    let mut controller = document_controller();
    let id = controller.add_scene(scene_at(controller.dom(), 120.0, 60.0));
    controller.scroll_to(ScrollTarget::Scene(id));
    controller.update(true);
    let scene = controller.scene(id).unwrap();
    assert_eq!(scene.progress(), 0.0);
    assert_eq!(scene.state(), SceneState::Before);
}
