//! Hit-testing scenarios through a project.

use glam::DVec2;
use quill_geom::{Path, Rectangle};
use quill_scene::{Event, HitKind, HitOptions, Item, Project, Style};
use std::cell::RefCell;
use std::rc::Rc;

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

fn square() -> Item {
    Item::path(Path::rectangle(Rectangle::new(0.0, 0.0, 20.0, 20.0)))
}

#[test]
fn test_stroke_hit_with_zero_tolerance() {
    let mut project = Project::new("hits");
    let context = project.context();
    let stroked = context
        .insert(&mut project.scene, square().with_style(Style::stroke(BLACK, 4.0)))
        .unwrap();
    let options = HitOptions::default().with_tolerance(0.0);

    let on_edge = DVec2::new(10.0, 0.0);
    let hit = project.scene.hit_test(on_edge, &options).unwrap();
    assert_eq!(hit.item, stroked);
    assert_eq!(hit.kind, HitKind::Stroke);
    assert!((hit.point - on_edge).length() < 1e-9);

    // Inside the stroke width but outside the outline
    let hit = project.scene.hit_test(DVec2::new(10.0, -1.5), &options).unwrap();
    assert_eq!(hit.kind, HitKind::Stroke);
    assert!(project.scene.hit_test(DVec2::new(10.0, -2.5), &options).is_none());
}

#[test]
fn test_stroke_hit_away_from_edge_midpoints() {
    let mut project = Project::new("hits");
    let layer = project.context().layer;
    let stroked = project
        .scene
        .add_child(layer, square().with_style(Style::stroke(BLACK, 4.0)))
        .unwrap();
    let options = HitOptions::default().with_tolerance(0.0);

    for (probe, on_outline) in [
        (DVec2::new(5.0, -1.5), DVec2::new(5.0, 0.0)),
        (DVec2::new(5.0, 0.0), DVec2::new(5.0, 0.0)),
        (DVec2::new(21.5, 15.0), DVec2::new(20.0, 15.0)),
        (DVec2::new(2.5, 19.0), DVec2::new(2.5, 20.0)),
    ] {
        let hit = project.scene.hit_test(probe, &options).unwrap();
        assert_eq!(hit.item, stroked);
        assert_eq!(hit.kind, HitKind::Stroke);
        assert!((hit.point - on_outline).length() < 1e-6, "{probe} hit at {}", hit.point);
    }
    assert!(project.scene.hit_test(DVec2::new(5.0, -2.5), &options).is_none());
}

#[test]
fn test_fill_only_item_needs_containment() {
    let mut project = Project::new("hits");
    let context = project.context().with_style(Style::fill(RED));
    let filled = context.insert(&mut project.scene, square()).unwrap();
    let options = HitOptions::default().with_tolerance(0.0);

    assert!(project.scene.hit_test(DVec2::new(10.0, -1.5), &options).is_none());
    let hit = project.scene.hit_test(DVec2::new(10.0, 1.5), &options).unwrap();
    assert_eq!(hit.item, filled);
    assert_eq!(hit.kind, HitKind::Fill);
}

#[test]
fn test_transformed_items_hit_in_scene_space() {
    let mut project = Project::new("hits");
    let context = project.context().with_style(Style::fill(RED));
    let group = context.insert(&mut project.scene, Item::group()).unwrap();
    let child = project.scene.add_child(group, square().with_style(Style::fill(RED))).unwrap();
    project.scene.translate(group, DVec2::new(100.0, 0.0)).unwrap();

    let options = HitOptions::default();
    assert!(project.scene.hit_test(DVec2::new(10.0, 10.0), &options).is_none());
    assert_eq!(project.scene.hit_test(DVec2::new(110.0, 10.0), &options).unwrap().item, child);
}

#[test]
fn test_hits_reach_event_handlers() {
    let mut project = Project::new("hits");
    let context = project.context().with_style(Style::fill(RED));
    let item = context.insert(&mut project.scene, square()).unwrap();
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicks);
    project
        .scene
        .on(item, "click", move |event: &mut Event| {
            sink.borrow_mut().push(event.hit.as_ref().map(|hit| hit.kind.clone()));
        })
        .unwrap();

    let hit = project.scene.fire_at("click", DVec2::new(5.0, 5.0), &HitOptions::default());
    assert!(hit.is_some());
    assert!(project.scene.fire_at("click", DVec2::new(50.0, 50.0), &HitOptions::default()).is_none());
    assert_eq!(*clicks.borrow(), vec![Some(HitKind::Fill)]);
}
