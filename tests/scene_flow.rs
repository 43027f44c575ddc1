use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use voronoi_nav::core_modules::edge_detector::edge_detector;
use voronoi_nav::{
    HoverState, HoverTransition, LabelPlacement, LabelSink, Navigator, Point, RegionLabel, Scene, SceneConfig,
    Viewport,
};

#[derive(Clone, Default)]
struct RecordingNavigator(Arc<Mutex<Vec<String>>>);

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, target: &str) {
        self.0.lock().unwrap().push(target.to_string());
    }
}

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<Vec<LabelPlacement>>>>);

impl LabelSink for RecordingSink {
    fn place_labels(&mut self, placements: &[LabelPlacement]) {
        self.0.lock().unwrap().push(placements.to_vec());
    }
}

fn seeded_scene(viewport: Viewport) -> (Scene, RecordingNavigator, RecordingSink) {
    let navigator = RecordingNavigator::default();
    let sink = RecordingSink::default();
    let config = SceneConfig {
        seed: Some(2024),
        ..SceneConfig::default()
    };
    let scene = Scene::new(config, viewport, Box::new(navigator.clone()), Box::new(sink.clone()))
        .expect("default config is valid");
    (scene, navigator, sink)
}

#[test]
fn every_frame_partitions_the_whole_grid() {
    let viewport = Viewport::new(640.0, 480.0);
    let (mut scene, _nav, _sink) = seeded_scene(viewport);

    for frame in 0..3 {
        scene.set_pointer(Some(Point::new(100.0 + frame as f64 * 150.0, 240.0)));
        let report = scene.frame();
        assert_eq!(report.buckets.total_samples(), 64 * 48);

        let mut cells = HashSet::new();
        for (region, samples) in report.buckets.iter() {
            for sample in samples {
                assert_eq!(sample.region, region);
                assert!(cells.insert((sample.column, sample.row)));
            }
        }
        assert_eq!(cells.len(), 64 * 48);
    }
}

#[test]
fn sites_stay_inside_the_margin() {
    let viewport = Viewport::new(1024.0, 768.0);
    let (scene, _nav, _sink) = seeded_scene(viewport);
    assert_eq!(scene.partition().len(), 6);
    for site in scene.partition().sites() {
        assert!(site.position.x >= 100.0 && site.position.x < 924.0);
        assert!(site.position.y >= 100.0 && site.position.y < 668.0);
    }
}

#[test]
fn hover_follows_the_pointer_through_a_session() {
    let viewport = Viewport::new(640.0, 480.0);
    let (mut scene, _nav, _sink) = seeded_scene(viewport);
    let site = scene.partition().sites()[2].position;

    scene.set_pointer(Some(site));
    let entered = scene.frame().transition;
    assert_eq!(scene.hovered(), Some(2));
    assert_eq!(entered, HoverTransition::Entered(2));

    // Sitting still produces no transition but keeps the colour cycling.
    let phase = scene.phase();
    for _ in 0..4 {
        assert_eq!(scene.frame().transition, HoverTransition::Unchanged);
    }
    let drift = scene.config().hue_drift;
    assert!(((scene.phase() - phase).rem_euclid(360.0) - 4.0 * drift).abs() < 1e-9);

    // The outline only covers the hovered region, and every cell in it borders another region.
    let report = scene.frame();
    let shown = report.colors[2];
    let edges = report.hovered_edges;
    assert!(!edges.is_empty());
    for sample in &edges {
        assert_eq!(sample.region, 2);
        assert!(edge_detector::is_edge_pixel(scene.partition(), sample.point(), 2, viewport, 10.0));
    }

    scene.set_pointer(Some(Point::new(700.0, 10.0)));
    let report = scene.frame();
    assert_eq!(report.transition, HoverTransition::Left(2));
    assert_eq!(report.hover, HoverState::Idle);
    assert!(report.hovered_edges.is_empty());
    // The region keeps the colour it had on the last hovered frame.
    assert_eq!(report.colors[2], shown);
}

#[test]
fn pressing_a_region_navigates_to_its_target() {
    let viewport = Viewport::new(640.0, 480.0);
    let (mut scene, nav, _sink) = seeded_scene(viewport);

    let site = scene.partition().sites()[3].position;
    let activation = scene.press(site).expect("inside the viewport");
    scene.release();

    assert_eq!(activation.region, 3);
    assert_eq!(*nav.0.lock().unwrap(), vec!["contact-form".to_string()]);
}

#[test]
fn resize_republishes_labels_for_the_new_layout() {
    let (mut scene, _nav, sink) = seeded_scene(Viewport::new(640.0, 480.0));
    let before = scene.centroids().to_vec();

    scene.resize(Viewport::new(1280.0, 480.0)).unwrap();
    let published = sink.0.lock().unwrap();
    assert_eq!(published.len(), 2);
    let latest = &published[1];
    assert_eq!(latest.len(), 6);
    for (placement, expected) in latest.iter().zip(scene.centroids()) {
        assert_eq!(placement.position, *expected);
    }
    assert_ne!(before, scene.centroids());
    assert_eq!(latest[0].label.as_deref(), Some("about"));
}

#[test]
fn labels_shorter_than_the_site_list_leave_regions_unlinked() {
    let config = SceneConfig {
        sites: Some(vec![Point::new(10.0, 10.0), Point::new(90.0, 10.0), Point::new(50.0, 90.0)]),
        labels: vec![RegionLabel::new("home", "/")],
        seed: Some(5),
        ..SceneConfig::default()
    };
    let navigator = RecordingNavigator::default();
    let sink = RecordingSink::default();
    let mut scene = Scene::new(
        config,
        Viewport::new(100.0, 100.0),
        Box::new(navigator.clone()),
        Box::new(sink.clone()),
    )
    .unwrap();

    assert_eq!(scene.press(Point::new(50.0, 95.0)).map(|a| a.target), Some(None));
    assert_eq!(scene.press(Point::new(5.0, 5.0)).map(|a| a.target), Some(Some("/".to_string())));
    assert_eq!(*navigator.0.lock().unwrap(), vec!["/".to_string()]);

    let published = sink.0.lock().unwrap();
    assert_eq!(published[0][2].label, None);
}
