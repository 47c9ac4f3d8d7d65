/// PNG and JSON export of grown trees
use fractree::export::{render_image, save_png, ExportError, TreeDocument};
use fractree::{GrowthConfig, GrowthEngine, Rgb};

fn grown(max_depth: u32) -> GrowthEngine {
    let cfg = GrowthConfig {
        max_depth,
        canvas_width: 300,
        canvas_height: 200,
        ..GrowthConfig::default()
    };
    let mut engine = GrowthEngine::seeded(cfg, 21).unwrap();
    engine.plant_trunk(150.0, 190.0);
    engine.grow_full_tree().unwrap();
    engine
}

#[test]
fn json_round_trips_field_for_field() {
    let engine = grown(4);
    let doc = TreeDocument::new(engine.config(), engine.branches());
    let text = doc.to_json().unwrap();
    assert!(text.contains("\"parent_id\": null"));
    assert!(text.contains("\"trunk_color\": \"#7c2d12\""));
    assert!(text.contains("\"direction\": \"upward\""));

    let back = TreeDocument::from_json(&text).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn json_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.json");
    let engine = grown(3);
    TreeDocument::new(engine.config(), engine.branches()).save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let doc = TreeDocument::from_json(&text).unwrap();
    assert_eq!(doc.branches.len(), 15);
}

#[test]
fn png_has_canvas_size_and_trunk_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.png");
    let engine = grown(3);
    save_png(&path, engine.config(), engine.branches()).unwrap();

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (300, 200));
    let trunk = Rgb::new(0x7c, 0x2d, 0x12);
    assert_eq!(img.get_pixel(150, 185).0, [trunk.r, trunk.g, trunk.b]);
    let bg = engine.config().bg_color;
    assert_eq!(img.get_pixel(2, 2).0, [bg.r, bg.g, bg.b]);
}

#[test]
fn rendering_empty_tree_is_just_background() {
    let engine = GrowthEngine::seeded(GrowthConfig::default(), 0).unwrap();
    let img = render_image(engine.config(), engine.branches());
    let bg = engine.config().bg_color;
    assert!(img.pixels().all(|p| p.0 == [bg.r, bg.g, bg.b]));
}

#[test]
fn saving_nothing_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let engine = GrowthEngine::seeded(GrowthConfig::default(), 0).unwrap();
    let png = dir.path().join("x.png");
    let err = save_png(&png, engine.config(), engine.branches()).unwrap_err();
    assert!(matches!(err, ExportError::EmptyTree));
    let err = TreeDocument::new(engine.config(), engine.branches())
        .save(&dir.path().join("x.json"))
        .unwrap_err();
    assert!(matches!(err, ExportError::EmptyTree));
}

#[test]
fn huge_branches_render_only_their_visible_part() {
    for base_length in [2e8, 1e19] {
        let cfg = GrowthConfig {
            max_depth: 2,
            canvas_width: 300,
            canvas_height: 200,
            base_length,
            trunk_thickness: 1e12,
            ..GrowthConfig::default()
        };
        let mut engine = GrowthEngine::seeded(cfg, 3).unwrap();
        engine.plant_trunk(150.0, 190.0);
        engine.grow_full_tree().unwrap();

        let img = render_image(engine.config(), engine.branches());
        let trunk = image::Rgb([0x7c, 0x2d, 0x12]);
        let bg = image::Rgb([0x0f, 0x17, 0x2a]);
        let top = img.get_pixel(150, 10);
        assert_eq!(top, &trunk, "base length {}", base_length);
        assert_eq!(img.get_pixel(0, 50), &trunk);
        assert_eq!(img.get_pixel(299, 50), &trunk);
        assert_eq!(img.get_pixel(150, 195), &bg);
    }
}
