use super::{
    clamp_font_size, reading_progress, NavigatorConfig, ReadingNavigator, Viewport,
    DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE,
};
use crate::section::{Section, SectionKind};
use std::collections::HashMap;

/// Absolute anchor positions plus a scroll offset, like a browser page.
struct FakeViewport {
    scroll_top: f64,
    scroll_height: f64,
    client_height: f64,
    anchors: HashMap<String, f64>,
    requested: Vec<f64>,
}

impl FakeViewport {
    fn new(anchors: &[(&str, f64)]) -> Self {
        Self {
            scroll_top: 0.0,
            scroll_height: 3000.0,
            client_height: 1000.0,
            anchors: anchors
                .iter()
                .map(|(id, top)| ((*id).to_string(), *top))
                .collect(),
            requested: Vec::new(),
        }
    }
}

impl Viewport for FakeViewport {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }

    fn anchor_top(&self, id: &str) -> Option<f64> {
        self.anchors.get(id).map(|top| top - self.scroll_top)
    }

    fn scroll_to(&mut self, position: f64) {
        self.requested.push(position);
        self.scroll_top = position;
    }
}

fn section(id: &str, kind: SectionKind) -> Section {
    Section {
        id: id.to_string(),
        title: id.to_uppercase(),
        kind,
        content: vec![id.to_string()],
    }
}

fn navigator() -> ReadingNavigator {
    ReadingNavigator::new(
        vec![
            section("section-0", SectionKind::Header),
            section("art-1", SectionKind::Article),
            section("art-2", SectionKind::Article),
        ],
        NavigatorConfig::default(),
    )
}

fn viewport() -> FakeViewport {
    FakeViewport::new(&[("section-0", 0.0), ("art-1", 500.0), ("art-2", 1500.0)])
}

#[test]
fn test_initial_state() {
    let nav = navigator();
    assert_eq!(nav.state().active_section_id, "");
    assert!(nav.state().reading_progress.abs() < f64::EPSILON);
    assert_eq!(nav.state().font_size, DEFAULT_FONT_SIZE);
    assert!(nav.active_section().is_none());
}

#[test]
fn test_scroll_selects_first_section_in_band() {
    let mut nav = navigator();
    let mut vp = viewport();

    vp.scroll_top = 450.0;
    nav.on_scroll(&vp);
    assert_eq!(nav.state().active_section_id, "art-1");
    assert!(nav.active_is_article());

    vp.scroll_top = 0.0;
    nav.on_scroll(&vp);
    assert_eq!(nav.state().active_section_id, "section-0");
    assert!(!nav.active_is_article());
}

#[test]
fn test_active_section_is_sticky_outside_band() {
    let mut nav = navigator();
    let mut vp = viewport();

    vp.scroll_top = 500.0;
    nav.on_scroll(&vp);
    assert_eq!(nav.state().active_section_id, "art-1");

    // art-1 is now above the viewport, art-2 still far below the band.
    vp.scroll_top = 900.0;
    nav.on_scroll(&vp);
    assert_eq!(nav.state().active_section_id, "art-1");
}

#[test]
fn test_unmounted_anchors_are_skipped() {
    let mut nav = navigator();
    let mut vp = FakeViewport::new(&[("art-2", 1500.0)]);

    vp.scroll_top = 1400.0;
    nav.on_scroll(&vp);
    assert_eq!(nav.state().active_section_id, "art-2");
}

#[test]
fn test_progress_follows_scroll() {
    let mut nav = navigator();
    let mut vp = viewport();

    vp.scroll_top = 1000.0;
    nav.on_scroll(&vp);
    assert!((nav.state().reading_progress - 50.0).abs() < 1e-9);

    vp.scroll_top = 2000.0;
    nav.on_scroll(&vp);
    assert!((nav.state().reading_progress - 100.0).abs() < 1e-9);
}

#[test]
fn test_progress_is_bounded() {
    assert!((reading_progress(5000.0, 3000.0, 1000.0) - 100.0).abs() < 1e-9);
    assert!(reading_progress(-20.0, 3000.0, 1000.0).abs() < 1e-9);
    assert!(reading_progress(0.0, 500.0, 1000.0).abs() < 1e-9);
    assert!(reading_progress(0.0, 1000.0, 1000.0).abs() < 1e-9);
}

#[test]
fn test_scroll_to_section_clears_header() {
    let mut nav = navigator();
    let mut vp = viewport();
    vp.scroll_top = 300.0;

    nav.toggle_toc();
    assert!(nav.state().toc_open);

    nav.scroll_to_section("art-2", &mut vp);
    assert_eq!(vp.requested, vec![1400.0]);
    assert!(!nav.state().toc_open);
}

#[test]
fn test_scroll_to_first_section_never_goes_negative() {
    let mut nav = navigator();
    let mut vp = viewport();

    nav.scroll_to_section("section-0", &mut vp);
    assert_eq!(vp.requested, vec![0.0]);
}

#[test]
fn test_scroll_to_missing_section_only_closes_toc() {
    let mut nav = navigator();
    let mut vp = viewport();
    nav.toggle_toc();

    nav.scroll_to_section("art-99", &mut vp);
    assert!(vp.requested.is_empty());
    assert!(!nav.state().toc_open);
}

#[test]
fn test_font_size_is_clamped() {
    let mut nav = navigator();
    for _ in 0..10 {
        nav.adjust_font_size(2);
    }
    assert_eq!(nav.state().font_size, MAX_FONT_SIZE);
    assert_eq!(nav.adjust_font_size(2), MAX_FONT_SIZE);

    for _ in 0..10 {
        nav.adjust_font_size(-2);
    }
    assert_eq!(nav.state().font_size, MIN_FONT_SIZE);
    assert_eq!(clamp_font_size(MIN_FONT_SIZE, -100), MIN_FONT_SIZE);
    assert_eq!(clamp_font_size(16, 3), 19);
}

#[test]
fn test_toc_flags_active_entry() {
    let mut nav = navigator();
    let mut vp = viewport();
    vp.scroll_top = 1450.0;
    nav.on_scroll(&vp);

    let toc = nav.toc();
    assert_eq!(toc.len(), 3);
    assert_eq!(toc[0].kind, SectionKind::Header);
    assert!(toc.iter().filter(|e| e.active).all(|e| e.id == "art-2"));
    assert_eq!(toc.iter().filter(|e| e.active).count(), 1);
}

#[test]
fn test_neighbouring_sections() {
    let nav = navigator();
    assert_eq!(nav.next_section("section-0").map(|s| s.id.as_str()), Some("art-1"));
    assert!(nav.next_section("art-2").is_none());
    assert_eq!(nav.previous_section("art-2").map(|s| s.id.as_str()), Some("art-1"));
    assert!(nav.previous_section("section-0").is_none());
    assert!(nav.next_section("missing").is_none());
}

#[test]
fn test_article_flag_follows_section_kind() {
    let mut nav = ReadingNavigator::new(
        vec![
            section("artes-y-oficios", SectionKind::Header),
            section("disposicion-1", SectionKind::Article),
        ],
        NavigatorConfig::default(),
    );
    assert!(!nav.active_is_article());

    assert!(nav.activate("artes-y-oficios"));
    assert!(!nav.active_is_article());

    assert!(nav.activate("disposicion-1"));
    assert!(nav.active_is_article());
}

#[test]
fn test_activate_ignores_unknown_ids() {
    let mut nav = navigator();
    assert!(nav.activate("art-2"));
    assert!(!nav.activate("art-99"));
    assert_eq!(nav.state().active_section_id, "art-2");
}

#[test]
fn test_empty_document_is_a_no_op() {
    let mut nav = ReadingNavigator::new(Vec::new(), NavigatorConfig::default());
    let mut vp = FakeViewport::new(&[]);

    nav.on_scroll(&vp);
    nav.scroll_to_section("art-1", &mut vp);

    assert!(nav.toc().is_empty());
    assert_eq!(nav.state().active_section_id, "");
}

#[test]
fn test_replacing_sections_resets_position_only() {
    let mut nav = navigator();
    let mut vp = viewport();
    vp.scroll_top = 1000.0;
    nav.on_scroll(&vp);
    nav.adjust_font_size(4);
    nav.toggle_columns();

    nav.replace_sections(vec![section("intro", SectionKind::Intro)]);

    assert_eq!(nav.state().active_section_id, "");
    assert!(nav.state().reading_progress.abs() < f64::EPSILON);
    assert_eq!(nav.state().font_size, 20);
    assert!(nav.state().column_mode);
}
