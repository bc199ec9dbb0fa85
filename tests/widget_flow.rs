//! End-to-end behaviour of the mapping widget.

use std::time::{Duration, Instant};

use mapping_core::config::AppConfig;
use mapping_core::model::build_type::BuildType;
use mapping_core::model::row::MappingElement;
use mapping_core::parsers::mapping_response;
use mapping_core::services::fetch::{MappingSource, StaticMappingSource};
use mapping_core::services::preview::DuplicateDetection;
use mapping_core::view::events::InputEvent;
use mapping_core::view::widget::MappingWidget;
use mapping_core::MappingError;

/// Serves a canned ajax body through the real response parser.
struct XmlSource(&'static str);

impl MappingSource for XmlSource {
    fn fetch_mappings(&self, _build_type_id: &str) -> Result<Vec<MappingElement>, MappingError> {
        mapping_response::parse(self.0)
    }
}

fn build_types() -> Vec<BuildType> {
    vec![
        BuildType {
            id: Some("bt1".into()),
            full_name: "Project :: Compile".into(),
        },
        BuildType {
            id: None,
            full_name: "Template".into(),
        },
        BuildType {
            id: Some("bt2".into()),
            full_name: "Project :: Test".into(),
        },
    ]
}

fn ready_widget(cfg: &AppConfig) -> MappingWidget {
    let mut w = MappingWidget::new(cfg);
    w.fill_build_types(&build_types());
    w.select_build_type(1).unwrap();
    w
}

#[test]
fn selector_lists_only_identified_build_types() {
    let mut w = MappingWidget::new(&AppConfig::default());
    w.fill_build_types(&build_types());
    let state = w.state();

    assert_eq!(state.options.len(), 3);
    assert_eq!(state.options[2].text, "[bt2] Project :: Test");
    assert!(!state.add_mapping_enabled);

    w.select_build_type(2).unwrap();
    assert!(w.state().add_mapping_enabled);
    assert_eq!(w.selected_build_type_id(), Some("bt2"));
}

#[test]
fn server_response_becomes_rows() {
    let mut w = ready_widget(&AppConfig::default());
    let source = XmlSource(
        r#"<response><mapping>
            <map from="." to="perforce://rusps-app01:1666:////depot/src" comment="mock"/>
            <map from="." to="perforce://rusps-app01:1666:////depot/other" comment="second root"/>
            <map from="tools" to="svn://repo/tools" comment=""/>
        </mapping></response>"#,
    );

    assert_eq!(w.add_mapping(&source).unwrap(), 3);
    let state = w.state();

    assert!(state.table_visible);
    assert_eq!(
        state.results_config,
        ".=perforce://rusps-app01:1666:////depot/src\r\ntools=svn://repo/tools\r\n"
    );
    assert!(state.rows[0].markers.duplicated_below);
    assert!(state.rows[1].markers.duplicate);
    assert!(!state.rows[2].markers.duplicate);
}

#[test]
fn unparsable_or_empty_response_changes_nothing() {
    let mut w = ready_widget(&AppConfig::default());

    assert_eq!(w.add_mapping(&XmlSource("<response><mapping></response>")).unwrap(), 0);
    assert_eq!(w.add_mapping(&XmlSource("<response/>")).unwrap(), 0);

    let state = w.state();
    assert!(state.rows.is_empty());
    assert!(!state.table_visible);
    assert_eq!(state.results_config, "");
}

#[test]
fn repeated_fetch_appends_after_existing_rows() {
    let mut w = ready_widget(&AppConfig::default());
    let source = StaticMappingSource::new().with(
        "bt1",
        vec![
            MappingElement::new("a", "svn://r/a", ""),
            MappingElement::new("b", "svn://r/b", ""),
        ],
    );

    w.add_mapping(&source).unwrap();
    w.add_mapping(&source).unwrap();

    assert_eq!(w.rows().len(), 4);
    assert_eq!(w.results_config(), "a=svn://r/a\r\nb=svn://r/b\r\n");
    let dup: Vec<bool> = w.rows().iter().map(|r| r.markers.duplicate).collect();
    assert_eq!(dup, vec![false, false, true, true]);
}

#[test]
fn typing_is_debounced_and_blur_is_immediate() {
    let mut w = ready_widget(&AppConfig::default());
    let a = w.add_mapping_row("a", "1", "");
    let b = w.add_mapping_row("b", "2", "");
    let t0 = Instant::now();

    w.edit_row(b, Some("a".into()), None).unwrap();
    w.handle_event(b, InputEvent::KeyPress, t0);
    w.handle_event(b, InputEvent::KeyPress, t0 + Duration::from_millis(10));
    assert!(!w.tick(t0 + Duration::from_millis(25)));
    assert!(w.tick(t0 + Duration::from_millis(30)));
    assert_eq!(w.results_config(), "a=1\r\n");

    w.edit_row(a, Some("c".into()), None).unwrap();
    w.handle_event(a, InputEvent::Blur, t0 + Duration::from_millis(40));
    assert_eq!(w.results_config(), "c=1\r\na=2\r\n");
}

#[test]
fn duplicate_detection_can_be_switched_off() {
    let cfg = AppConfig {
        duplicate_detection: DuplicateDetection::Disabled,
        ..AppConfig::default()
    };
    let mut w = ready_widget(&cfg);
    let a = w.add_mapping_row("a", "1", "");
    w.add_mapping_row("a", "2", "");
    w.handle_event(a, InputEvent::Blur, Instant::now());

    assert_eq!(w.results_config(), "a=1\r\na=2\r\n");
    assert!(w.rows().iter().all(|r| !r.markers.duplicate));
}
