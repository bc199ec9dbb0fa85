//! State of the "VCS path mapping" admin widget.
//!
//! A [`MappingWidget`] is owned by whoever drives the page (the protocol loop
//! in the binary, or a test) and is handed around by reference. It keeps the
//! selector, the editable rows and the chrome flags the host renders.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::MappingError;
use crate::model::build_type::{BuildType, BuildTypeOption};
use crate::model::row::{MappingElement, MappingRow};
use crate::services::build_types;
use crate::services::fetch::MappingSource;
use crate::services::preview::{self, DuplicateDetection};
use crate::view::debounce::Debouncer;
use crate::view::events::{EventRegistry, HandlerAction, InputEvent, RowId};

pub const DUPLICATE_ERROR_TEXT: &str = "Non-unique path, ignored";
pub const DUPLICATED_BELOW_TITLE: &str = "This path is duplicated below";

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct RowMarkers {
    /// The path repeats an earlier row.
    pub duplicate: bool,
    /// The path is canonical and repeated further down.
    pub duplicated_below: bool,
    pub title: String,
    pub error_visible: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: RowId,
    #[serde(flatten)]
    pub row: MappingRow,
    pub markers: RowMarkers,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct WidgetState {
    pub options: Vec<BuildTypeOption>,
    pub selected_index: usize,
    pub add_mapping_enabled: bool,
    pub update_indicator: bool,
    pub table_visible: bool,
    pub build_type_label: Option<String>,
    pub rows: Vec<RowView>,
    pub results_config: String,
    pub recompute_pending: bool,
}

pub struct MappingWidget {
    options: Vec<BuildTypeOption>,
    selected_index: usize,
    rows: Vec<RowView>,
    next_row_id: RowId,
    registry: EventRegistry,
    debouncer: Debouncer,
    detection: DuplicateDetection,
    table_visible: bool,
    update_indicator: bool,
    build_type_label: Option<String>,
    results_config: String,
}

impl MappingWidget {
    pub fn new(cfg: &AppConfig) -> Self {
        MappingWidget {
            options: vec![BuildTypeOption::placeholder()],
            selected_index: 0,
            rows: Vec::new(),
            next_row_id: 0,
            registry: EventRegistry::new(),
            debouncer: Debouncer::new(cfg.debounce()),
            detection: cfg.duplicate_detection,
            table_visible: false,
            update_indicator: false,
            build_type_label: None,
            results_config: String::new(),
        }
    }

    pub fn fill_build_types(&mut self, build_types: &[BuildType]) {
        self.options = build_types::fill_options(&self.options, build_types);
        self.selected_index = 0;
        debug!(options = self.options.len() - 1, "filled build type selector");
    }

    pub fn select_build_type(&mut self, index: usize) -> Result<(), MappingError> {
        if index >= self.options.len() {
            return Err(MappingError::SelectionOutOfRange {
                index,
                options: self.options.len(),
            });
        }
        self.selected_index = index;
        Ok(())
    }

    pub fn selected_build_type_id(&self) -> Option<&str> {
        build_types::selected_build_type_id(&self.options, self.selected_index)
    }

    /// Fetches the mapping of the selected build type and appends it.
    ///
    /// Fetch failures are logged and otherwise ignored: no rows are added and
    /// the table keeps its visibility. Returns the number of rows added.
    pub fn add_mapping(&mut self, source: &dyn MappingSource) -> Result<usize, MappingError> {
        let build_type_id = self
            .selected_build_type_id()
            .ok_or(MappingError::NoBuildTypeSelected)?
            .to_string();

        self.update_indicator = true;
        let fetched = source.fetch_mappings(&build_type_id);
        self.update_indicator = false;

        self.build_type_label = Some(build_type_id.clone());

        let mappings = match fetched {
            Ok(m) => m,
            Err(e) => {
                warn!(build_type_id = %build_type_id, error = %e, "could not load vcs mapping");
                return Ok(0);
            }
        };

        if mappings.is_empty() {
            info!(build_type_id = %build_type_id, "build type has no vcs mapping");
            return Ok(0);
        }

        self.table_visible = true;
        let added = mappings.len();
        for m in mappings {
            self.push_row(m);
        }
        // Freshly fetched rows stay visible even when there is only one.
        self.refresh(false);

        Ok(added)
    }

    /// Appends a row typed in by hand. No recompute happens until one of the
    /// row's inputs fires an event.
    pub fn add_mapping_row(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        comment: impl Into<String>,
    ) -> RowId {
        self.table_visible = true;
        self.push_row(MappingElement::new(from, to, comment))
    }

    fn push_row(&mut self, element: MappingElement) -> RowId {
        self.next_row_id += 1;
        let id = self.next_row_id;

        self.rows.push(RowView {
            id,
            row: element.into(),
            markers: RowMarkers::default(),
        });

        self.registry
            .subscribe(id, InputEvent::Blur, HandlerAction::RecomputeNow);
        self.registry
            .subscribe(id, InputEvent::KeyPress, HandlerAction::RecomputeDebounced);

        id
    }

    pub fn edit_row(&mut self, id: RowId, from: Option<String>, to: Option<String>) -> Result<(), MappingError> {
        let view = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(MappingError::UnknownRow(id))?;

        if let Some(from) = from {
            view.row.from = from;
        }
        if let Some(to) = to {
            view.row.to = to;
        }
        Ok(())
    }

    /// Runs whatever handler the row registered for `event`.
    /// Events of rows without handlers (removed rows) are ignored.
    pub fn handle_event(&mut self, id: RowId, event: InputEvent, now: Instant) -> Option<HandlerAction> {
        let action = self.registry.action_for(id, event)?;
        match action {
            HandlerAction::RecomputeNow => self.update_preview(),
            HandlerAction::RecomputeDebounced => self.debouncer.schedule(now),
        }
        Some(action)
    }

    /// Runs a debounced recompute once it is due. Returns true if it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.fire_if_due(now) {
            self.update_preview();
            true
        } else {
            false
        }
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn remove_row(&mut self, id: RowId) -> Result<(), MappingError> {
        let pos = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(MappingError::UnknownRow(id))?;

        self.registry.unsubscribe_row(id);
        self.rows.remove(pos);
        self.update_preview();
        Ok(())
    }

    pub fn clear_rows(&mut self) {
        self.registry.clear();
        self.debouncer.cancel();
        self.rows.clear();
        self.update_preview();
    }

    /// Recomputes duplicate markers and the submitted mapping text, hiding
    /// the table when at most one row is left.
    pub fn update_preview(&mut self) {
        self.refresh(true);
    }

    fn refresh(&mut self, apply_hide: bool) {
        let snapshot: Vec<MappingRow> = self.rows.iter().map(|r| r.row.clone()).collect();
        let result = preview::recompute_with(&snapshot, self.detection);
        let canonical = preview::canonical_rows_with_duplicates(&result.updated_rows);

        for (i, (view, updated)) in self
            .rows
            .iter_mut()
            .zip(result.updated_rows)
            .enumerate()
        {
            let duplicated_below = canonical.contains(&i);
            view.markers = RowMarkers {
                duplicate: updated.is_duplicate_of_earlier,
                duplicated_below,
                title: if duplicated_below {
                    DUPLICATED_BELOW_TITLE.to_string()
                } else {
                    String::new()
                },
                error_visible: updated.is_duplicate_of_earlier,
            };
            view.row = updated;
        }

        self.results_config = result.preview;

        if apply_hide && result.hide_table {
            self.table_visible = false;
        }
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn results_config(&self) -> &str {
        &self.results_config
    }

    pub fn table_visible(&self) -> bool {
        self.table_visible
    }

    pub fn detection(&self) -> DuplicateDetection {
        self.detection
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn state(&self) -> WidgetState {
        WidgetState {
            options: self.options.clone(),
            selected_index: self.selected_index,
            add_mapping_enabled: build_types::add_mapping_enabled(self.selected_index),
            update_indicator: self.update_indicator,
            table_visible: self.table_visible,
            build_type_label: self.build_type_label.clone(),
            rows: self.rows.clone(),
            results_config: self.results_config.clone(),
            recompute_pending: self.debouncer.is_pending(),
        }
    }
}
