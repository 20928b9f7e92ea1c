use crate::config::ViewerSettings;
use crate::data::classify::{ClassifiedColumn, classify};
use crate::data::export::{ExportFormat, export_table};
use crate::data::filter::{
    ActiveFilterSet, FilterSpec, Selection, Selections, apply_filters, build_active_filters,
    build_filter_specs, filtered_indices,
};
use crate::data::loader::SheetLoader;
use crate::data::model::Table;
use crate::data::sample::{SampleOutcome, sample_rows};
use crate::data::stats;
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: ViewerSettings,

    /// URL typed into the side panel.
    pub source_url: String,

    /// Treat the first CSV record as a title row and use the second as header.
    pub skip_first_row: bool,

    loader: SheetLoader,

    /// Loaded table (None until a load succeeds).
    pub table: Option<Table>,

    /// Bucket and descriptor of every column (recomputed each pass).
    pub classified: Vec<ClassifiedColumn>,

    /// Filter controls to render (recomputed each pass).
    pub specs: Vec<FilterSpec>,

    /// Current raw selections of the filter controls.
    selections: Selections,

    /// Predicates derived from `selections` in the last pass.
    pub active: ActiveFilterSet,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Last random selection, cleared whenever the filtered view changes.
    pub sample: Option<SampleOutcome>,

    /// Non-null count per column of the loaded table.
    pub non_null_counts: Vec<(String, usize)>,

    /// Mean of each numeric column of the loaded table.
    pub numeric_means: Vec<(String, f64)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Informational message (e.g. a completed export).
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(loader: SheetLoader) -> Self {
        Self {
            settings: ViewerSettings::default(),
            source_url: String::new(),
            skip_first_row: true,
            loader,
            table: None,
            classified: Vec::new(),
            specs: Vec::new(),
            selections: Selections::default(),
            active: ActiveFilterSet::new(),
            visible_indices: Vec::new(),
            sample: None,
            non_null_counts: Vec::new(),
            numeric_means: Vec::new(),
            status_message: None,
            notice: None,
        }
    }

    /// Load the sheet behind `source_url`, replacing whatever was loaded.
    pub fn load(&mut self) {
        let url = self.source_url.trim().to_string();
        match self.loader.load(&url, self.skip_first_row) {
            Ok(table) => self.set_dataset(table),
            Err(e) => {
                match &e {
                    ViewerError::EmptyResult => log::warn!("{url}: {e}"),
                    _ => log::error!("failed to load {url}: {e}"),
                }
                self.clear_dataset();
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Ingest a newly loaded table and reset every filter.
    pub fn set_dataset(&mut self, table: Table) {
        self.non_null_counts = stats::non_null_counts(&table);
        self.numeric_means = stats::numeric_means(&table);
        self.table = Some(table);
        self.selections = Selections::default();
        self.sample = None;
        self.status_message = None;
        self.notice = None;
        self.recompute();
    }

    fn clear_dataset(&mut self) {
        self.table = None;
        self.non_null_counts.clear();
        self.numeric_means.clear();
        self.notice = None;
        self.selections = Selections::default();
        self.sample = None;
        self.recompute();
    }

    /// One synchronous pass: classify, build filters, combine.
    pub fn recompute(&mut self) {
        let Some(table) = &self.table else {
            self.classified.clear();
            self.specs.clear();
            self.active.clear();
            self.visible_indices.clear();
            return;
        };
        let s = &self.settings;
        self.classified = classify(table, s.max_unique, s.numeric_ranges);
        self.specs = build_filter_specs(&self.classified, s.max_unique, s.filter_all_columns);
        let active = build_active_filters(&self.specs, &self.selections);
        if active != self.active {
            self.sample = None;
        }
        self.visible_indices = filtered_indices(table, &active);
        self.active = active;
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn set_selection(&mut self, column: &str, selection: Selection) {
        self.selections = self.selections.with(column, selection);
        self.recompute();
    }

    pub fn clear_selection(&mut self, column: &str) {
        self.selections = self.selections.without(column);
        self.recompute();
    }

    pub fn clear_all_filters(&mut self) {
        if self.selections.is_empty() {
            return;
        }
        self.selections = Selections::default();
        self.recompute();
    }

    /// Apply edited settings (clamped to their ranges) and recompute.
    pub fn update_settings(&mut self, settings: ViewerSettings) {
        let settings = settings.clamped();
        if settings != self.settings {
            self.settings = settings;
            self.recompute();
        }
    }

    /// The filtered view as its own table.
    pub fn filtered_table(&self) -> Option<Table> {
        self.table.as_ref().map(|t| apply_filters(t, &self.active))
    }

    /// Draw `random_count` rows from the filtered view.
    pub fn sample(&mut self) {
        let Some(filtered) = self.filtered_table() else {
            return;
        };
        let outcome = sample_rows(&filtered, self.settings.random_count);
        if outcome == SampleOutcome::Empty {
            log::info!("no rows to sample after filtering");
        }
        self.sample = Some(outcome);
    }

    /// Serialise the filtered view. Failures are reported in the status area.
    pub fn export(&mut self, format: ExportFormat) -> Option<Vec<u8>> {
        let filtered = self.filtered_table()?;
        match export_table(&filtered, format) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                self.status_message = Some(e.to_string());
                None
            }
        }
    }

    /// `(column, description)` for each active filter, e.g. `("Score", "50 to 90")`.
    pub fn active_filter_labels(&self) -> Vec<(String, String)> {
        self.active
            .iter()
            .map(|(col, p)| (col.clone(), p.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::data::loader::CsvFetcher;
    use crate::data::model::CellValue;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://docs.google.com/spreadsheets/d/doc1/edit";

    /// Serves whatever body the test put in the shared cell.
    struct SharedBody(Rc<RefCell<String>>);

    impl CsvFetcher for SharedBody {
        fn fetch(&self, _url: &str) -> anyhow::Result<String> {
            let body = self.0.borrow().clone();
            if body == "offline" {
                anyhow::bail!("network unreachable");
            }
            Ok(body)
        }
    }

    fn state_with(body: &str) -> (AppState, Rc<RefCell<String>>) {
        let shared = Rc::new(RefCell::new(body.to_string()));
        let loader = SheetLoader::new(Box::new(SharedBody(Rc::clone(&shared))));
        let mut state = AppState::new(loader);
        state.source_url = URL.to_string();
        state.skip_first_row = false;
        (state, shared)
    }

    const REGIONS: &str = "Region,Score\nA,10\nB,50\nA,50\nC,90\nA,90\nA,\n";

    #[test]
    fn load_then_filter() {
        let (mut state, _) = state_with(REGIONS);
        state.load();
        assert_eq!(state.status_message, None);
        assert_eq!(state.visible_indices.len(), 6);

        state.set_selection("Region", Selection::Values(vec![CellValue::Text("A".into())]));
        state.set_selection("Score", Selection::Range(50.0, 90.0));
        assert_eq!(state.visible_indices, vec![2, 4]);
        assert_eq!(
            state.active_filter_labels(),
            vec![
                ("Region".to_string(), "A".to_string()),
                ("Score".to_string(), "50 to 90".to_string()),
            ]
        );

        state.clear_selection("Score");
        assert_eq!(state.visible_indices, vec![0, 2, 4, 5]);

        state.clear_all_filters();
        assert!(state.active.is_empty());
        assert_eq!(state.visible_indices.len(), 6);
    }

    #[test]
    fn invalid_url_reported_and_interactive() {
        let (mut state, _) = state_with(REGIONS);
        state.source_url = "https://example.com/not-a-sheet".into();
        state.load();
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Invalid Google Sheet URL")));
        assert!(state.table.is_none());

        state.source_url = URL.into();
        state.load();
        assert!(state.table.is_some());
    }

    #[test]
    fn network_failure_reported() {
        let (mut state, _) = state_with("offline");
        state.load();
        assert_eq!(
            state.status_message.as_deref(),
            Some("Error loading data: network unreachable")
        );
    }

    #[test]
    fn empty_sheet_reported() {
        let (mut state, _) = state_with("Region,Score\n");
        state.load();
        assert_eq!(
            state.status_message.as_deref(),
            Some("No data found in the sheet")
        );
    }

    #[test]
    fn new_load_replaces_table_and_selections() {
        let (mut state, body) = state_with(REGIONS);
        state.load();
        state.set_selection("Region", Selection::Values(vec![CellValue::Text("B".into())]));
        assert_eq!(state.visible_indices, vec![1]);

        *body.borrow_mut() = "Name\nx\ny\n".to_string();
        state.skip_first_row = true;
        state.load();
        let table = state.table.as_ref().unwrap();
        assert_eq!(table.columns(), &["x"]);
        assert!(state.selections().is_empty());
        assert_eq!(state.visible_indices, vec![0]);
    }

    #[test]
    fn sample_respects_filters() {
        let (mut state, _) = state_with(REGIONS);
        state.load();
        state.set_selection("Region", Selection::Values(vec![CellValue::Text("C".into())]));
        state.sample();
        let Some(SampleOutcome::Full(t)) = &state.sample else {
            panic!("expected the full filtered set");
        };
        assert_eq!(t.len(), 1);

        state.set_selection("Region", Selection::Values(vec![CellValue::Text("A".into())]));
        assert_eq!(state.sample, None);
        state.set_selection("Score", Selection::Range(11.0, 12.0));
        state.sample();
        assert_eq!(state.sample, Some(SampleOutcome::Empty));
    }

    #[test]
    fn export_uses_filtered_rows() {
        let (mut state, _) = state_with(REGIONS);
        state.load();
        state.set_selection("Score", Selection::Range(90.0, 90.0));
        let bytes = state.export(ExportFormat::Csv).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Region,Score\nC,90\nA,90\n"
        );
    }

    #[test]
    fn settings_are_clamped_and_reclassify() {
        let (mut state, _) = state_with(REGIONS);
        state.load();
        state.update_settings(ViewerSettings {
            max_unique: 1,
            filter_all_columns: false,
            ..state.settings.clone()
        });
        assert_eq!(state.settings.max_unique, 20);
        let columns: Vec<&str> = state.specs.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(columns, vec!["Region"]);
    }
}
