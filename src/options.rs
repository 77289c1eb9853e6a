//! Configuration for applying a report to a run.

use std::fmt;
use std::sync::Arc;

use crate::mapper::{FileUriMapper, IdentityMapper, LocationMapper};
use crate::model::CountMode;

/// Effective options. `Options::default()` holds the defaults; per-call
/// changes are layered on with `merge`.
#[derive(Clone)]
pub struct Options {
    /// Delete the report directory once the run is disposed.
    pub remove_data_at_end_of_run: bool,
    pub count_mode: CountMode,
    pub map_file_uri: Arc<dyn FileUriMapper>,
    pub map_location: Arc<dyn LocationMapper>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            remove_data_at_end_of_run: true,
            count_mode: CountMode::Raw,
            map_file_uri: Arc::new(IdentityMapper),
            map_location: Arc::new(IdentityMapper),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("remove_data_at_end_of_run", &self.remove_data_at_end_of_run)
            .field("count_mode", &self.count_mode)
            .finish_non_exhaustive()
    }
}

impl Options {
    pub fn boolean_counts(&self) -> bool {
        self.count_mode == CountMode::Boolean
    }

    /// Layer `overrides` on top of these options.
    #[must_use]
    pub fn merge(&self, overrides: &OptionsOverride) -> Options {
        Options {
            remove_data_at_end_of_run: overrides
                .remove_data_at_end_of_run
                .unwrap_or(self.remove_data_at_end_of_run),
            count_mode: overrides
                .boolean_counts
                .map(CountMode::from_boolean_counts)
                .unwrap_or(self.count_mode),
            map_file_uri: overrides
                .map_file_uri
                .clone()
                .unwrap_or_else(|| self.map_file_uri.clone()),
            map_location: overrides
                .map_location
                .clone()
                .unwrap_or_else(|| self.map_location.clone()),
        }
    }
}

/// Per-call overrides; `None` keeps the base value.
#[derive(Clone, Default)]
pub struct OptionsOverride {
    pub remove_data_at_end_of_run: Option<bool>,
    pub boolean_counts: Option<bool>,
    pub map_file_uri: Option<Arc<dyn FileUriMapper>>,
    pub map_location: Option<Arc<dyn LocationMapper>>,
}

impl OptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_data_at_end_of_run(mut self, remove: bool) -> Self {
        self.remove_data_at_end_of_run = Some(remove);
        self
    }

    pub fn boolean_counts(mut self, boolean_counts: bool) -> Self {
        self.boolean_counts = Some(boolean_counts);
        self
    }

    pub fn map_file_uri(mut self, mapper: Arc<dyn FileUriMapper>) -> Self {
        self.map_file_uri = Some(mapper);
        self
    }

    pub fn map_location(mut self, mapper: Arc<dyn LocationMapper>) -> Self {
        self.map_location = Some(mapper);
        self
    }
}
