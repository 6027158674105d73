//! Output configuration and its process-wide default.
//!
//! Every operation that depends on configuration has a variant taking a
//! [`CsonConfig`] explicitly. The global default is only consulted by the
//! convenience entry points: `Display`, [`crate::to_string`] and
//! `Serialize for Value`.

use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::canonical::{Canonicalizer, SortMode};
use crate::text::Formatting;

#[derive(Debug, Clone, Default)]
pub struct CsonConfig {
    pub formatting: Formatting,
    pub canonicalizer: Canonicalizer,
}

impl CsonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    /// Natural ordering on the axes selected by `mode`.
    pub fn with_sort_mode(self, mode: SortMode) -> Self {
        self.with_canonicalizer(Canonicalizer::new(mode))
    }
}

static GLOBAL: OnceLock<RwLock<CsonConfig>> = OnceLock::new();

fn cell() -> &'static RwLock<CsonConfig> {
    GLOBAL.get_or_init(|| RwLock::new(CsonConfig::default()))
}

/// Snapshot of the process-wide default.
pub fn global() -> CsonConfig {
    cell().read().clone()
}

pub fn set_global(config: CsonConfig) {
    *cell().write() = config;
}

pub fn set_global_formatting(formatting: Formatting) {
    cell().write().formatting = formatting;
}

pub fn set_global_canonicalizer(canonicalizer: Canonicalizer) {
    cell().write().canonicalizer = canonicalizer;
}
