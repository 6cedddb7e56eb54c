//! Depth-first classification of module boundary signals.
//!
//! For every boundary signal of a module this crate decides whether the
//! signal reaches a data sink (an extern-connected output), a selection-class
//! port (mux select, clock, enable, reset, ...), both, or neither. The
//! [`DfsEngine`] answers the question for one module, descending into
//! submodule placeholders ("deep scan") with a shared [`ResultCache`];
//! [`classify_design`] drives the engine over a whole design bottom-up and
//! feeds each completed module's port roles back into the placeholder nodes
//! that instantiate it.

mod dfs;
mod scan;
mod schedule;

pub use dfs::DfsEngine;
pub use scan::{ModuleRoles, ResultCache};
pub use schedule::{ClassifyError, ClassifyOptions, ModuleReport, classify_design};
