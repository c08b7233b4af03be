//! Reducer cases grouped by message family.
//!
//! - `control.rs` - status, error, config and custom-state cases
//! - `scenario.rs` - Next, SwitchScenario, ResetProperties, PutModel
//! - `sequence.rs` - Sequence folding and Delay suspension
//! - `widget.rs` - widget tree mutation and text reveal
//! - `mixer.rs` - mixer tree mutation

pub(super) mod control;
pub(super) mod widget;

mod mixer;
mod scenario;
mod sequence;
