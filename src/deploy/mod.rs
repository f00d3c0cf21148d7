// ABOUTME: Unit lifecycle orchestration using the type state pattern.
// ABOUTME: Exports the unit trait, state markers, UnitRun and the sequential driver.

mod context;
mod driver;
mod error;
mod run;
mod state;
mod transitions;
mod unit;

pub use context::{ProvisionContext, ResolvedInput};
pub use driver::{Driver, RunReport, UnitReport};
pub use error::{RunError, RunErrorKind, UnitError, UnitStep};
pub use run::UnitRun;
pub use state::{Declared, InputsResolved, OutputsPublished, Provisioned};
pub use unit::{FactRead, Outputs, ProvisioningUnit, ReadMode};
