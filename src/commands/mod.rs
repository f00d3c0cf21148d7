// ABOUTME: Command module aggregator for the stackline CLI.
// ABOUTME: Re-exports the plan, deploy and facts command handlers.

mod deploy;
mod facts;
mod plan;

pub use deploy::deploy;
pub use facts::facts;
pub use plan::plan;
