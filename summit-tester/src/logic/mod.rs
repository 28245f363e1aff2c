pub mod harness;
pub mod invariants;
pub mod journey;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use harness::TesterLoader;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
