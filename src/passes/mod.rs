mod offload;
mod specialize;
mod weave;

pub use offload::{offload, worker_name, OffloadOutcome};
pub use specialize::{specialize, SpecializeReport, Specializer};
pub use weave::{weave, weave_additive, weave_mode, weave_overwrite, WeaveMode};
