mod build;
mod config;
mod headers;
mod locate;

pub use build::BuildInfo;
pub use config::{default_build_bff, Config, DEFAULT_CPP_DIR};
pub use headers::{install_headers, native_files, InstallOutcome};
pub use locate::{FixedSource, ProjectLayout, SourceLocator};
