mod declarations;
mod fragments;
mod types;

pub use declarations::scan_declarations;
pub use fragments::scan_fragments;
pub use types::{AnnotatedFragment, Annotations, NativeDeclarationRequest, PrimitiveType};

use crate::conventions::Conventions;
use crate::error::WeaveError;

/// True when some line of the source starts with the async directive.
pub fn has_async_directive(source: &str, conv: &Conventions) -> bool {
    let token = conv.async_directive.as_str();
    !token.is_empty()
        && source
            .lines()
            .any(|line| line.trim_start().starts_with(token))
}

/// Read-only pass over one script source.
pub fn scan(source: &str, conv: &Conventions) -> Result<Annotations, WeaveError> {
    let (fragments, dropped_fragments) = scan_fragments(source, conv)?;
    Ok(Annotations {
        fragments,
        declarations: scan_declarations(source),
        run_async: has_async_directive(source, conv),
        dropped_fragments,
    })
}
