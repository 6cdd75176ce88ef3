use crate::conventions::Conventions;
use crate::document::{Document, FunctionKind};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

// Names provided by the threading header on the native side.
const ARGS_BUNDLE: &str = "ThreadArgs";
const UNPACK_MACRO: &str = "UNPACK_ARGS";
const RELEASE_MACRO: &str = "FREE_ARGS";
const WORKER_SUFFIX: &str = "_thread";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffloadOutcome {
    NotRequested,
    /// The threading include is already there.
    AlreadyTransformed,
    Offloaded { worker: String },
}

fn bare_return() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\breturn\s*;").expect("return pattern is valid"))
}

pub fn worker_name(function_name: &str) -> String {
    format!("{}{}", function_name, WORKER_SUFFIX)
}

fn worker_signature(worker: &str) -> String {
    format!("DWORD WINAPI {}(LPVOID lpParam)", worker)
}

/// Turn the document's function into a fire-and-forget dispatch to a
/// worker thread running the original body.
pub fn offload(doc: &mut Document, run_async: bool, conv: &Conventions) -> OffloadOutcome {
    if !run_async {
        return OffloadOutcome::NotRequested;
    }
    let include = conv.threading_include();
    if doc.contains(&include) {
        debug!("{} already present, leaving function as is", include);
        return OffloadOutcome::AlreadyTransformed;
    }

    let function = doc.function().clone();
    let worker = worker_name(&function.name);
    let signature = worker_signature(&worker);
    let release = format!("{{ {}(); return 0; }}", RELEASE_MACRO);

    let worker_body = match function.kind {
        FunctionKind::ScriptCall => doc.body().replace(&conv.result_return(), &release),
        FunctionKind::EventHandler => {
            let mut body = bare_return()
                .replace_all(doc.body(), release.as_str())
                .into_owned();
            if !body.ends_with('\n') {
                body.push('\n');
            }
            body.push_str(&release);
            body.push('\n');
            body
        }
    };

    let bundle = match function.kind {
        FunctionKind::ScriptCall => format!("new {}(pSelf, pOther, _count, _args)", ARGS_BUNDLE),
        FunctionKind::EventHandler => format!("new {}(pSelf, pOther)", ARGS_BUNDLE),
    };
    let mut dispatch = format!(
        "\n{bundle_ty}* threadArgs = {bundle};\n\
         HANDLE thread = CreateThread(NULL, 0, {worker}, threadArgs, 0, NULL);\n\
         CloseHandle(thread);\n",
        bundle_ty = ARGS_BUNDLE,
        bundle = bundle,
        worker = worker,
    );
    if function.kind == FunctionKind::ScriptCall {
        dispatch.push_str(&format!(
            "{} = 0;\n{}\n",
            conv.result_var,
            conv.result_return()
        ));
    }

    let worker_fn = format!(
        "\n{}\n{{\n{}(lpParam);\n{}}}\n",
        signature,
        UNPACK_MACRO,
        if worker_body.starts_with('\n') {
            &worker_body[1..]
        } else {
            worker_body.as_str()
        }
    );

    doc.set_body(dispatch);
    doc.push_header(include);
    doc.push_header(format!("{};", signature));
    doc.push_worker(worker_fn);

    debug!("{} now dispatches to {}", function.name, worker);
    OffloadOutcome::Offloaded { worker }
}
