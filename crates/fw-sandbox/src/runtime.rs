//! Isolate runner
//!
//! Every call gets a brand new V8 isolate on a dedicated thread: no state
//! survives between evaluations or renders. The isolate has no filesystem,
//! network, storage or DOM; the only bridge back to Rust is the
//! `op_fw_set_result` op that carries the JSON result envelope.

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use deno_core::{op2, JsRuntime, OpState, RuntimeOptions};
use fw_registry::PropsData;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

const BOOTSTRAP: &str = include_str!("js/widget_runtime.js");

/// Result envelope written by the bootstrap script
#[derive(Debug, Default)]
struct ScriptOutput(String);

#[op2(fast)]
fn op_fw_set_result(state: &mut OpState, #[string] payload: &str) {
    state.put(ScriptOutput(payload.to_string()));
}

deno_core::extension!(fw_widget_ext, ops = [op_fw_set_result]);

/// What the widget module is loaded for
#[derive(Debug, Clone)]
pub(crate) enum Invocation {
    /// Load the module and report the type of its export
    Check,
    /// Load the module and call its export with props
    Render(PropsData),
}

#[derive(Serialize)]
struct Request<'a> {
    mode: &'static str,
    allowed: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    props: Option<&'a PropsData>,
}

/// Run `source` in a fresh isolate on its own thread and return the `ok`
/// payload of the result envelope.
///
/// `source` must already have passed validation.
pub(crate) fn run_isolated(
    source: &str,
    invocation: Invocation,
    config: &SandboxConfig,
) -> Result<Value, SandboxError> {
    let script = invocation_script(source, &invocation, config)?;
    let config = config.clone();

    let handle = std::thread::Builder::new()
        .name("fw-sandbox".to_string())
        .spawn(move || run_in_isolate(script, &config))
        .map_err(|e| SandboxError::Isolate(format!("failed to spawn sandbox thread: {e}")))?;

    handle
        .join()
        .map_err(|_| SandboxError::Isolate("sandbox thread panicked".to_string()))?
}

fn invocation_script(
    source: &str,
    invocation: &Invocation,
    config: &SandboxConfig,
) -> Result<String, SandboxError> {
    let request = match invocation {
        Invocation::Check => Request {
            mode: "check",
            allowed: &config.allowed_modules,
            props: None,
        },
        Invocation::Render(props) => Request {
            mode: "render",
            allowed: &config.allowed_modules,
            props: Some(props),
        },
    };
    let request = serde_json::to_string(&request)?;

    Ok(format!(
        "__fw_run(function (module, exports, require) {{\n{source}\n}}, {request});\n"
    ))
}

fn run_in_isolate(script: String, config: &SandboxConfig) -> Result<Value, SandboxError> {
    let mut runtime = JsRuntime::new(RuntimeOptions {
        extensions: vec![fw_widget_ext::init()],
        ..Default::default()
    });

    runtime
        .execute_script("[fw:bootstrap]", BOOTSTRAP)
        .map_err(|e| SandboxError::Isolate(format!("bootstrap failed: {e}")))?;

    // CPU watchdog: terminate the isolate if the widget runs past the deadline
    let isolate_handle = runtime.v8_isolate().thread_safe_handle();
    let timed_out = Arc::new(AtomicBool::new(false));
    let watchdog_timed_out = Arc::clone(&timed_out);
    let timeout = config.timeout();
    let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

    let watchdog = std::thread::spawn(move || {
        if let Err(mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(timeout) {
            watchdog_timed_out.store(true, Ordering::SeqCst);
            isolate_handle.terminate_execution();
        }
    });

    let exec = runtime.execute_script("[fw:widget]", script);

    // The watchdog must be gone before the isolate is dropped
    let _ = cancel_tx.send(());
    let _ = watchdog.join();

    settle(
        exec.map(drop).map_err(|e| e.to_string()),
        timed_out.load(Ordering::SeqCst),
        config.timeout_ms,
    )?;

    let payload = {
        let state = runtime.op_state();
        let state = state.borrow();
        state
            .try_borrow::<ScriptOutput>()
            .map(|out| out.0.clone())
            .ok_or_else(|| SandboxError::Protocol("widget module produced no result".into()))?
    };

    let envelope: Value = serde_json::from_str(&payload)?;
    if let Some(error) = envelope.get("error") {
        return Err(SandboxError::Evaluation(
            error.as_str().unwrap_or("unknown error").to_string(),
        ));
    }
    envelope
        .get("ok")
        .cloned()
        .ok_or_else(|| SandboxError::Protocol("result envelope has no payload".into()))
}

/// Map the script outcome to an error
///
/// A watchdog that fired after the script had already returned does not turn
/// a finished run into a timeout.
fn settle(exec: Result<(), String>, timed_out: bool, timeout_ms: u64) -> Result<(), SandboxError> {
    match exec {
        Ok(()) => Ok(()),
        Err(_) if timed_out => Err(SandboxError::Timeout { timeout_ms }),
        Err(message) => Err(SandboxError::Evaluation(message)),
    }
}
