//! Browser host for the compile bridge.
//!
//! The page loads the wasm module and calls `register()` once. After that
//! the bridge is reachable as `globalThis.playground.compile(...)`:
//!
//! ```js
//! import init, { register } from "playground-web";
//!
//! await init();
//! register();
//!
//! const { errors, output } = playground.compile({ source, lang: "ts", disableTypes: true });
//! playground.compile("a", "b"); // "Invalid no of arguments passed"
//! ```

use std::cell::Cell;

use js_sys::{Array, Function, JSON, Object, Reflect};
use playground_core::{Bridge, ENTRY_POINT, GLOBAL_NAME, HostResponse};
use playground_frontend::PlaygroundCompiler;
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

thread_local! {
    static REGISTERED: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, Error)]
enum MarshalError {
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("host could not decode the encoded response")]
    Decode,
}

/// Install `compile` on the global `playground` object.
///
/// Calling it again is a no-op. The entry point closure is leaked so it
/// stays callable for the lifetime of the page.
#[wasm_bindgen]
pub fn register() -> Result<(), JsValue> {
    if REGISTERED.with(Cell::get) {
        return Ok(());
    }

    let bridge = Bridge::new(PlaygroundCompiler::new());
    let inner = Closure::<dyn Fn(Array) -> JsValue>::new(move |args: Array| {
        compile_entry(&bridge, &args)
    });

    // Collect however many arguments the host passes so the bridge can
    // check the arity itself.
    let variadic = Function::new_with_args("inner", "return function (...args) { return inner(args); };");
    let entry: Function = variadic.call1(&JsValue::NULL, inner.as_ref())?.dyn_into()?;
    inner.forget();

    let namespace = Object::new();
    Reflect::set(&namespace, &JsValue::from_str(ENTRY_POINT), &entry)?;
    Reflect::set(&js_sys::global(), &JsValue::from_str(GLOBAL_NAME), &namespace)?;

    REGISTERED.with(|flag| flag.set(true));
    tracing::debug!(global = GLOBAL_NAME, entry = ENTRY_POINT, "registered compile bridge");
    Ok(())
}

/// Version of the bridge package.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn compile_entry(bridge: &Bridge<PlaygroundCompiler>, args: &Array) -> JsValue {
    let values: Vec<Value> = args.iter().map(|arg| to_host_value(&arg)).collect();
    let response = bridge.call(&values);
    to_js(&response).unwrap_or_else(|err| {
        tracing::error!(%err, "could not hand the response back to the host");
        JsValue::from_str(&err.to_string())
    })
}

/// Strings pass through as-is; everything else goes through JSON.
/// Values JSON cannot represent become `null`, which the bridge rejects
/// as an invalid argument.
fn to_host_value(value: &JsValue) -> Value {
    if let Some(text) = value.as_string() {
        return Value::String(text);
    }
    if value.is_undefined() {
        return Value::Null;
    }
    JSON::stringify(value)
        .ok()
        .and_then(|json| json.as_string())
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or(Value::Null)
}

fn to_js(response: &HostResponse) -> Result<JsValue, MarshalError> {
    match response {
        HostResponse::Usage(message) => Ok(JsValue::from_str(message)),
        HostResponse::Result(_) => {
            let json = serde_json::to_string(response)?;
            JSON::parse(&json).map_err(|_| MarshalError::Decode)
        }
    }
}
