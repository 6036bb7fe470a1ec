use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, error};

use recur_store::SqliteStore;

use crate::protocol::{
    JsonRpcMessage, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST, PARSE_ERROR,
};
use crate::tools;

const SERVER_NAME: &str = "recur";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

const RECUR_INSTRUCTIONS: &str = "\
Use recur to analyze divide-and-conquer recurrences T(n) = aT(n/b) + n^k with the Master Theorem.\n\
\n\
EVALUATE (recur_evaluate): pass integers a >= 1, b >= 2, k >= 0 to get the case, the \
asymptotic bound and whether the Case 3 regularity condition holds.\n\
\n\
PLOT (recur_plot_data): sampled curves of n^log_b(a), f(n) and T(n) over n in [1, 100].\n\
\n\
CATALOG (recur_list_algorithms, recur_show_algorithm): known algorithms with their recurrences.";

#[derive(Debug, Default, Clone)]
pub struct ServerOptions {
    /// Extra text appended to the server instructions.
    pub instructions: Option<String>,
}

/// Run the MCP server on stdio. Blocks until stdin is closed.
pub fn run_server(store: &SqliteStore, options: &ServerOptions) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    serve(stdin.lock(), &mut stdout, store, options)
}

/// Line-delimited JSON-RPC loop over any reader/writer pair.
pub fn serve<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    store: &SqliteStore,
    options: &ServerOptions,
) -> anyhow::Result<()> {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };

        if let Some(response) = handle_line(&line, store, options) {
            write_response(writer, &response)?;
        }
    }

    Ok(())
}

/// Handle one input line. Notifications and blank lines produce no response.
pub fn handle_line(
    line: &str,
    store: &SqliteStore,
    options: &ServerOptions,
) -> Option<JsonRpcResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let msg: JsonRpcMessage = match serde_json::from_str(line) {
        Ok(m) => m,
        Err(e) => {
            error!("invalid JSON-RPC: {e}");
            return Some(JsonRpcResponse::err(
                Value::Null,
                PARSE_ERROR,
                format!("parse error: {e}"),
            ));
        }
    };

    let method = msg.method.as_deref().unwrap_or("");
    debug!("MCP request: {method}");

    // Notifications have no id, don't respond
    let id = msg.id?;

    if msg.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::err(
            id,
            INVALID_REQUEST,
            format!("unsupported jsonrpc version: {}", msg.jsonrpc),
        ));
    }

    let response = match method {
        "initialize" => handle_initialize(id, options),
        "ping" => JsonRpcResponse::ok(id, json!({})),
        "tools/list" => JsonRpcResponse::ok(id, tools::tool_definitions()),
        "tools/call" => handle_tools_call(id, &msg.params, store),
        other => JsonRpcResponse::method_not_found(id, other),
    };
    Some(response)
}

fn write_response<W: Write>(writer: &mut W, resp: &JsonRpcResponse) -> anyhow::Result<()> {
    let json = serde_json::to_string(resp)?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

fn handle_initialize(id: Value, options: &ServerOptions) -> JsonRpcResponse {
    let instructions = match &options.instructions {
        Some(extra) => format!("{RECUR_INSTRUCTIONS}\n\n{extra}"),
        None => RECUR_INSTRUCTIONS.to_string(),
    };
    JsonRpcResponse::ok(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "instructions": instructions
        }),
    )
}

fn handle_tools_call(id: Value, params: &Option<Value>, store: &SqliteStore) -> JsonRpcResponse {
    let params = match params {
        Some(p) => p,
        None => {
            return JsonRpcResponse::err(id, INVALID_PARAMS, "missing params".into());
        }
    };

    let tool_name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n,
        None => {
            return JsonRpcResponse::err(id, INVALID_PARAMS, "missing tool name".into());
        }
    };

    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    let result = tools::call_tool(store, tool_name, &args);
    JsonRpcResponse::ok(id, serde_json::to_value(result).unwrap_or(json!(null)))
}
