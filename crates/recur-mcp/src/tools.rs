use serde_json::{json, Value};

use recur_core::{
    to_plain_text, Algorithm, AlgorithmCatalog, Case, Classification, RecurrenceParams,
};
use recur_store::SqliteStore;

use crate::protocol::ToolResult;

// ---------------------------------------------------------------------------
// Tool schemas for tools/list
// ---------------------------------------------------------------------------

fn recurrence_schema(extra: Value) -> Value {
    let mut properties = json!({
        "a": {
            "type": "integer",
            "minimum": 1,
            "description": "Number of subproblems"
        },
        "b": {
            "type": "integer",
            "minimum": 2,
            "description": "Factor by which the problem size shrinks"
        },
        "k": {
            "type": "integer",
            "minimum": 0,
            "description": "Exponent of the non-recursive work f(n) = n^k"
        }
    });
    if let (Some(props), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
        for (key, schema) in extra {
            props.insert(key.clone(), schema.clone());
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": ["a", "b", "k"]
    })
}

pub fn tool_definitions() -> Value {
    let tools = vec![
        json!({
            "name": "recur_evaluate",
            "description": "Classify T(n) = aT(n/b) + n^k with the Master Theorem. Returns the case, the asymptotic bound and the Case 3 regularity check.",
            "inputSchema": recurrence_schema(json!({
                "format": {
                    "type": "string",
                    "enum": ["text", "json"],
                    "default": "text",
                    "description": "text = plain notation, json = raw fields with <sup>/<sub> markup"
                }
            }))
        }),
        json!({
            "name": "recur_plot_data",
            "description": "Sample n^log_b(a), f(n) and T(n) at 400 points over n in [1, 100].",
            "inputSchema": recurrence_schema(json!({
                "every": {
                    "type": "integer",
                    "default": 1,
                    "minimum": 1,
                    "description": "Keep every n-th sample point (the last point is always kept)"
                }
            }))
        }),
        json!({
            "name": "recur_list_algorithms",
            "description": "List the algorithms in the catalog with their recurrences.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "case": {
                        "type": "integer",
                        "enum": [1, 2, 3],
                        "description": "Only list algorithms that fall under this Master Theorem case"
                    }
                }
            }
        }),
        json!({
            "name": "recur_show_algorithm",
            "description": "Show one catalog algorithm by name or id, including its code snippet.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Algorithm name (case-insensitive) or id"
                    }
                },
                "required": ["name"]
            }
        }),
    ];

    json!({ "tools": tools })
}

// ---------------------------------------------------------------------------
// Tool dispatch
// ---------------------------------------------------------------------------

pub fn call_tool(store: &SqliteStore, name: &str, args: &Value) -> ToolResult {
    match name {
        "recur_evaluate" => tool_evaluate(args),
        "recur_plot_data" => tool_plot_data(args),
        "recur_list_algorithms" => tool_list_algorithms(store, args),
        "recur_show_algorithm" => tool_show_algorithm(store, args),
        _ => ToolResult::error(format!("unknown tool: {name}")),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn get_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

fn get_i64(args: &Value, key: &str, default: i64) -> i64 {
    args.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
}

fn require_i64(args: &Value, key: &str) -> Result<i64, ToolResult> {
    match args.get(key) {
        None => Err(ToolResult::error(format!("missing required field: {key}"))),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| ToolResult::error(format!("{key} must be an integer"))),
    }
}

fn parse_params(args: &Value) -> Result<RecurrenceParams, ToolResult> {
    let a = require_i64(args, "a")?;
    let b = require_i64(args, "b")?;
    let k = require_i64(args, "k")?;
    RecurrenceParams::new(a, b, k).map_err(|e| ToolResult::error(e.to_string()))
}

pub fn format_classification(c: &Classification) -> String {
    let mut output = format!(
        "Recurrence: {}\nComplexity: {}\nCase:       {}\n",
        to_plain_text(&c.recurrence_relation),
        to_plain_text(&c.complexity),
        to_plain_text(&c.case_label),
    );
    if c.case == Case::Three {
        output.push_str(&format!(
            "Regularity: {}\n",
            if c.regularity_condition_met {
                "met"
            } else {
                "not met"
            }
        ));
    }
    output
}

fn format_algorithm_line(algo: &Algorithm) -> String {
    let p = &algo.params;
    let bound = algo
        .time_complexity
        .as_deref()
        .map(to_plain_text)
        .unwrap_or_else(|| "unclassified".into());
    format!(
        "  {} [a={}, b={}, k={}] {} (case {})\n",
        algo.name,
        p.a(),
        p.b(),
        p.k(),
        bound,
        algo.master_case().number()
    )
}

// ---------------------------------------------------------------------------
// Tool handlers
// ---------------------------------------------------------------------------

fn tool_evaluate(args: &Value) -> ToolResult {
    let params = match parse_params(args) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let classification = params.classify();

    match get_str(args, "format").unwrap_or("text") {
        "json" => match serde_json::to_string_pretty(&classification) {
            Ok(s) => ToolResult::text(s),
            Err(e) => ToolResult::error(format!("serialization error: {e}")),
        },
        _ => ToolResult::text(format_classification(&classification)),
    }
}

fn tool_plot_data(args: &Value) -> ToolResult {
    let params = match parse_params(args) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let every = get_i64(args, "every", 1).max(1) as usize;
    let series = params.sample().every_nth(every);

    match serde_json::to_string(&series) {
        Ok(s) => ToolResult::text(s),
        Err(e) => ToolResult::error(format!("serialization error: {e}")),
    }
}

fn tool_list_algorithms(store: &SqliteStore, args: &Value) -> ToolResult {
    let listed = match args.get("case") {
        Some(v) => {
            let case = match v
                .as_i64()
                .map(|n| n.to_string())
                .or_else(|| v.as_str().map(String::from))
                .and_then(|s| s.parse::<Case>().ok())
            {
                Some(c) => c,
                None => return ToolResult::error(format!("invalid case: {v}")),
            };
            store.list_by_case(case)
        }
        None => store.list(),
    };

    match listed {
        Ok(algos) => {
            if algos.is_empty() {
                return ToolResult::text("No algorithms found.".into());
            }
            let mut output = String::from("Algorithms:\n");
            for algo in &algos {
                output.push_str(&format_algorithm_line(algo));
            }
            ToolResult::text(output)
        }
        Err(e) => ToolResult::error(format!("failed to list algorithms: {e}")),
    }
}

fn tool_show_algorithm(store: &SqliteStore, args: &Value) -> ToolResult {
    let name = match get_str(args, "name") {
        Some(n) => n,
        None => return ToolResult::error("missing required field: name".into()),
    };

    let algo = match store.resolve(name) {
        Ok(Some(a)) => a,
        Ok(None) => return ToolResult::error(format!("algorithm not found: {name}")),
        Err(e) => return ToolResult::error(format!("db error: {e}")),
    };

    let mut output = format!("{} ({})\n{}\n\n", algo.name, algo.id, algo.description);
    output.push_str(&format_classification(&algo.params.classify()));
    if let Some(ref analysis) = algo.complexity_analysis {
        output.push_str(&format!("Analysis:   {analysis}\n"));
    }
    if !algo.code.is_empty() {
        output.push_str(&format!("\n{}\n", algo.code));
    }
    ToolResult::text(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        recur_store::seed_builtin(&store).unwrap();
        store
    }

    #[test]
    fn test_definitions_list_every_dispatched_tool() {
        let defs = tool_definitions();
        let names: Vec<&str> = defs["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        let store = store();
        for name in &names {
            let result = call_tool(&store, name, &json!({}));
            assert!(!result.first_text().starts_with("unknown tool"), "{name}");
        }
    }

    #[test]
    fn test_evaluate_text() {
        let r = call_tool(&store(), "recur_evaluate", &json!({"a": 3, "b": 2, "k": 1}));
        assert!(!r.is_error);
        assert!(r.first_text().contains("Θ(n^(log_2(3)))"));
        assert!(r.first_text().contains("Case 1"));
    }

    #[test]
    fn test_evaluate_json_keeps_markup() {
        let r = call_tool(
            &store(),
            "recur_evaluate",
            &json!({"a": 4, "b": 2, "k": 3, "format": "json"}),
        );
        let v: Value = serde_json::from_str(r.first_text()).unwrap();
        assert_eq!(v["complexity"], "Θ(n<sup>3</sup>)");
        assert_eq!(v["regularity_condition_met"], true);
    }

    #[test]
    fn test_evaluate_reports_regularity_for_case_three() {
        let r = call_tool(&store(), "recur_evaluate", &json!({"a": 4, "b": 2, "k": 3}));
        assert!(r.first_text().contains("Regularity: met"));
    }

    #[test]
    fn test_evaluate_invalid_params() {
        let r = call_tool(&store(), "recur_evaluate", &json!({"a": 0, "b": 2, "k": 1}));
        assert!(r.is_error);
        assert!(r.first_text().contains("a must be greater than 0"));

        let r = call_tool(&store(), "recur_evaluate", &json!({"a": 2, "b": 2}));
        assert!(r.is_error);
        assert!(r.first_text().contains("missing required field: k"));

        let r = call_tool(&store(), "recur_evaluate", &json!({"a": 2.5, "b": 2, "k": 1}));
        assert!(r.first_text().contains("a must be an integer"));
    }

    #[test]
    fn test_plot_data_thinned() {
        let r = call_tool(
            &store(),
            "recur_plot_data",
            &json!({"a": 2, "b": 2, "k": 1, "every": 100}),
        );
        let v: Value = serde_json::from_str(r.first_text()).unwrap();
        let n = v["n"].as_array().unwrap();
        assert_eq!(n.len(), 5);
        assert_eq!(n[0].as_f64().unwrap(), 1.0);
        assert_eq!(n[4].as_f64().unwrap(), 100.0);
    }

    #[test]
    fn test_list_and_filter() {
        let store = store();
        let all = call_tool(&store, "recur_list_algorithms", &json!({}));
        assert!(all.first_text().contains("Merge Sort"));
        assert!(all.first_text().contains("Strassen"));

        let case_one = call_tool(&store, "recur_list_algorithms", &json!({"case": 1}));
        assert!(case_one.first_text().contains("Karatsuba"));
        assert!(!case_one.first_text().contains("Merge Sort"));

        let bad = call_tool(&store, "recur_list_algorithms", &json!({"case": 9}));
        assert!(bad.is_error);
    }

    #[test]
    fn test_show_algorithm() {
        let store = store();
        let r = call_tool(&store, "recur_show_algorithm", &json!({"name": "merge sort"}));
        assert!(!r.is_error);
        assert!(r.first_text().contains("fn merge_sort"));
        assert!(r.first_text().contains("Θ(n log n)"));

        let missing = call_tool(&store, "recur_show_algorithm", &json!({"name": "bogosort"}));
        assert!(missing.is_error);
    }

    #[test]
    fn test_unknown_tool() {
        let r = call_tool(&store(), "recur_nope", &json!({}));
        assert!(r.is_error);
    }
}
