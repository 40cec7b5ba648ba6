//! Static wire transcripts and tables used across harnesses.

use vizstream_core::encode::{encode_done, encode_event, encode_fragmented};

/// The plan from the wire-format reference: total sales per region.
pub const SALES_PLAN: &str = r#"{"type":"bar","x":{"column":"region","label":"Region"},"y":{"column":"sales","aggregation":"sum","label":"Total Sales"},"top_k":10}"#;

/// Three rows, two regions. Sales are strings in the record form so the
/// aggregation path has to coerce them.
pub const SALES_CSV: &str = "region,sales\nN,10\nN,20\nS,5\n";

/// A wider table with a non-numeric cell and an empty cell.
pub const ORDERS_CSV: &str = "\
order_id,region,product,sales,units,priority
1,North,Widget,120.5,3,high
2,South,Widget,80,2,low
3,North,Gadget,200,5,high
4,East,Gizmo,N/A,1,low
5,South,Gadget,150,4,
6,West,Widget,95.25,2,high
7,North,Gizmo,60,1,low
8,East,Widget,40,1,high
";

/// Records as the backend's `GET /csv/{id}` returns them.
pub fn sales_records() -> serde_json::Value {
    serde_json::json!([
        {"region": "N", "sales": "10"},
        {"region": "N", "sales": "20"},
        {"region": "S", "sales": "5"},
    ])
}

/// A hand-written stream exercising everything the decoder must tolerate:
/// interleaved reasoning events, prose around the JSON, a comment line, blank
/// separators, a CRLF line, the sentinel, and output after the sentinel.
pub const REFERENCE_STREAM: &str = "\
event: reasoning\n\
data: Looking at the columns…\n\
\n\
event: content\n\
data: Here is the plan: {\"type\":\"bar\",\n\
data: \"x\":{\"column\":\"region\",\"label\":\"Region\"},\n\
event: reasoning\n\
data: sales looks numeric\n\
: keep-alive\n\
event: content\r\n\
data: \"y\":{\"column\":\"sales\",\"aggregation\":\"sum\",\"label\":\"Total Sales\"},\n\
data: \"top_k\":10} Hope this helps!\n\
event: content\n\
data: [DONE]\n\
data: {\"late\":true}\n\
event: reasoning\n\
data: done thinking";

/// Encode `payload` as a plan stream the way the backend sends it: a few
/// characters per content record, interleaved reasoning, then the sentinel.
pub fn plan_stream(payload: &str, fragment_chars: usize) -> String {
    let mut wire = encode_event("reasoning", "Choosing a chart");
    wire.push_str(&encode_fragmented("content", payload, fragment_chars));
    wire.push_str(&encode_done("content"));
    wire
}

/// Suggestion stream carrying `{"chart_types": [...]}`.
pub fn suggestion_stream(chart_types: &[&str]) -> String {
    let body = serde_json::json!({ "chart_types": chart_types }).to_string();
    plan_stream(&body, 6)
}
