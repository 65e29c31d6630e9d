//! Encoding of one measurement record as one line of JSON.
//!
//! # Line Format
//!
//! ```json
//! {"input":{"task":{"workload_key":"dense_1024","target":"llvm -mcpu=skylake"},
//!           "state":{"transform_steps":[{"step":"compute_inline","stage_id":1}]}},
//!  "result":{"costs":[0.0012,0.0013],"error_no":0,"all_cost":1.3,"timestamp":1700000000.5}}
//! ```
//!
//! (Shown wrapped; an encoded record never contains a newline.)
//!
//! Optional fields (`target_host`, `hardware_params`, `error_msg`) are omitted
//! when absent. The compute graph and the expanded stage list are never
//! written. Unknown fields are ignored on decode, so a line that does carry
//! `input.state.expanded_stages` still decodes to the minimal form.

use serde::{Deserialize, Serialize};
use tunelog_schema::{MeasureInput, MeasureResult};

#[derive(Serialize)]
struct RecordRef<'a> {
    input: &'a MeasureInput,
    result: &'a MeasureResult,
}

#[derive(Deserialize)]
struct Record {
    input: MeasureInput,
    result: MeasureResult,
}

/// Encodes a record as a single line, without the trailing newline.
pub fn encode_record(input: &MeasureInput, result: &MeasureResult) -> serde_json::Result<String> {
    serde_json::to_string(&RecordRef { input, result })
}

/// Decodes one line produced by [`encode_record`].
///
/// Surrounding whitespace, including the line terminator, is accepted.
pub fn decode_record(line: &[u8]) -> serde_json::Result<(MeasureInput, MeasureResult)> {
    let Record { input, result } = serde_json::from_slice(line)?;
    Ok((input, result))
}
