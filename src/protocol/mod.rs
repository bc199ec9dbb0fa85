//! JSON-lines protocol spoken with the host page.
//!
//! Request: `{"id": 1, "cmd": "row.add", "payload": {...}}`
//! Response: `{"id": 1, "status": "ok", "payload": {...}}` or
//! `{"id": 1, "status": "error", "message": "..."}`.

use std::time::Instant;

use serde_json::{json, Value};
use tracing::debug;

use crate::config::AppConfig;
use crate::model::build_type::BuildType;
use crate::model::row::MappingRow;
use crate::services::fetch::MappingSource;
use crate::services::preview::{self, DuplicateDetection};
use crate::view::events::{InputEvent, RowId};
use crate::view::widget::MappingWidget;

mod command;
pub use command::Command;

/// One widget plus the collaborator it fetches mappings from.
pub struct Session {
    widget: MappingWidget,
    source: Box<dyn MappingSource>,
}

impl Session {
    pub fn new(cfg: &AppConfig, source: Box<dyn MappingSource>) -> Self {
        Session {
            widget: MappingWidget::new(cfg),
            source,
        }
    }

    pub fn widget(&self) -> &MappingWidget {
        &self.widget
    }

    /// Runs a due debounced recompute and returns the notification to send
    /// to the host, if any.
    pub fn tick(&mut self, now: Instant) -> Option<String> {
        if self.widget.tick(now) {
            Some(
                json!({
                    "event": "widget.updated",
                    "payload": self.widget.state()
                })
                .to_string(),
            )
        } else {
            None
        }
    }
}

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn str_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn row_id(payload: &Value) -> Result<RowId, String> {
    payload
        .get("row_id")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| "payload.row_id must be a number".to_string())
}

fn parse_array<T: serde::de::DeserializeOwned>(payload: &Value, key: &str) -> Result<Vec<T>, String> {
    let arr = payload
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| format!("payload.{key} must be an array"))?;

    let mut out: Vec<T> = Vec::with_capacity(arr.len());
    for (i, v) in arr.iter().cloned().enumerate() {
        match serde_json::from_value::<T>(v) {
            Ok(item) => out.push(item),
            Err(e) => return Err(format!("invalid {key} entry at index {i}: {e}")),
        }
    }
    Ok(out)
}

fn state(session: &Session) -> Value {
    serde_json::to_value(session.widget.state()).unwrap_or(Value::Null)
}

pub fn handle(session: &mut Session, input: &str, now: Instant) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);
    let cmd = Command::from(cmd_str);

    debug!(cmd = cmd_str, "handling command");

    match cmd {
        Command::Ping => ok(id, json!({ "message": "mapping-core alive" })),

        Command::PreviewRecompute => {
            let rows: Vec<MappingRow> = match parse_array(payload, "rows") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let detection = payload
                .get("duplicate_detection")
                .and_then(|v| v.as_bool())
                .map(DuplicateDetection::from)
                .unwrap_or_else(|| session.widget.detection());

            let result = preview::recompute_with(&rows, detection);
            ok(id, serde_json::to_value(result).unwrap_or(json!({})))
        }

        Command::BuildTypesFill => {
            let build_types: Vec<BuildType> = match parse_array(payload, "build_types") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            session.widget.fill_build_types(&build_types);
            ok(id, json!({ "state": state(session) }))
        }

        Command::BuildTypeSelect => {
            let Some(index) = payload.get("index").and_then(|v| v.as_u64()) else {
                return err(id, "payload.index must be a number");
            };
            match session.widget.select_build_type(index as usize) {
                Ok(()) => ok(id, json!({ "state": state(session) })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::MappingAdd => {
            match session.widget.add_mapping(session.source.as_ref()) {
                Ok(added) => ok(id, json!({ "added": added, "state": state(session) })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::RowAdd => {
            let from = str_field(payload, "from").unwrap_or_default();
            let to = str_field(payload, "to").unwrap_or_default();
            let comment = str_field(payload, "comment").unwrap_or_default();

            let row_id = session.widget.add_mapping_row(from, to, comment);
            ok(id, json!({ "row_id": row_id, "state": state(session) }))
        }

        Command::RowEdit => {
            let row_id = match row_id(payload) {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let from = str_field(payload, "from");
            let to = str_field(payload, "to");

            match session.widget.edit_row(row_id, from, to) {
                Ok(()) => ok(id, json!({ "state": state(session) })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::RowEvent => {
            let row_id = match row_id(payload) {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let event: InputEvent = match payload
                .get("event")
                .cloned()
                .map(serde_json::from_value)
            {
                Some(Ok(ev)) => ev,
                _ => return err(id, "payload.event must be \"blur\" or \"key_press\""),
            };

            let action = session.widget.handle_event(row_id, event, now);
            ok(id, json!({ "action": action, "state": state(session) }))
        }

        Command::RowRemove => {
            let row_id = match row_id(payload) {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            match session.widget.remove_row(row_id) {
                Ok(()) => ok(id, json!({ "state": state(session) })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::RowsClear => {
            session.widget.clear_rows();
            ok(id, json!({ "state": state(session) }))
        }

        Command::WidgetState => ok(id, json!({ "state": state(session) })),

        Command::Tick => {
            let ran = session.widget.tick(now);
            ok(id, json!({ "recomputed": ran, "state": state(session) }))
        }

        Command::Unknown => err(id, "unknown command"),
    }
}
