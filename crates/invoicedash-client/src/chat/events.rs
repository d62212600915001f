use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::client::ChatResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    #[default]
    Buffered,
    Segmented,
}

/// One progressive-rendering frame. Frames are emitted in the fixed order
/// `sql`, `data_start`, `data_row`*, `data_end`, `explanation`, `done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Sql { content: String },
    DataStart { count: usize },
    DataRow { row: Value },
    DataEnd,
    Explanation { content: String },
    Done,
}

/// Splits a response into frames. Parts the service left out (no SQL, a
/// non-array `data`, an empty explanation) produce no frames; `done` is always
/// last.
pub fn segments(response: &ChatResponse) -> Vec<ChatEvent> {
    let mut events = Vec::new();

    if let Some(sql) = response.sql.as_deref().filter(|sql| !sql.is_empty()) {
        events.push(ChatEvent::Sql {
            content: sql.to_string(),
        });
    }

    if let Some(rows) = response.data.as_ref().and_then(Value::as_array) {
        events.push(ChatEvent::DataStart { count: rows.len() });
        events.extend(rows.iter().map(|row| ChatEvent::DataRow { row: row.clone() }));
        events.push(ChatEvent::DataEnd);
    }

    if let Some(explanation) = response
        .explanation
        .as_deref()
        .filter(|explanation| !explanation.is_empty())
    {
        events.push(ChatEvent::Explanation {
            content: explanation.to_string(),
        });
    }

    events.push(ChatEvent::Done);
    events
}

/// Server-sent-event wire form: `data: {json}` followed by a blank line.
pub fn render_sse(events: &[ChatEvent]) -> serde_json::Result<String> {
    let mut rendered = String::new();
    for event in events {
        rendered.push_str("data: ");
        rendered.push_str(&serde_json::to_string(event)?);
        rendered.push_str("\n\n");
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChatEvent, render_sse, segments};
    use crate::chat::client::ChatResponse;

    #[test]
    fn full_response_segments_in_protocol_order() {
        let response = ChatResponse {
            sql: Some("SELECT name FROM vendors".to_string()),
            data: Some(json!([{ "name": "Acme" }, { "name": "Globex" }])),
            explanation: Some("Two vendors.".to_string()),
            ..ChatResponse::default()
        };
        let kinds = segments(&response)
            .iter()
            .map(|event| serde_json::to_value(event).ok().and_then(|value| value["type"].as_str().map(str::to_string)))
            .collect::<Vec<Option<String>>>();
        let expected = ["sql", "data_start", "data_row", "data_row", "data_end", "explanation", "done"];
        assert_eq!(
            kinds,
            expected.iter().map(|kind| Some(kind.to_string())).collect::<Vec<_>>()
        );
    }

    #[test]
    fn absent_parts_produce_no_frames() {
        let response = ChatResponse {
            data: Some(json!({ "not": "an array" })),
            explanation: Some(String::new()),
            ..ChatResponse::default()
        };
        assert_eq!(segments(&response), vec![ChatEvent::Done]);
    }

    #[test]
    fn empty_row_set_still_brackets_the_data() {
        let response = ChatResponse {
            data: Some(json!([])),
            ..ChatResponse::default()
        };
        assert_eq!(
            segments(&response),
            vec![ChatEvent::DataStart { count: 0 }, ChatEvent::DataEnd, ChatEvent::Done]
        );
    }

    #[test]
    fn renders_server_sent_event_frames() {
        let events = vec![
            ChatEvent::Sql {
                content: "SELECT 1".to_string(),
            },
            ChatEvent::DataEnd,
            ChatEvent::Done,
        ];
        let rendered = render_sse(&events);
        assert_eq!(
            rendered.ok().as_deref(),
            Some(
                "data: {\"type\":\"sql\",\"content\":\"SELECT 1\"}\n\n\
                 data: {\"type\":\"data_end\"}\n\n\
                 data: {\"type\":\"done\"}\n\n"
            )
        );
    }
}
