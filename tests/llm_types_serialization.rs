use fleet::llm::types::{Message, ToolResultContent, ToolUse};
use serde_json::json;

#[test]
fn serializes_user_message_with_text_content() {
    let value = serde_json::to_value(Message::user("hi")).unwrap();
    assert_eq!(value, json!({ "role": "user", "content": "hi" }));
}

#[test]
fn serializes_assistant_message_with_text_content() {
    let value = serde_json::to_value(Message::assistant("ok")).unwrap();
    assert_eq!(value, json!({ "role": "assistant", "content": "ok" }));
}

#[test]
fn serializes_tool_result_message_as_blocks() {
    let value = serde_json::to_value(Message::tool_result("toolu_123", "output", false)).unwrap();
    assert_eq!(
        value,
        json!({
            "role": "user",
            "content": [
                { "type": "tool_result", "tool_use_id": "toolu_123", "content": "output" }
            ]
        })
    );
}

#[test]
fn serializes_several_tool_results_in_one_turn() {
    let msg = Message::tool_results(vec![
        ToolResultContent::new("toolu_1", "ok", false),
        ToolResultContent::new("toolu_2", "Error: File not found: x", true),
    ]);
    let value = serde_json::to_value(msg).unwrap();
    assert_eq!(
        value,
        json!({
            "role": "user",
            "content": [
                { "type": "tool_result", "tool_use_id": "toolu_1", "content": "ok" },
                { "type": "tool_result", "tool_use_id": "toolu_2", "content": "Error: File not found: x", "is_error": true }
            ]
        })
    );
}

#[test]
fn serializes_assistant_blocks_with_tool_use() {
    let call = ToolUse {
        id: "toolu_abc".to_string(),
        name: "exec".to_string(),
        input: json!({ "command": "echo hi" }),
    };

    let msg = Message::assistant_with_tool_calls(Some("Running it."), &[call]);
    let value = serde_json::to_value(msg).unwrap();
    assert_eq!(
        value,
        json!({
            "role": "assistant",
            "content": [
                { "type": "text", "text": "Running it." },
                { "type": "tool_use", "id": "toolu_abc", "name": "exec", "input": { "command": "echo hi" } }
            ]
        })
    );
}

#[test]
fn deserializes_tool_use_without_input() {
    let call: ToolUse =
        serde_json::from_value(json!({ "id": "toolu_x", "name": "list_dir" })).unwrap();
    assert_eq!(call.input, serde_json::Value::Null);
}
