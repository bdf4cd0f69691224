use serde_json::json;
use searchbatch_core::{Message, SearchbatchError};
use searchbatch_llm::openai_compatible::*;

#[test]
fn chat_completion_request_serialization() {
    let request = ChatCompletionRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![ChatMessage::from_message(Message::user("hi")).unwrap()],
        tools: None,
        temperature: Some(0.5),
        stream: false,
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["temperature"], 0.5);
    assert_eq!(json["messages"][0], json!({"role": "user", "content": "hi"}));
    assert!(json.get("tools").is_none());
}

#[test]
fn tool_message_requires_call_id() {
    let mut message = Message::tool("call-1", "[]");
    message.tool_call_id = None;
    let err = ChatMessage::from_message(message).unwrap_err();
    assert!(matches!(err, SearchbatchError::InvalidInput(_)));
}

#[test]
fn empty_arguments_become_empty_object() {
    let call = ChatToolCall {
        id: "c".to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: "noop".to_string(),
            arguments: String::new(),
        },
    };
    assert_eq!(call.into_tool_call().unwrap().args, json!({}));
}

#[test]
fn error_response_deserialization() {
    let json = r#"{
        "error": {
            "message": "Rate limit reached",
            "type": "requests",
            "code": null
        }
    }"#;

    let error: OpenAiError = serde_json::from_str(json).unwrap();
    assert_eq!(error.error.message, "Rate limit reached");
    assert_eq!(error.error.error_type, Some("requests".to_string()));
    assert_eq!(error.error.code, None);
}
