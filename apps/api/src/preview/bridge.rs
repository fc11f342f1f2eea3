#![allow(dead_code)]

// The message contract between the editor and the sandboxed preview iframe.
// Only plain serializable data crosses the boundary; the sanitizer strips
// generated code that tries to post DOM objects. Wire form: a `type` tag in
// SCREAMING_SNAKE_CASE plus a `payload` field; style keys are camelCase to
// match computed-style property names.

use serde::{Deserialize, Serialize};

/// Events posted out of the sandbox to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditorEvent {
    ElementSelected(SelectedElement),
    ClearSelection,
}

/// Commands posted into the sandbox by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditorCommand {
    UpdateElement(ElementUpdates),
    ClearSelectionRequest,
}

/// Snapshot of the clicked element, as reported by the bridge script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedElement {
    pub tag_name: String,
    pub class_name: String,
    pub text: String,
    pub styles: ElementStyles,
}

/// The fixed computed-style subset surfaced to the editor panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyles {
    pub padding: String,
    pub margin: String,
    pub background_color: String,
    pub color: String,
    pub font_size: String,
}

/// Partial edit of the selected element. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleUpdates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_selected_wire_shape() {
        let event = EditorEvent::ElementSelected(SelectedElement {
            tag_name: "button".to_string(),
            class_name: "btn btn-primary".to_string(),
            text: "Buy now".to_string(),
            styles: ElementStyles {
                padding: "8px 16px".to_string(),
                margin: "0px".to_string(),
                background_color: "rgb(139, 92, 246)".to_string(),
                color: "rgb(255, 255, 255)".to_string(),
                font_size: "14px".to_string(),
            },
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "ELEMENT_SELECTED",
                "payload": {
                    "tagName": "button",
                    "className": "btn btn-primary",
                    "text": "Buy now",
                    "styles": {
                        "padding": "8px 16px",
                        "margin": "0px",
                        "backgroundColor": "rgb(139, 92, 246)",
                        "color": "rgb(255, 255, 255)",
                        "fontSize": "14px"
                    }
                }
            })
        );
    }

    #[test]
    fn test_clear_selection_has_no_payload() {
        let value = serde_json::to_value(&EditorEvent::ClearSelection).unwrap();
        assert_eq!(value, json!({ "type": "CLEAR_SELECTION" }));
    }

    #[test]
    fn test_clear_selection_request_roundtrip() {
        let raw = r#"{"type":"CLEAR_SELECTION_REQUEST"}"#;
        let command: EditorCommand = serde_json::from_str(raw).unwrap();
        assert_eq!(command, EditorCommand::ClearSelectionRequest);
    }

    #[test]
    fn test_update_element_partial_fields_omitted() {
        let command = EditorCommand::UpdateElement(ElementUpdates {
            text: Some("New heading".to_string()),
            ..Default::default()
        });

        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "UPDATE_ELEMENT",
                "payload": { "text": "New heading" }
            })
        );
    }

    #[test]
    fn test_update_element_deserializes_from_editor_json() {
        let raw = r##"{"type":"UPDATE_ELEMENT","payload":{"className":"hero","styles":{"backgroundColor":"#1e293b"}}}"##;
        let command: EditorCommand = serde_json::from_str(raw).unwrap();
        match command {
            EditorCommand::UpdateElement(updates) => {
                assert_eq!(updates.class_name.as_deref(), Some("hero"));
                assert_eq!(
                    updates.styles.unwrap().background_color.as_deref(),
                    Some("#1e293b")
                );
                assert!(updates.text.is_none());
            }
            other => panic!("expected UpdateElement, got {other:?}"),
        }
    }
}
