use serde::{Deserialize, Serialize};

/// A rich-text node: optional text payload plus ordered child nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
}

#[cfg(test)]
impl Node {
    /// Leaf node carrying only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some("text".to_string()),
            text: Some(text.into()),
            content: Vec::new(),
        }
    }

    /// Container node without a text payload of its own
    pub fn container(kind: impl Into<String>, content: Vec<Node>) -> Self {
        Self {
            kind: Some(kind.into()),
            text: None,
            content,
        }
    }
}

/// Flatten a node tree into a single string.
///
/// Children are emitted first, in document order, and a node's own text
/// follows the text of its children. A missing node yields an empty string.
pub fn flatten(node: Option<&Node>) -> String {
    let Some(root) = node else {
        return String::new();
    };

    let mut output = String::new();
    // (node, children_done)
    let mut stack: Vec<(&Node, bool)> = vec![(root, false)];

    while let Some((current, children_done)) = stack.pop() {
        if children_done {
            if let Some(ref text) = current.text {
                output.push_str(text);
            }
            continue;
        }

        stack.push((current, true));
        for child in current.content.iter().rev() {
            stack.push((child, false));
        }
    }

    output
}
