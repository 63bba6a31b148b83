//! Signal result data and the inline token it is rendered into

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ATTR_SIGNAL, ATTR_SIGNAL_PROPS, ATTR_SIGNAL_TYPE};
use crate::editable::markup;
use crate::editable::{EditableContent, InlineElement, ATTR_CONTENTEDITABLE};

/// Extra confirmation data handed to the confirm hook but never serialized
/// into the token.
pub type ExtraData = Map<String, Value>;

/// Payload produced when a signal session is confirmed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalData {
    /// Trigger character
    pub signal: char,
    /// Operator type name
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal display text of the token
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_class: Option<String>,
    /// Opaque properties embedded in the token
    #[serde(default = "empty_props")]
    pub props: Value,
}

fn empty_props() -> Value {
    Value::Object(Map::new())
}

impl SignalData {
    pub fn new(signal: char, kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            signal,
            kind: kind.into(),
            content: content.into(),
            dom_class: None,
            props: empty_props(),
        }
    }

    /// Set the properties (builder pattern)
    pub fn with_props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    /// Set the CSS class of the rendered token (builder pattern)
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.dom_class = Some(class.into());
        self
    }

    /// Deserialize the properties into a typed record
    pub fn props_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.props)
    }

    /// Build the non-editable inline element for this data.
    ///
    /// `dom_class` is the operator's class; the data's own class wins when set.
    pub fn to_token(&self, dom_class: Option<&str>) -> InlineElement {
        let mut el = InlineElement::new("span", self.content.as_str())
            .with_attr(ATTR_CONTENTEDITABLE, "false");
        if let Some(class) = self.dom_class.as_deref().or(dom_class) {
            el = el.with_attr("class", class);
        }
        let props = if self.props.is_null() {
            "{}".to_string()
        } else {
            self.props.to_string()
        };
        el.with_attr(ATTR_SIGNAL, self.signal.to_string())
            .with_attr(ATTR_SIGNAL_TYPE, self.kind.as_str())
            .with_attr(ATTR_SIGNAL_PROPS, props)
    }

    /// Read signal data back from a token element.
    ///
    /// Returns `None` when the element is not a signal token. Unparseable
    /// properties are kept as a JSON string.
    pub fn from_token(el: &InlineElement) -> Option<Self> {
        let mut chars = el.attr(ATTR_SIGNAL)?.chars();
        let signal = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return None,
        };
        let kind = el.attr(ATTR_SIGNAL_TYPE)?.to_string();
        let props = match el.attr(ATTR_SIGNAL_PROPS) {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.into())),
            None => empty_props(),
        };
        Some(Self {
            signal,
            kind,
            content: el.text.clone(),
            dom_class: el.attr("class").map(str::to_string),
            props,
        })
    }
}

/// Default token markup for `data`
pub fn create_signal_html(data: &SignalData, dom_class: Option<&str>) -> String {
    markup::inline_to_html(&data.to_token(dom_class))
}

/// Normalize surface HTML for emptiness checks: non-breaking spaces and
/// empty block lines become spaces, trailing line breaks are dropped, and the
/// result is trimmed.
pub fn valid_html_content(html: &str) -> String {
    let mut out = html.replace("&nbsp;", " ").replace("<div><br></div>", " ");
    loop {
        if let Some(rest) = out.strip_suffix("<br>") {
            out.truncate(rest.len());
        } else if let Some(rest) = out.strip_suffix("<br/>") {
            out.truncate(rest.len());
        } else {
            break;
        }
    }
    out.trim().to_string()
}

/// Whether the surface HTML has any content after normalization
pub fn has_valid_content(html: &str) -> bool {
    !valid_html_content(html).is_empty()
}

/// All signal tokens in the content, in document order
pub fn signal_tokens(content: &EditableContent) -> Vec<SignalData> {
    content
        .nodes()
        .iter()
        .filter_map(|node| node.as_inline())
        .filter_map(SignalData::from_token)
        .collect()
}
