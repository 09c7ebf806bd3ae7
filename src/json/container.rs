// serde bridge: containers serialize back to their configuration shape and
// deserialize through the token decoder with the standard alias table.
use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::core::container::TextContainer;

#[derive(Serialize)]
struct TemplateRecordRef<'a> {
    with: &'a str,
    vars: &'a BTreeMap<String, TextContainer>,
}

impl Serialize for TextContainer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TextContainer::Raw(text) => serializer.serialize_str(text),
            TextContainer::Operation { name, text, vars } => {
                let templated = TextContainer::is_for_template(name);
                if !templated && !vars.is_empty() {
                    return Err(serde::ser::Error::custom(format!(
                        "operation `{name}` cannot carry template vars"
                    )));
                }
                // Short-form text is trimmed on decode; keep padded template text in a record.
                let record = templated && (!vars.is_empty() || text.trim() != text.as_str());
                let mut map = serializer.serialize_map(Some(1))?;
                if record {
                    map.serialize_entry(name, &TemplateRecordRef { with: text, vars })?;
                } else {
                    map.serialize_entry(name, text)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for TextContainer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        super::decode_value(&value).map_err(serde::de::Error::custom)
    }
}
