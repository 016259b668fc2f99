//! Front matter block extraction and schema.
//!
//! A document may open with a `---` line followed by YAML and a closing
//! `---` line. The YAML must be a mapping. Fields the pipeline consumes are
//! typed on [`FrontMatter`]; everything else is kept in [`FrontMatter::extra`]
//! and passed through to the compiled payload untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::ParseError;

const DELIMITER: &str = "---";

/// Typed front matter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Replaces the file stem in the document id.
    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Explicit slug; absolute when it starts with `/`.
    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub slug: Option<String>,

    /// Label used for sidebar links instead of the title.
    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub sidebar_label: Option<String>,

    /// Position among siblings in autogenerated sidebars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_position: Option<f64>,

    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub sidebar_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub draft: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unlisted: bool,

    /// A single scalar is read as a one-element list.
    #[serde(
        default,
        deserialize_with = "scalar_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide_table_of_contents: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc_min_heading_level: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc_max_heading_level: Option<u8>,

    /// `None`: derive from the sidebar. `Some(None)`: no previous link.
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub pagination_prev: Option<Option<String>>,

    /// `None`: derive from the sidebar. `Some(None)`: no next link.
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub pagination_next: Option<Option<String>>,

    /// Unrecognized keys, passed through as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Distinguish a present `null` from an absent key.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar(deserializer).map(Some)
}

/// Any YAML scalar as a string: `title: 2024` reads as `"2024"`.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_string(serde_yaml::Value::deserialize(deserializer)?)
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Sequence(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                list.extend(scalar_to_string(item)?);
            }
            Ok(list)
        }
        other => Ok(scalar_to_string(other)?.into_iter().collect()),
    }
}

fn scalar_to_string<E: de::Error>(value: serde_yaml::Value) -> Result<Option<String>, E> {
    match value {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::String(s) => Ok(Some(s)),
        serde_yaml::Value::Number(n) => Ok(Some(n.to_string())),
        serde_yaml::Value::Bool(b) => Ok(Some(b.to_string())),
        serde_yaml::Value::Tagged(tagged) => scalar_to_string(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err(E::custom("expected a scalar value"))
        }
    }
}

impl FrontMatter {
    /// Parse front matter from the YAML between the delimiters.
    ///
    /// Empty content yields the default (all fields unset).
    pub fn from_yaml(content: &str) -> Result<Self, ParseError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ParseError::MalformedFrontMatter(format!("invalid YAML: {e}")))?;
        if !value.is_mapping() {
            return Err(ParseError::MalformedFrontMatter(
                "front matter must be a mapping".to_owned(),
            ));
        }

        serde_yaml::from_value(value).map_err(|e| ParseError::MalformedFrontMatter(e.to_string()))
    }
}

/// Split `text` into its front matter YAML (if any) and the markdown body.
///
/// A leading `---` line without a matching closing line is an error rather
/// than being treated as a thematic break.
pub fn split_front_matter(text: &str) -> Result<(Option<&str>, &str), ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((None, text));
    };
    if first.trim_end() != DELIMITER {
        return Ok((None, text));
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }

    Err(ParseError::MalformedFrontMatter(
        "missing closing `---` delimiter".to_owned(),
    ))
}
