//! Form component tree.
//!
//! The model file describes the form as a forest of components. Each JSON
//! object carries a `"type"` tag selecting one of the variants below; tags
//! this crate does not know are kept as [`Component::Unknown`] so the
//! renderer can report them without losing the rest of the tree.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::level::{LevelName, LevelSet};

/// Value type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    String,
    Integer,
    Float,
    Choice,
    File,
    /// A datatype name with no known control.
    Unknown(String),
}

impl Datatype {
    /// Parse a datatype name case-insensitively. Unrecognized names are kept.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Datatype::String,
            "integer" | "int" => Datatype::Integer,
            "float" => Datatype::Float,
            "choice" => Datatype::Choice,
            "file" => Datatype::File,
            _ => Datatype::Unknown(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Float => "float",
            Datatype::Choice => "choice",
            Datatype::File => "file",
            Datatype::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Datatype::Unknown(_))
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper repeat bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMax {
    Bounded(u32),
    Unbounded,
}

impl fmt::Display for RepeatMax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatMax::Bounded(max) => write!(f, "{max}"),
            RepeatMax::Unbounded => f.write_str("*"),
        }
    }
}

/// Most instances a component may require up front. Each one is rendered.
pub const MAX_REPEAT_MIN: u32 = 1000;

/// Allowed instance count of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatBounds {
    pub min: u32,
    pub max: RepeatMax,
}

impl Default for RepeatBounds {
    fn default() -> Self {
        Self::single()
    }
}

impl RepeatBounds {
    pub fn new(min: u32, max: RepeatMax) -> Result<Self> {
        if min > MAX_REPEAT_MIN {
            return Err(ModelError::RepeatMinTooLarge {
                min,
                limit: MAX_REPEAT_MIN,
            });
        }
        if let RepeatMax::Bounded(max) = max
            && min > max
        {
            return Err(ModelError::InvalidRepeatBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Exactly one instance.
    pub fn single() -> Self {
        Self {
            min: 1,
            max: RepeatMax::Bounded(1),
        }
    }

    pub fn is_repeatable(&self) -> bool {
        *self != Self::single()
    }

    pub fn allows(&self, count: u32) -> bool {
        count >= self.min
            && match self.max {
                RepeatMax::Bounded(max) => count <= max,
                RepeatMax::Unbounded => true,
            }
    }

    fn from_fields(kind: &str, body: &Map<String, Value>) -> Result<Self> {
        let min = match body.get("repeat_min") {
            None | Some(Value::Null) => 1,
            Some(value) => count_field(kind, "repeat_min", value)?,
        };
        let max = match body.get("repeat_max") {
            None => RepeatMax::Bounded(min.max(1)),
            Some(Value::Null) => RepeatMax::Unbounded,
            Some(Value::String(word))
                if matches!(word.trim(), "unbounded" | "inf" | "*" | "unlimited") =>
            {
                RepeatMax::Unbounded
            }
            Some(value) => RepeatMax::Bounded(count_field(kind, "repeat_max", value)?),
        };
        Self::new(min, max)
    }
}

fn count_field(kind: &str, field: &str, value: &Value) -> Result<u32> {
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|count| u32::try_from(count).ok())
        .ok_or_else(|| ModelError::InvalidField {
            field: format!("{kind}.{field}"),
            message: format!("expected a non-negative count, got {value}"),
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub label: String,
    pub children: Vec<Component>,
    pub repeat: RepeatBounds,
    pub access_levels: Option<LevelSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub label: Option<String>,
    pub datatype: Datatype,
    pub default: String,
    pub options: Vec<String>,
    pub repeat: RepeatBounds,
    pub access_levels: Option<LevelSet>,
}

impl Parameter {
    /// Label shown next to the control, falling back to the name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
}

/// One node of the form description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawComponent")]
pub enum Component {
    Section(Section),
    Parameter(Parameter),
    Paragraph(Paragraph),
    /// A component whose `type` tag is not recognized.
    Unknown { kind: String },
}

impl Component {
    pub fn kind(&self) -> &str {
        match self {
            Component::Section(_) => "section",
            Component::Parameter(_) => "parameter",
            Component::Paragraph(_) => "paragraph",
            Component::Unknown { kind } => kind,
        }
    }

    pub fn children(&self) -> &[Component] {
        match self {
            Component::Section(section) => &section.children,
            _ => &[],
        }
    }

    pub fn access_levels(&self) -> Option<&LevelSet> {
        match self {
            Component::Section(section) => section.access_levels.as_ref(),
            Component::Parameter(parameter) => parameter.access_levels.as_ref(),
            Component::Paragraph(_) | Component::Unknown { .. } => None,
        }
    }

    pub fn repeat(&self) -> RepeatBounds {
        match self {
            Component::Section(section) => section.repeat,
            Component::Parameter(parameter) => parameter.repeat,
            Component::Paragraph(_) | Component::Unknown { .. } => RepeatBounds::single(),
        }
    }

    /// Whether the component is visible at the level named `level`.
    ///
    /// Components without access levels, or with an empty set, are visible
    /// at every level.
    pub fn visible_at(&self, level: &LevelName) -> bool {
        self.access_levels()
            .is_none_or(|levels| levels.is_empty() || levels.contains(level))
    }
}

/// Parse a JSON model: either an array of components or an object with a
/// `components` array.
pub fn parse_forest(json: &str) -> Result<Vec<Component>> {
    let value: Value = serde_json::from_str(json).map_err(|e| ModelError::Malformed {
        kind: "model".to_string(),
        message: e.to_string(),
    })?;
    forest_from_value(value)
}

pub fn forest_from_value(value: Value) -> Result<Vec<Component>> {
    let items = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut object) => object.remove("components").ok_or_else(|| {
            ModelError::Malformed {
                kind: "model".to_string(),
                message: "expected an array or an object with a `components` array".to_string(),
            }
        })?,
        other => {
            return Err(ModelError::Malformed {
                kind: "model".to_string(),
                message: format!("expected an array, got {other}"),
            });
        }
    };
    serde_json::from_value(items).map_err(|e| ModelError::Malformed {
        kind: "model".to_string(),
        message: e.to_string(),
    })
}

#[derive(Deserialize)]
struct RawComponent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    body: Map<String, Value>,
}

#[derive(Deserialize)]
struct SectionBody {
    #[serde(default)]
    label: String,
    #[serde(default)]
    children: Vec<Component>,
}

#[derive(Deserialize)]
struct ParameterBody {
    name: String,
    #[serde(default)]
    label: Option<String>,
    datatype: String,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    options: Vec<Value>,
}

#[derive(Deserialize)]
struct ParagraphBody {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<RawComponent> for Component {
    type Error = ModelError;

    fn try_from(raw: RawComponent) -> Result<Self> {
        let kind = raw.kind.trim().to_ascii_lowercase();
        match kind.as_str() {
            "section" => {
                let repeat = RepeatBounds::from_fields(&kind, &raw.body)?;
                let access_levels = access_levels(&kind, &raw.body)?;
                let body: SectionBody = body_as(&kind, raw.body)?;
                Ok(Component::Section(Section {
                    label: body.label,
                    children: body.children,
                    repeat,
                    access_levels,
                }))
            }
            "parameter" => {
                let repeat = RepeatBounds::from_fields(&kind, &raw.body)?;
                let access_levels = access_levels(&kind, &raw.body)?;
                let body: ParameterBody = body_as(&kind, raw.body)?;
                if body.name.trim().is_empty() {
                    return Err(ModelError::InvalidParameterName(body.name));
                }
                Ok(Component::Parameter(Parameter {
                    name: body.name.trim().to_string(),
                    label: body.label,
                    datatype: Datatype::parse(&body.datatype),
                    default: body.default.as_ref().map(scalar_text).unwrap_or_default(),
                    options: body.options.iter().map(scalar_text).collect(),
                    repeat,
                    access_levels,
                }))
            }
            "paragraph" => {
                let body: ParagraphBody = body_as(&kind, raw.body)?;
                Ok(Component::Paragraph(Paragraph { text: body.text }))
            }
            _ => Ok(Component::Unknown { kind: raw.kind }),
        }
    }
}

fn body_as<T: for<'de> Deserialize<'de>>(kind: &str, body: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(body)).map_err(|e| ModelError::Malformed {
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

fn access_levels(kind: &str, body: &Map<String, Value>) -> Result<Option<LevelSet>> {
    let Some(value) = body.get("accesslevels").or_else(|| body.get("accessLevels")) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let names = match OneOrMany::deserialize(value.clone()) {
        Ok(OneOrMany::One(name)) => vec![name],
        Ok(OneOrMany::Many(names)) => names,
        Err(e) => {
            return Err(ModelError::InvalidField {
                field: format!("{kind}.accesslevels"),
                message: e.to_string(),
            });
        }
    };
    let set = names
        .into_iter()
        .map(LevelName::new)
        .collect::<Result<LevelSet>>()?;
    // An empty list gates nothing.
    Ok((!set.is_empty()).then_some(set))
}

/// String form of a scalar JSON value; strings are taken verbatim.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
