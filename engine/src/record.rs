use serde::{Deserialize, Serialize};

/// A primitive source value before coercion. Datasets deliver numbers and
/// booleans both natively and as strings, so every field accepts any of
/// these shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// The trimmed text form of the value.
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s.trim().to_string(),
        }
    }

    /// Defensive count parse: non-numeric input and negatives coerce to 0,
    /// floats truncate.
    pub fn as_count(&self) -> u32 {
        let n = match self {
            Scalar::Bool(_) => 0,
            Scalar::Int(n) => *n,
            Scalar::Float(f) => *f as i64,
            Scalar::Str(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .or_else(|_| t.parse::<f64>().map(|f| f as i64))
                    .unwrap_or(0)
            }
        };
        n.clamp(0, u32::MAX as i64) as u32
    }

    /// Case-insensitive truthiness: `true`/`"true"`/`"1"`/`1` are true,
    /// everything else is false.
    pub fn as_flag(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Int(n) => *n == 1,
            Scalar::Float(f) => *f == 1.0,
            Scalar::Str(s) => {
                let t = s.trim();
                t.eq_ignore_ascii_case("true") || t == "1"
            }
        }
    }
}

fn text_of(field: &Option<Scalar>) -> String {
    field.as_ref().map(Scalar::as_text).unwrap_or_default()
}

fn count_of(field: &Option<Scalar>) -> u32 {
    field.as_ref().map(Scalar::as_count).unwrap_or(0)
}

fn flag_of(field: &Option<Scalar>) -> bool {
    field.as_ref().map(Scalar::as_flag).unwrap_or(false)
}

/// One raw catalog record as produced by a source adapter. The serde
/// aliases are the fixed field-name variants observed across datasets;
/// unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "appid", alias = "appId", alias = "id")]
    pub app_id: Option<Scalar>,
    #[serde(default, alias = "title")]
    pub name: Option<Scalar>,
    #[serde(default, alias = "short_description", alias = "shortDescription")]
    pub description: Option<Scalar>,
    #[serde(
        default,
        alias = "headerImage",
        alias = "image",
        alias = "img",
        alias = "capsule_image",
        alias = "capsule_imagev5"
    )]
    pub header_image: Option<Scalar>,
    #[serde(default, alias = "metacriticScore")]
    pub metacritic_score: Option<Scalar>,
    #[serde(
        default,
        alias = "recommendations_total",
        alias = "recommendationsTotal"
    )]
    pub recommendations: Option<Scalar>,
    #[serde(default, alias = "isFree")]
    pub is_free: Option<Scalar>,
}

impl RawRecord {
    pub fn app_id_text(&self) -> String {
        text_of(&self.app_id)
    }

    pub fn name_text(&self) -> String {
        text_of(&self.name)
    }

    pub fn description_text(&self) -> String {
        text_of(&self.description)
    }

    pub fn header_image_text(&self) -> String {
        text_of(&self.header_image)
    }

    pub fn metacritic_value(&self) -> u32 {
        count_of(&self.metacritic_score)
    }

    pub fn recommendations_value(&self) -> u32 {
        count_of(&self.recommendations)
    }

    pub fn is_free_value(&self) -> bool {
        flag_of(&self.is_free)
    }

    /// The deduplication identity: the external id when present, else the
    /// lowercased name. `None` when the record has neither, which marks it
    /// unidentifiable.
    pub fn identity_key(&self) -> Option<String> {
        let app_id = self.app_id_text();
        if !app_id.is_empty() {
            return Some(app_id);
        }
        let name = self.name_text();
        if !name.is_empty() {
            return Some(name.to_lowercase());
        }
        None
    }
}
