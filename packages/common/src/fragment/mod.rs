mod error;
mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::media::MediaType;

pub use error::FragmentError;
pub use store::FragmentStore;

/// Construction input for a [`Fragment`].
///
/// `owner_id` and `content_type` are required; a fresh id is generated when
/// `id` is absent and `size` defaults to zero.
#[derive(Debug, Clone, Default)]
pub struct NewFragment {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<i64>,
}

impl NewFragment {
    pub fn new(owner_id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Metadata for a single stored payload, scoped to one owner.
///
/// `id`, `owner_id` and the declared type are fixed at construction; only
/// `size` and `updated` change afterwards, through [`FragmentStore`].
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    #[schema(example = "30a84843-0cd4-4975-95ba-b96112aea189")]
    id: String,
    /// Hex SHA-256 of the owner's email.
    owner_id: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    /// Declared Content-Type, parameters included.
    #[serde(rename = "type")]
    #[schema(example = "text/plain; charset=utf-8")]
    content_type: String,
    /// Payload length in bytes.
    size: u64,
    #[serde(skip)]
    media_type: MediaType,
}

impl Fragment {
    pub fn new(input: NewFragment) -> Result<Self, FragmentError> {
        let (owner_id, content_type, media_type) =
            validate_owner_and_type(input.owner_id, input.content_type)?;
        let size = match input.size {
            Some(size) if size < 0 => {
                return Err(FragmentError::Validation(
                    "invalid value: size cannot be negative".into(),
                ));
            }
            Some(size) => size as u64,
            None => 0,
        };

        let now = Utc::now();
        Ok(Self {
            id: input
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            owner_id,
            created: now,
            updated: now,
            content_type,
            size,
            media_type,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The declared type exactly as given at creation.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The declared type without parameters.
    pub fn mime_type(&self) -> MediaType {
        self.media_type
    }

    pub fn is_text(&self) -> bool {
        self.media_type.is_text()
    }

    /// Types this fragment can be served as.
    pub fn formats(&self) -> &'static [MediaType] {
        self.media_type.targets()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    pub(crate) fn touch(&mut self) {
        self.updated = Utc::now();
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        self.size = size;
    }
}

fn validate_owner_and_type(
    owner_id: Option<String>,
    content_type: Option<String>,
) -> Result<(String, String, MediaType), FragmentError> {
    let owner_id = owner_id
        .filter(|o| !o.is_empty())
        .ok_or_else(|| FragmentError::Validation("missing parameter: ownerId".into()))?;
    let content_type = content_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| FragmentError::Validation("missing parameter: type".into()))?;
    let media_type = MediaType::parse(&content_type)?;
    Ok((owner_id, content_type, media_type))
}

/// Wire shape of a stored metadata record, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FragmentRecord {
    id: Option<String>,
    owner_id: Option<String>,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    content_type: Option<String>,
    #[serde(default)]
    size: Option<serde_json::Value>,
}

impl TryFrom<FragmentRecord> for Fragment {
    type Error = FragmentError;

    fn try_from(record: FragmentRecord) -> Result<Self, Self::Error> {
        let size = match record.size {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Number(n)) => match n.as_i64() {
                Some(size) => Some(size),
                None if n.as_u64().is_some() || n.as_f64().is_some_and(|f| f >= 0.0) => {
                    return Err(FragmentError::Validation(
                        "invalid datatype: size must be an integer".into(),
                    ));
                }
                None => {
                    return Err(FragmentError::Validation(
                        "invalid value: size cannot be negative".into(),
                    ));
                }
            },
            Some(_) => {
                return Err(FragmentError::Validation(
                    "invalid datatype: size must be a number".into(),
                ));
            }
        };

        let mut fragment = Fragment::new(NewFragment {
            id: record.id,
            owner_id: record.owner_id,
            content_type: record.content_type,
            size,
        })?;
        if let Some(created) = record.created {
            fragment.created = created;
        }
        if let Some(updated) = record.updated {
            fragment.updated = updated;
        }
        Ok(fragment)
    }
}

impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = FragmentRecord::deserialize(deserializer)?;
        Fragment::try_from(record).map_err(serde::de::Error::custom)
    }
}
