//! Lead description: the follow-up action attached to a lead
//!
//! The backend stores four loosely related fields
//! (`faqType`, `variant`, `customFaqType`, `customVariant`) where a "Custom"
//! selection routes to the paired free-text field. On our side this collapses
//! into one tagged value at the serde boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

const CUSTOM: &str = "Custom";

/// How the customer is followed up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Mail,
    Call,
    Visit,
    /// Free-text kind entered by the user
    Custom(String),
}

impl ContactKind {
    pub fn label(&self) -> &str {
        match self {
            Self::Mail => "Mail",
            Self::Call => "Call",
            Self::Visit => "Visit",
            Self::Custom(text) => text,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

/// The specific sub-action for a contact kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptionDetail {
    /// One of the predefined variants offered for the kind
    Variant(String),
    /// Free-text variant entered by the user
    Custom(String),
}

impl DescriptionDetail {
    pub fn label(&self) -> &str {
        match self {
            Self::Variant(text) | Self::Custom(text) => text,
        }
    }
}

/// Tagged description value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDescription", into = "RawDescription")]
pub struct LeadDescription {
    pub kind: ContactKind,
    pub detail: Option<DescriptionDetail>,
}

impl LeadDescription {
    pub fn new(kind: ContactKind, detail: Option<DescriptionDetail>) -> Self {
        Self { kind, detail }
    }

    /// Predefined kind with a predefined variant
    pub fn variant(kind: ContactKind, variant: impl Into<String>) -> Self {
        Self::new(kind, Some(DescriptionDetail::Variant(variant.into())))
    }
}

impl fmt::Display for LeadDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.kind.label(), detail.label()),
            None => write!(f, "{}", self.kind.label()),
        }
    }
}

/// Backend wire shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescription {
    #[serde(default)]
    faq_type: Option<String>,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    custom_faq_type: Option<String>,
    #[serde(default)]
    custom_variant: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<RawDescription> for LeadDescription {
    type Error = String;

    fn try_from(raw: RawDescription) -> Result<Self, Self::Error> {
        let faq_type = non_empty(raw.faq_type).ok_or("faqType is required")?;

        let kind = match faq_type.as_str() {
            "Mail" => ContactKind::Mail,
            "Call" => ContactKind::Call,
            "Visit" => ContactKind::Visit,
            CUSTOM => ContactKind::Custom(
                non_empty(raw.custom_faq_type)
                    .ok_or("customFaqType is required when faqType is Custom")?,
            ),
            // Kinds added on the backend after this client shipped
            other => ContactKind::Custom(other.to_string()),
        };

        let detail = match non_empty(raw.variant) {
            Some(v) if v == CUSTOM => Some(DescriptionDetail::Custom(
                non_empty(raw.custom_variant)
                    .ok_or("customVariant is required when variant is Custom")?,
            )),
            Some(v) => Some(DescriptionDetail::Variant(v)),
            None => None,
        };

        Ok(Self { kind, detail })
    }
}

/// Deserialize an optional description, treating empty or malformed values as absent
///
/// A half-filled description on one lead must not fail a whole lead list.
pub(crate) fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<LeadDescription>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawDescription>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| LeadDescription::try_from(r).ok()))
}

impl From<LeadDescription> for RawDescription {
    fn from(desc: LeadDescription) -> Self {
        let (faq_type, custom_faq_type) = match desc.kind {
            ContactKind::Custom(text) => (CUSTOM.to_string(), Some(text)),
            kind => (kind.label().to_string(), None),
        };
        let (variant, custom_variant) = match desc.detail {
            Some(DescriptionDetail::Variant(v)) => (Some(v), None),
            Some(DescriptionDetail::Custom(text)) => (Some(CUSTOM.to_string()), Some(text)),
            None => (None, None),
        };

        Self {
            faq_type: Some(faq_type),
            variant,
            custom_faq_type,
            custom_variant,
        }
    }
}
