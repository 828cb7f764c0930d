use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Notice shown next to the harassment category.
pub const HARASSMENT_WARNING: &str =
    "IMPORTANT: If this is an urgent or life-threatening situation, please contact emergency \
     services or the school's official reporting channels immediately. This platform is for \
     anonymous reporting and feedback, not emergency response.";

/// Returned by the `FromStr` impls when a label matches no variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabel {}

/// Declares a closed label enum whose serde form is its display label.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownLabel { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

labelled_enum!(
    /// What a piece of feedback is about.
    FeedbackCategory, "category" {
        Academics => "Academics",
        ClinicalPosting => "Clinical Posting / Hospital Practice",
        Facilities => "Facilities",
        Welfare => "Welfare",
        HarassmentMisconduct => "Harassment / Misconduct",
        Other => "Other",
    }
);

labelled_enum!(
    /// Triage status. Any status may be set from any other.
    FeedbackStatus, "status" {
        New => "New",
        UnderReview => "Under Review",
        Addressed => "Addressed",
    }
);

labelled_enum!(
    YearOfStudy, "year of study" {
        Year1 => "Year 1",
        Year2 => "Year 2",
        Year3 => "Year 3",
    }
);

/// Lifecycle of a record with respect to soft deletion.
/// Persisted as the `isArchived` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordState {
    #[default]
    Active,
    Archived,
}

impl RecordState {
    pub fn is_archived(self) -> bool {
        matches!(self, RecordState::Archived)
    }
}

impl Serialize for RecordState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_archived())
    }
}

impl<'de> Deserialize<'de> for RecordState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if bool::deserialize(deserializer)? {
            Ok(RecordState::Archived)
        } else {
            Ok(RecordState::Active)
        }
    }
}

/// One stored feedback submission plus its admin metadata.
///
/// Content fields are private and have no setters; only the status and the
/// archive state change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    id: Uuid,
    category: FeedbackCategory,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year_of_study: Option<YearOfStudy>,
    date: NaiveDate,
    status: FeedbackStatus,
    #[serde(rename = "isArchived", default)]
    state: RecordState,
}

impl FeedbackRecord {
    /// A fresh record: status `New`, not archived.
    pub fn new(
        id: Uuid,
        category: FeedbackCategory,
        message: String,
        year_of_study: Option<YearOfStudy>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            category,
            message,
            year_of_study,
            date,
            status: FeedbackStatus::New,
            state: RecordState::Active,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category(&self) -> FeedbackCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn year_of_study(&self) -> Option<YearOfStudy> {
        self.year_of_study
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn status(&self) -> FeedbackStatus {
        self.status
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn is_archived(&self) -> bool {
        self.state.is_archived()
    }

    pub fn set_status(&mut self, status: FeedbackStatus) {
        self.status = status;
    }

    /// Active -> Archived. Returns false when the record was already archived.
    pub fn archive(&mut self) -> bool {
        match self.state {
            RecordState::Active => {
                self.state = RecordState::Archived;
                true
            }
            RecordState::Archived => false,
        }
    }
}

/// Parse an optional label, mapping blank input and any of `wildcards` to `None`.
fn parse_optional<'de, D, T>(deserializer: D, wildcards: &[&str]) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None => Ok(None),
        Some(s) if s.is_empty() || wildcards.contains(&s) => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_optional(deserializer, &[])
}

fn all_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_optional(deserializer, &["All"])
}

/// What a student sends. The category is optional here so a missing one is
/// reported as a validation error instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<FeedbackCategory>,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub year_of_study: Option<YearOfStudy>,
}

impl FeedbackSubmission {
    pub fn new(category: FeedbackCategory, message: impl Into<String>) -> Self {
        Self { category: Some(category), message: message.into(), year_of_study: None }
    }

    pub fn with_year(mut self, year: YearOfStudy) -> Self {
        self.year_of_study = Some(year);
        self
    }
}

/// Dashboard filter over active records. `None` (or "All" on the wire) matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
    #[serde(default, deserialize_with = "all_as_none")]
    pub category: Option<FeedbackCategory>,
    #[serde(default, deserialize_with = "all_as_none")]
    pub status: Option<FeedbackStatus>,
}

impl ListFilter {
    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        self.category.map_or(true, |c| c == record.category())
            && self.status.map_or(true, |s| s == record.status())
    }
}
