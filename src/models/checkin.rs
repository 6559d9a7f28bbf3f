use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed set of moods offered on the check-in screen.
///
/// Serialized as the lowercase name. Reads also accept the label or emoji,
/// which is how older check-ins were stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Mood {
  Sad,
  Neutral,
  Good,
  Great,
}

impl Mood {
  pub const ALL: [Mood; 4] = [Mood::Sad, Mood::Neutral, Mood::Good, Mood::Great];

  pub fn emoji(&self) -> &'static str {
    match self {
      Self::Sad => "😞",
      Self::Neutral => "😐",
      Self::Good => "😊",
      Self::Great => "😄",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Sad => "Sad",
      Self::Neutral => "Neutral",
      Self::Good => "Good",
      Self::Great => "Great",
    }
  }
}

impl std::fmt::Display for Mood {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Sad => write!(f, "sad"),
      Self::Neutral => write!(f, "neutral"),
      Self::Good => write!(f, "good"),
      Self::Great => write!(f, "great"),
    }
  }
}

impl std::str::FromStr for Mood {
  type Err = String;

  /// Accepts the lowercase name, the display label, or the emoji shown in the picker
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    Mood::ALL
      .into_iter()
      .find(|m| trimmed.eq_ignore_ascii_case(m.label()) || trimmed == m.emoji())
      .ok_or_else(|| format!("Unknown mood: {:?}", s))
  }
}

impl TryFrom<String> for Mood {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

/// Payload persisted under a `checkin-<date>` key. The date lives in the key only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinEntry {
  pub mood: Mood,
  #[serde(default)]
  pub notes: String,
}

/// One check-in per local calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRecord {
  pub date: NaiveDate,
  pub mood: Mood,
  pub notes: String,
}

impl CheckinRecord {
  pub fn from_entry(date: NaiveDate, entry: CheckinEntry) -> Self {
    Self {
      date,
      mood: entry.mood,
      notes: entry.notes,
    }
  }

  pub fn has_notes(&self) -> bool {
    !self.notes.trim().is_empty()
  }
}
