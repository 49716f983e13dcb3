//! Overrides — date or weekday rules that switch the active profile for a day.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::profile::CustomProfile;
use crate::time::{self, DATE_FORMAT, LocalTimestamp};

/// The day an override applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverrideKey {
    /// A single calendar date.
    Date(NaiveDate),
    /// Every occurrence of a weekday.
    Weekday(Weekday),
}

impl OverrideKey {
    /// Whether the override applies on the day of `ts`.
    #[must_use]
    pub fn applies_on(&self, ts: LocalTimestamp) -> bool {
        match self {
            Self::Date(date) => *date == ts.date(),
            Self::Weekday(day) => *day == time::weekday_of(ts),
        }
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Weekday(day) => f.write_str(time::weekday_name(*day)),
        }
    }
}

impl Serialize for OverrideKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A `(profile, title)` pair scheduled under an [`OverrideKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileOverride {
    pub profile: CustomProfile,
    pub title: String,
}

impl fmt::Display for ProfileOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.profile)
    }
}

/// Reverse index from override key to the overrides scheduled on it.
///
/// Keys keep their first-insertion order and overrides keep their insertion
/// order within a key, so a same-day scan is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideIndex {
    keys: Vec<OverrideKey>,
    entries: HashMap<OverrideKey, Vec<ProfileOverride>>,
}

impl OverrideIndex {
    pub fn insert(&mut self, key: OverrideKey, entry: ProfileOverride) {
        match self.entries.get_mut(&key) {
            Some(list) => list.push(entry),
            None => {
                self.keys.push(key.clone());
                self.entries.insert(key, vec![entry]);
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &OverrideKey) -> &[ProfileOverride] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Iterate keys in first-insertion order with their overrides.
    pub fn iter(&self) -> impl Iterator<Item = (&OverrideKey, &[ProfileOverride])> {
        self.keys.iter().map(|key| (key, self.get(key)))
    }

    /// Overrides that apply on the day of `ts`, in index order. Date and
    /// weekday keys are equally eligible.
    #[must_use]
    pub fn applying_on(&self, ts: LocalTimestamp) -> Vec<ProfileOverride> {
        self.iter()
            .filter(|(key, _)| key.applies_on(ts))
            .flat_map(|(_, entries)| entries.iter().cloned())
            .collect()
    }
}
