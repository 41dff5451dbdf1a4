//! Completion history and stamps

use chrono::{DateTime, Local, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::exercises::{Difficulty, Exercise};
use crate::profile::DogProfile;

/// Stamps needed for the badge
pub const BADGE_THRESHOLD: u32 = 5;

/// One completed session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: Option<i64>,
    pub profile_id: i64,
    pub exercise_name: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub is_custom: bool,
    pub difficulty: Difficulty,
    pub dog_name: String,
    pub equipment_used: Vec<String>,
    pub benefits: Vec<String>,
}

impl HistoryEntry {
    /// Entry written when a session completes. `None` if the profile was never saved.
    pub fn from_completion(exercise: &Exercise, profile: &DogProfile, date: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            id: None,
            profile_id: profile.id?,
            exercise_name: exercise.name.clone(),
            date,
            duration_minutes: exercise.duration_minutes,
            is_custom: exercise.is_custom,
            difficulty: exercise.difficulty,
            dog_name: profile.name.clone(),
            equipment_used: exercise.equipment.clone(),
            benefits: exercise.benefits.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    /// Last 7 days
    Week,
    /// Last calendar month
    Month,
}

impl std::str::FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DateFilter::All),
            "today" => Ok(DateFilter::Today),
            "week" => Ok(DateFilter::Week),
            "month" => Ok(DateFilter::Month),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

impl DateFilter {
    fn matches(&self, date: DateTime<Utc>, now: DateTime<Local>) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::Today => date.with_timezone(&Local).date_naive() == now.date_naive(),
            DateFilter::Week => date >= (now - chrono::Duration::days(7)).with_timezone(&Utc),
            DateFilter::Month => match now.checked_sub_months(Months::new(1)) {
                Some(month_ago) => date >= month_ago.with_timezone(&Utc),
                None => true,
            },
        }
    }
}

/// Entries matching both filters, order preserved
pub fn filter_history<'a>(
    entries: &'a [HistoryEntry],
    period: DateFilter,
    difficulty: Option<Difficulty>,
    now: DateTime<Local>,
) -> Vec<&'a HistoryEntry> {
    entries
        .iter()
        .filter(|e| period.matches(e.date, now))
        .filter(|e| difficulty.is_none_or(|d| e.difficulty == d))
        .collect()
}

/// Total minutes across entries
pub fn total_minutes(entries: &[&HistoryEntry]) -> u32 {
    entries.iter().map(|e| e.duration_minutes).sum()
}

/// Stamp counter shown after each completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampCard {
    pub count: u32,
}

impl StampCard {
    pub fn new(count: u32) -> Self {
        Self { count }
    }

    pub fn has_badge(&self) -> bool {
        self.count >= BADGE_THRESHOLD
    }

    /// Stamps still missing for the badge
    pub fn remaining_for_badge(&self) -> u32 {
        BADGE_THRESHOLD.saturating_sub(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::Step;

    fn create_entry(name: &str, difficulty: Difficulty, days_ago: i64) -> HistoryEntry {
        HistoryEntry {
            id: None,
            profile_id: 1,
            exercise_name: name.to_string(),
            date: Utc::now() - chrono::Duration::days(days_ago),
            duration_minutes: 10,
            is_custom: false,
            difficulty,
            dog_name: "Rex".to_string(),
            equipment_used: vec![],
            benefits: vec![],
        }
    }

    fn names(entries: &[&HistoryEntry]) -> Vec<String> {
        entries.iter().map(|e| e.exercise_name.clone()).collect()
    }

    #[test]
    fn test_from_completion() {
        let exercise = Exercise {
            id: "1".to_string(),
            name: "Tug of War".to_string(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            duration_minutes: 15,
            equipment: vec!["rope toy".to_string()],
            steps: vec![Step::new("pull", 60)],
            warmup_steps: vec![],
            cooldown_steps: vec![],
            benefits: vec!["bonding".to_string()],
            contact: None,
            is_custom: true,
            image_url: None,
        };
        let profile = DogProfile { id: Some(7), name: "Rex".to_string(), ..Default::default() };
        let now = Utc::now();

        let entry = HistoryEntry::from_completion(&exercise, &profile, now).unwrap();
        assert_eq!(entry.profile_id, 7);
        assert_eq!(entry.exercise_name, "Tug of War");
        assert_eq!(entry.duration_minutes, 15);
        assert!(entry.is_custom);
        assert_eq!(entry.equipment_used, vec!["rope toy".to_string()]);
        assert_eq!(entry.date, now);

        let unsaved = DogProfile::default();
        assert!(HistoryEntry::from_completion(&exercise, &unsaved, now).is_none());
    }

    #[test]
    fn test_filter_all() {
        let entries = vec![
            create_entry("a", Difficulty::Easy, 0),
            create_entry("b", Difficulty::Hard, 40),
        ];
        assert_eq!(filter_history(&entries, DateFilter::All, None, Local::now()).len(), 2);
    }

    #[test]
    fn test_filter_week() {
        let entries = vec![
            create_entry("recent", Difficulty::Easy, 2),
            create_entry("old", Difficulty::Easy, 10),
        ];
        let filtered = filter_history(&entries, DateFilter::Week, None, Local::now());
        assert_eq!(names(&filtered), vec!["recent"]);
    }

    #[test]
    fn test_filter_month() {
        let entries = vec![
            create_entry("recent", Difficulty::Easy, 10),
            create_entry("old", Difficulty::Easy, 40),
        ];
        let filtered = filter_history(&entries, DateFilter::Month, None, Local::now());
        assert_eq!(names(&filtered), vec!["recent"]);
    }

    #[test]
    fn test_filter_today() {
        let entries = vec![
            create_entry("now", Difficulty::Easy, 0),
            create_entry("yesterday", Difficulty::Easy, 2),
        ];
        let filtered = filter_history(&entries, DateFilter::Today, None, Local::now());
        assert_eq!(names(&filtered), vec!["now"]);
    }

    #[test]
    fn test_filter_difficulty() {
        let entries = vec![
            create_entry("easy", Difficulty::Easy, 0),
            create_entry("hard", Difficulty::Hard, 0),
        ];
        let filtered = filter_history(&entries, DateFilter::All, Some(Difficulty::Hard), Local::now());
        assert_eq!(names(&filtered), vec!["hard"]);
        assert_eq!(total_minutes(&filtered), 10);
    }

    #[test]
    fn test_stamp_badge_threshold() {
        assert!(!StampCard::new(4).has_badge());
        assert!(StampCard::new(5).has_badge());
        assert_eq!(StampCard::new(3).remaining_for_badge(), 2);
        assert_eq!(StampCard::new(9).remaining_for_badge(), 0);
    }

    #[test]
    fn test_date_filter_from_str() {
        assert_eq!("Week".parse::<DateFilter>(), Ok(DateFilter::Week));
        assert!("year".parse::<DateFilter>().is_err());
    }
}
