use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_SLOTS_PER_DAY: i32 = 8;

/// The shape of a user's study week: which weekdays carry revision slots
/// and how many slots each study day has. Weeks always start on Monday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyCalendar {
    rest_days: HashSet<Weekday>,
    slots_per_day: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyCalendarConfig {
    study_days: Vec<Weekday>,
    slots_per_day: i32,
}

impl Default for StudyCalendar {
    fn default() -> Self {
        Self {
            rest_days: HashSet::new(),
            slots_per_day: DEFAULT_SLOTS_PER_DAY,
        }
    }
}

impl StudyCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn custom<I>(study_days: I, slots_per_day: i32) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let config = StudyCalendarConfig::new(study_days, slots_per_day);
        Self::from_config(&config)
    }

    pub fn from_config(config: &StudyCalendarConfig) -> Self {
        let study_set: HashSet<Weekday> = config.study_days.iter().copied().collect();
        let mut rest_days = HashSet::new();
        for day in Self::ALL_WEEKDAYS {
            if !study_set.contains(&day) {
                rest_days.insert(day);
            }
        }

        Self {
            rest_days,
            slots_per_day: config.slots_per_day,
        }
    }

    pub fn to_config(&self) -> StudyCalendarConfig {
        StudyCalendarConfig::from(self)
    }

    pub fn slots_per_day(&self) -> i32 {
        self.slots_per_day
    }

    /// Check if a date carries revision slots
    pub fn is_study_day(&self, date: NaiveDate) -> bool {
        !self.rest_days.contains(&date.weekday())
    }

    /// Check if a slot number is within the per-day grid bounds
    pub fn is_valid_slot_number(&self, slot_number: i32) -> bool {
        slot_number >= 1 && slot_number <= self.slots_per_day
    }

    /// The Monday on or before the given date
    pub fn week_start_monday(date: NaiveDate) -> NaiveDate {
        let offset = date.weekday().num_days_from_monday() as i64;
        date - Duration::days(offset)
    }

    /// The Sunday of the week containing the given date
    pub fn week_end(date: NaiveDate) -> NaiveDate {
        Self::week_start_monday(date) + Duration::days(6)
    }

    /// All study dates in the Monday-start week containing the given date
    pub fn study_dates_in_week(&self, date: NaiveDate) -> Vec<NaiveDate> {
        let start = Self::week_start_monday(date);
        (0..7)
            .map(|offset| start + Duration::days(offset))
            .filter(|day| self.is_study_day(*day))
            .collect()
    }

    /// Every (date, slot number) cell of the weekly grid for the week
    /// containing the given date, in date-then-slot order
    pub fn grid_cells_in_week(&self, date: NaiveDate) -> Vec<(NaiveDate, i32)> {
        let mut cells = Vec::new();
        for day in self.study_dates_in_week(date) {
            for slot in 1..=self.slots_per_day {
                cells.push((day, slot));
            }
        }
        cells
    }

    /// All study dates in a date range (inclusive)
    pub fn study_dates_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if self.is_study_day(current) {
                days.push(current);
            }
            current = current + Duration::days(1);
        }
        days
    }
}

impl StudyCalendarConfig {
    pub fn new<I>(study_days: I, slots_per_day: i32) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut study: Vec<Weekday> = study_days.into_iter().collect();
        if study.is_empty() {
            panic!("StudyCalendarConfig requires at least one study day");
        }
        if slots_per_day < 1 {
            panic!("StudyCalendarConfig requires at least one slot per day");
        }
        study.sort_by_key(|wd| wd.num_days_from_monday());
        study.dedup_by(|a, b| a.num_days_from_monday() == b.num_days_from_monday());

        Self {
            study_days: study,
            slots_per_day,
        }
    }

    pub fn study_days(&self) -> &[Weekday] {
        &self.study_days
    }

    pub fn slots_per_day(&self) -> i32 {
        self.slots_per_day
    }
}

impl Default for StudyCalendarConfig {
    fn default() -> Self {
        StudyCalendarConfig::from(&StudyCalendar::default())
    }
}

impl From<&StudyCalendar> for StudyCalendarConfig {
    fn from(calendar: &StudyCalendar) -> Self {
        let mut study = Vec::new();
        for day in StudyCalendar::ALL_WEEKDAYS {
            if !calendar.rest_days.contains(&day) {
                study.push(day);
            }
        }
        study.sort_by_key(|wd| wd.num_days_from_monday());

        Self {
            study_days: study,
            slots_per_day: calendar.slots_per_day,
        }
    }
}
