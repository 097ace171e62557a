use super::{PersistenceResult, PlannerStore};
use crate::calendar::{StudyCalendar, StudyCalendarConfig};
use crate::metadata::PlannerMetadata;
use crate::planner::Planner;
use crate::subject::Subject;
use crate::timetable::TimetableSlot;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqlitePlannerStore {
    connection: Mutex<Connection>,
}

impl SqlitePlannerStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS planner_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                metadata_json TEXT NOT NULL,
                calendar_json TEXT NOT NULL,
                calendar_is_custom INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY,
                subject_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS timetable (
                id INTEGER PRIMARY KEY,
                slot_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_metadata(&self, tx: &rusqlite::Transaction, planner: &Planner) -> PersistenceResult<()> {
        let metadata_json = serde_json::to_string(planner.metadata())?;
        let calendar_json = serde_json::to_string(&planner.calendar_config())?;
        tx.execute("DELETE FROM planner_metadata", [])?;
        tx.execute(
            "INSERT INTO planner_metadata (id, metadata_json, calendar_json, calendar_is_custom)
             VALUES (1, ?1, ?2, ?3)",
            params![metadata_json, calendar_json, planner.calendar_is_custom()],
        )?;
        Ok(())
    }

    fn save_subjects(
        &self,
        tx: &rusqlite::Transaction,
        subjects: &[Subject],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM subjects", [])?;
        let mut stmt = tx.prepare("INSERT INTO subjects (id, subject_json) VALUES (?1, ?2)")?;
        for subject in subjects {
            let json = serde_json::to_string(subject)?;
            stmt.execute(params![subject.id, json])?;
        }
        Ok(())
    }

    fn save_slots(
        &self,
        tx: &rusqlite::Transaction,
        slots: &[TimetableSlot],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM timetable", [])?;
        let mut stmt = tx.prepare("INSERT INTO timetable (id, slot_json) VALUES (?1, ?2)")?;
        for slot in slots {
            let json = serde_json::to_string(slot)?;
            stmt.execute(params![slot.id, json])?;
        }
        Ok(())
    }
}

impl PlannerStore for SqlitePlannerStore {
    fn save_planner(&self, planner: &Planner) -> PersistenceResult<()> {
        let subjects = planner.subjects()?;
        let slots = planner.slots()?;
        super::validate_records(&subjects, &slots, planner.calendar())?;

        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_metadata(&tx, planner)?;
        self.save_subjects(&tx, &subjects)?;
        self.save_slots(&tx, &slots)?;
        tx.commit()?;
        Ok(())
    }

    fn load_planner(&self) -> PersistenceResult<Option<Planner>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare(
            "SELECT metadata_json, calendar_json, calendar_is_custom
             FROM planner_metadata WHERE id = 1",
        )?;
        let header: Option<(String, String, bool)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .optional()?;

        let Some((metadata_json, calendar_json, calendar_is_custom)) = header else {
            return Ok(None);
        };

        let metadata: PlannerMetadata = serde_json::from_str(&metadata_json)?;
        let calendar_config: StudyCalendarConfig = serde_json::from_str(&calendar_json)?;
        let calendar = StudyCalendar::from_config(&calendar_config);

        let mut stmt = conn.prepare("SELECT subject_json FROM subjects ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut subjects = Vec::new();
        for json in rows {
            let subject: Subject = serde_json::from_str(&json?)?;
            subjects.push(subject);
        }

        let mut stmt = conn.prepare("SELECT slot_json FROM timetable ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut slots = Vec::new();
        for json in rows {
            let slot: TimetableSlot = serde_json::from_str(&json?)?;
            slots.push(slot);
        }

        super::validate_records(&subjects, &slots, &calendar)?;

        let mut planner = Planner::from_parts(metadata, calendar, calendar_is_custom);
        for subject in subjects {
            planner.upsert_subject_record(subject)?;
        }
        for slot in slots {
            planner.upsert_slot_record(slot)?;
        }

        Ok(Some(planner))
    }
}
