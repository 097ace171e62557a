use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use revision_tool::{
    BatchDecision, Decision, Difficulty, GridEdit, Planner, SlotStatus, StudyCalendar, Subject,
    build_dashboard, load_planner_from_csv, load_planner_from_json, rank, save_planner_to_csv,
    save_planner_to_json,
};
#[cfg(feature = "sqlite")]
use revision_tool::{PlannerStore, SqlitePlannerStore};
use std::io::{self, Write};
use std::str::FromStr;

const DEFAULT_USER_ID: i32 = 1;

fn render_df_as_text_table(df: &DataFrame) -> String {
    // Compute column widths
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                let s = render_any_value(av);
                if s.len() > widths[ci] {
                    widths[ci] = s.len();
                }
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    // Build output
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    // Header
    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    // Rows
    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = match col.get(row_idx) {
                Ok(ref av) => render_any_value(av),
                Err(_) => String::new(),
            };
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_any_value(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn parse_cli_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show subjects                      Show the subject table\n  show grid                          Show the timetable grid\n  subject <id> <name> <difficulty> [YYYY-MM-DD]\n                                     Upsert a subject (difficulty: easy|medium|hard)\n  exam <id> <YYYY-MM-DD|clear>       Set or clear a subject's exam date\n  delete <id>                        Delete a subject (refused while scheduled)\n  week <YYYY-MM-DD>                  Create this week's empty grid slots\n  assign <slot_id> <subject_id|->    Assign a subject to a slot (or clear it)\n  status <slot_id> <completed|incomplete|->\n                                     Mark a slot's completion\n  grid <slot_id>=<subject_id|-> ...  Save a batch of assignments atomically\n  rank [YYYY-MM-DD]                  Rank all subjects by revision priority\n  dashboard [YYYY-MM-DD]             Weekly dashboard for the given 'today'\n  meta dates <start> <end>           Set the planner horizon\n  meta owner <name...>               Set the planner owner\n  save <json|csv> <path>             Save the planner to a file\n  load <json|csv> <path>             Load the planner from a file\n  db save <path>                     Save the planner to sqlite\n  db load <path>                     Load the planner from sqlite\n  quit|exit                          Exit"
    );
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn print_dashboard(planner: &Planner, today: NaiveDate) {
    match build_dashboard(planner, today, None) {
        Ok(view) => {
            println!("Week {} .. {} (today {})", view.week_start, view.week_end, today);
            println!("Top priorities:");
            if view.top_priorities.is_empty() {
                println!("  (none)");
            }
            for (pos, subject) in view.top_priorities.iter().enumerate() {
                let exam = subject
                    .exam_date
                    .map(|d| format!("exam {d}"))
                    .unwrap_or_else(|| "no exam date".to_string());
                println!(
                    "  {}. {} ({}, {})",
                    pos + 1,
                    subject.name,
                    subject.difficulty,
                    exam
                );
            }
            println!("Exams in the next 7 days:");
            if view.exams_next_7_days.is_empty() {
                println!("  (none)");
            }
            for subject in &view.exams_next_7_days {
                if let Some(exam) = subject.exam_date {
                    println!("  {} on {}", subject.name, exam);
                }
            }
            println!("Completion this week:");
            if view.completion_by_subject.is_empty() {
                println!("  (nothing scheduled)");
            }
            for row in &view.completion_by_subject {
                println!(
                    "  {}: {}/{} completed ({}%), {} incomplete",
                    row.subject_name,
                    row.completed_slots,
                    row.scheduled_slots,
                    row.completion_percent(),
                    row.incomplete_slots
                );
            }
        }
        Err(e) => println!("Dashboard error: {}", e),
    }
}

fn parse_grid_edit(token: &str) -> Option<GridEdit> {
    // <slot_id>=<subject_id|->[:<status|->]
    let (slot_part, rest) = token.split_once('=')?;
    let slot_id: i32 = slot_part.trim().parse().ok()?;
    let (subject_part, status_part) = match rest.split_once(':') {
        Some((s, st)) => (s, Some(st)),
        None => (rest, None),
    };
    let subject_id = match subject_part.trim() {
        "-" => None,
        raw => Some(raw.parse::<i32>().ok()?),
    };
    let status = match status_part.map(str::trim) {
        None | Some("-") | Some("") => None,
        Some(raw) => Some(SlotStatus::from_str(raw).ok()?),
    };
    Some(GridEdit {
        slot_id,
        subject_id,
        status,
    })
}

fn main() {
    let mut planner = Planner::new();

    println!("Revision Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() {
            break;
        }
        if line.is_empty() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "show" => match parts.next() {
                Some("subjects") => {
                    println!("{}", render_df_as_text_table(planner.subjects_dataframe()));
                }
                Some("grid") => {
                    println!("{}", render_df_as_text_table(planner.timetable_dataframe()));
                }
                _ => println!("Usage: show <subjects|grid>"),
            },
            "subject" => {
                let id_s = parts.next();
                let name_s = parts.next();
                let difficulty_s = parts.next();
                let exam_s = parts.next();
                match (id_s, name_s, difficulty_s) {
                    (Some(id_s), Some(name), Some(difficulty_s)) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let difficulty = match Difficulty::from_str(difficulty_s) {
                            Ok(d) => d,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        let mut subject = Subject::new(id, DEFAULT_USER_ID, name, difficulty);
                        if let Some(exam_s) = exam_s {
                            match parse_cli_date(exam_s) {
                                Some(d) => subject.exam_date = Some(d),
                                None => {
                                    println!("Invalid date (YYYY-MM-DD)");
                                    continue;
                                }
                            }
                        }
                        match planner.upsert_subject(subject) {
                            Ok(Decision::Accepted) => {
                                println!("Subject upserted.");
                                println!("{}", render_df_as_text_table(planner.subjects_dataframe()));
                            }
                            Ok(Decision::Rejected(reason)) => println!("Rejected: {}", reason),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: subject <id> <name> <difficulty> [YYYY-MM-DD]"),
                }
            }
            "exam" => {
                let id_s = parts.next();
                let date_s = parts.next();
                match (id_s, date_s) {
                    (Some(id_s), Some(date_s)) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let new_date = if date_s.eq_ignore_ascii_case("clear") {
                            None
                        } else {
                            match parse_cli_date(date_s) {
                                Some(d) => Some(d),
                                None => {
                                    println!("Invalid date (YYYY-MM-DD)");
                                    continue;
                                }
                            }
                        };
                        match planner.set_exam_date(id, new_date) {
                            Ok(Decision::Accepted) => println!("Exam date updated."),
                            Ok(Decision::Rejected(reason)) => println!("Rejected: {}", reason),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: exam <id> <YYYY-MM-DD|clear>"),
                }
            }
            "delete" => {
                let id_s = parts.next();
                match id_s.and_then(|s| s.parse::<i32>().ok()) {
                    Some(id) => match planner.delete_subject(id) {
                        Ok(Decision::Accepted) => println!("Deleted subject {}.", id),
                        Ok(Decision::Rejected(reason)) => println!("Rejected: {}", reason),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: delete <id>"),
                }
            }
            "week" => {
                let date_s = parts.next();
                match date_s.and_then(parse_cli_date) {
                    Some(date) => match planner.ensure_week_slots(date, DEFAULT_USER_ID) {
                        Ok(created) => println!(
                            "Week of {} ready ({} slots created).",
                            StudyCalendar::week_start_monday(date),
                            created
                        ),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: week <YYYY-MM-DD>"),
                }
            }
            "assign" => {
                let slot_s = parts.next();
                let subject_s = parts.next();
                match (slot_s, subject_s) {
                    (Some(slot_s), Some(subject_s)) => {
                        let slot_id: i32 = match slot_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid slot id");
                                continue;
                            }
                        };
                        let subject_id = if subject_s == "-" {
                            None
                        } else {
                            match subject_s.parse::<i32>() {
                                Ok(v) => Some(v),
                                Err(_) => {
                                    println!("Invalid subject id");
                                    continue;
                                }
                            }
                        };
                        match planner.assign_slot(slot_id, subject_id) {
                            Ok(Decision::Accepted) => println!("Slot {} updated.", slot_id),
                            Ok(Decision::Rejected(reason)) => println!("Rejected: {}", reason),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: assign <slot_id> <subject_id|->"),
                }
            }
            "status" => {
                let slot_s = parts.next();
                let status_s = parts.next();
                match (slot_s, status_s) {
                    (Some(slot_s), Some(status_s)) => {
                        let slot_id: i32 = match slot_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid slot id");
                                continue;
                            }
                        };
                        let status = if status_s == "-" {
                            None
                        } else {
                            match SlotStatus::from_str(status_s) {
                                Ok(s) => Some(s),
                                Err(e) => {
                                    println!("{}", e);
                                    continue;
                                }
                            }
                        };
                        match planner.set_slot_status(slot_id, status) {
                            Ok(_) => println!("Slot {} status updated.", slot_id),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: status <slot_id> <completed|incomplete|->"),
                }
            }
            "grid" => {
                let mut edits = Vec::new();
                let mut bad_token = false;
                for token in parts.by_ref() {
                    match parse_grid_edit(token) {
                        Some(edit) => edits.push(edit),
                        None => {
                            println!("Invalid edit '{}'", token);
                            bad_token = true;
                            break;
                        }
                    }
                }
                if bad_token {
                    continue;
                }
                if edits.is_empty() {
                    println!("Usage: grid <slot_id>=<subject_id|->[:<status>] ...");
                    continue;
                }
                match planner.save_grid(&edits) {
                    Ok(BatchDecision::Accepted) => println!("Grid saved ({} edits).", edits.len()),
                    Ok(BatchDecision::Rejected(rejected)) => {
                        println!("Grid not saved; {} edit(s) rejected:", rejected.len());
                        for edit in rejected {
                            println!("  slot {}: {}", edit.slot_id, edit.reason);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "rank" => {
                let today = today_or(parts.next().and_then(parse_cli_date));
                match planner.subjects() {
                    Ok(subjects) => {
                        for (pos, subject) in rank(&subjects, today).iter().enumerate() {
                            let exam = subject
                                .exam_date
                                .map(|d| format!("exam {d}"))
                                .unwrap_or_else(|| "no exam date".to_string());
                            println!(
                                "{}. {} ({}, {})",
                                pos + 1,
                                subject.name,
                                subject.difficulty,
                                exam
                            );
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "dashboard" => {
                let today = today_or(parts.next().and_then(parse_cli_date));
                print_dashboard(&planner, today);
            }
            "meta" => match parts.next() {
                Some("dates") => {
                    let start_s = parts.next().and_then(parse_cli_date);
                    let end_s = parts.next().and_then(parse_cli_date);
                    match (start_s, end_s) {
                        (Some(start), Some(end)) => {
                            let mut metadata = planner.metadata().clone();
                            metadata.horizon_start_date = start;
                            metadata.horizon_end_date = end;
                            match planner.set_metadata(metadata) {
                                Ok(_) => println!("Horizon updated."),
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: meta dates <YYYY-MM-DD> <YYYY-MM-DD>"),
                    }
                }
                Some("owner") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: meta owner <name...>");
                        continue;
                    }
                    let mut metadata = planner.metadata().clone();
                    metadata.owner_name = rest.join(" ");
                    match planner.set_metadata(metadata) {
                        Ok(_) => println!("Owner updated."),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: meta <dates|owner> ..."),
            },
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_planner_to_json(&planner, path) {
                        Ok(_) => println!("Planner saved to {}.", path),
                        Err(e) => println!("Error saving planner: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_planner_to_csv(&planner, path) {
                        Ok(_) => println!("Planner saved to {}.", path),
                        Err(e) => println!("Error saving planner: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_planner_from_json(path) {
                        Ok(loaded) => {
                            planner = loaded;
                            println!("Planner loaded from {}.", path);
                        }
                        Err(e) => println!("Error loading planner: {}", e),
                    },
                    (Some("csv"), Some(path)) => match load_planner_from_csv(path) {
                        Ok(loaded) => {
                            planner = loaded;
                            println!("Planner loaded from {}.", path);
                        }
                        Err(e) => println!("Error loading planner: {}", e),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            #[cfg(feature = "sqlite")]
            "db" => {
                let action = parts.next();
                let path = parts.next();
                match (action, path) {
                    (Some("save"), Some(path)) => match SqlitePlannerStore::new(path)
                        .and_then(|store| store.save_planner(&planner))
                    {
                        Ok(_) => println!("Planner saved to {}.", path),
                        Err(e) => println!("Error saving planner: {}", e),
                    },
                    (Some("load"), Some(path)) => match SqlitePlannerStore::new(path)
                        .and_then(|store| store.load_planner())
                    {
                        Ok(Some(loaded)) => {
                            planner = loaded;
                            println!("Planner loaded from {}.", path);
                        }
                        Ok(None) => println!("No planner stored at {}.", path),
                        Err(e) => println!("Error loading planner: {}", e),
                    },
                    _ => println!("Usage: db <save|load> <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
