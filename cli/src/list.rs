use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use timetable_core::{Class, Config, DAY_LABELS};

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Present")]
    present: usize,
    #[tabled(rename = "Absent")]
    absent: usize,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn show_classes(mut classes: Vec<Class>, config: &Config) {
    if classes.is_empty() {
        println!("No classes registered.");
        return;
    }

    // Grid order: by period, then by day.
    classes.sort_by_key(|c| (c.period, c.day));

    let rows: Vec<ClassRow> = classes
        .into_iter()
        .map(|class| {
            let counts = class.counts();
            ClassRow {
                day: DAY_LABELS.get(class.day as usize).copied().unwrap_or("?").to_string(),
                period: format!("{} ({})", class.period, config.period_label(class.period)),
                name: class.name,
                present: counts.present,
                absent: counts.absent,
                id: class.id,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN)); // Header color

    println!("{}", table);
}
