use std::fmt::Write;

use dashboard_core::{GroupView, PageViewModel, Phase, Record, Target};

/// Fields shown per row, in order; absent fields are skipped.
fn row_fields(target: Target) -> &'static [&'static str] {
    match target {
        Target::UnassignedEvents => &["summary", "start", "location", "missingRole"],
        Target::AssignedEvents => &["summary", "start", "location", "artist"],
        Target::EventHistory => &["summary", "start", "location", "status"],
        Target::Emails => &["subject", "from", "date", "status"],
        Target::Messages => &["body", "from", "date", "status"],
        Target::Artists => &["Name", "E-Mail", "role", "Phone"],
        Target::Logs => &["timestamp", "level", "message"],
    }
}

pub fn render_page(view: &PageViewModel, only_group: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} | {} | {} von {} Einträgen ==",
        view.target,
        phase_label(view.phase),
        view.matching_records,
        view.total_records
    );
    if !view.search.is_empty() {
        let _ = writeln!(out, "Suche: {:?}", view.search);
    }
    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "! {banner}");
    }

    let groups = view
        .groups
        .iter()
        .filter(|group| only_group.is_none_or(|key| group.key == key));
    for group in groups {
        out.push('\n');
        render_group(&mut out, view.target, group);
    }
    out
}

pub fn render_progress(percent: u8) -> String {
    const WIDTH: usize = 25;
    let filled = usize::from(percent.min(100)) * WIDTH / 100;
    format!(
        "Lade Daten [{}{}] {percent}%",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled)
    )
}

fn render_group(out: &mut String, target: Target, group: &GroupView) {
    let _ = write!(out, "[{}] {} Einträge", group.key, group.total);
    if group.page_count > 1 {
        let _ = write!(out, ", Seite {}/{}", group.page, group.page_count);
    }
    if !group.badges.is_empty() {
        let badges: Vec<String> = group
            .badges
            .iter()
            .map(|(value, count)| format!("{value}: {count}"))
            .collect();
        let _ = write!(out, " ({})", badges.join(", "));
    }
    out.push('\n');

    if group.rows.is_empty() {
        out.push_str("  (keine Einträge)\n");
    }
    for row in &group.rows {
        let _ = writeln!(out, "  - {}", format_row(target, row));
    }
}

fn format_row(target: Target, row: &Record) -> String {
    let parts: Vec<String> = row_fields(target)
        .iter()
        .filter_map(|field| row.key(field))
        .collect();
    if parts.is_empty() {
        "(ohne Angaben)".to_string()
    } else {
        parts.join(" | ")
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "nicht geladen",
        Phase::Loading => "lädt",
        Phase::Loaded => "geladen",
        Phase::LoadingTimeout => "unvollständig",
        Phase::Error => "Fehler",
    }
}
