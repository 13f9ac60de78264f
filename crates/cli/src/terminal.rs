use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use timekeeper_core::{
    ChildRecord, Country, ExecutionOutcome, ExecutionRecord, InstanceStatus, ParentKind,
    ParentRecord, Region,
};
use timekeeper_engine::{CountState, ExecutionStats, InstancePager};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const ACTIVE: Color = Color::Green;
    const SUSPENDED: Color = Color::Yellow;
    const FAILED: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
    const PROMPT: Color = Color::Cyan;
}

/// Renders listings and prompts on stdout.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    fn header(&self, title: &str, columns: String) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{title}\n")),
            SetForegroundColor(Colors::DIM),
            Print(format!("{columns}\n")),
            Print(format!("{}\n", "-".repeat(columns.len().max(40)))),
            ResetColor,
        )?;
        Ok(())
    }

    fn colored_line(&self, color: Option<Color>, line: String) -> Result<()> {
        let mut stdout = io::stdout();
        match color {
            Some(color) => execute!(
                stdout,
                SetForegroundColor(color),
                Print(format!("{line}\n")),
                ResetColor
            )?,
            None => execute!(stdout, Print(format!("{line}\n")))?,
        }
        Ok(())
    }

    pub fn print_parents(&self, kind: ParentKind, rows: &[ParentRecord]) -> Result<()> {
        if rows.is_empty() {
            return self.print_info(&format!("No {}s found.", kind.label()));
        }
        self.header(
            &format!("{}s ({})", capitalize(kind.label()), rows.len()),
            format!("{:<38} {:<32} {:<10} {:<18} {:<10}", "ID", "NAME", "STATUS", "SCHEDULE", "ZONE"),
        )?;
        for row in rows {
            let schedule = row
                .cron_expression
                .as_deref()
                .or(row.trigger_time.as_deref())
                .unwrap_or("-");
            let color = if row.suspended {
                Colors::SUSPENDED
            } else {
                Colors::ACTIVE
            };
            self.colored_line(
                Some(color),
                format!(
                    "{:<38} {:<32} {:<10} {:<18} {:<10}",
                    row.id,
                    truncate(&row.name, 30),
                    row.status_label(),
                    truncate(schedule, 18),
                    row.zone_id
                ),
            )?;
        }
        io::stdout().flush()?;
        Ok(())
    }

    pub fn print_instances(&self, pager: &InstancePager<'_>) -> Result<()> {
        let rows: &[ChildRecord] = pager.rows();
        let total = match pager.state() {
            CountState::Known { exact: true } => format!("{}", pager.total_items()),
            CountState::Known { exact: false } => format!("~{}+", pager.total_items()),
            CountState::Unknown | CountState::Probed => "?".to_string(),
        };
        self.header(
            &format!(
                "Instances: page {} of {} ({} items, {} per page)",
                pager.current_page() + 1,
                pager.total_pages().max(1),
                total,
                pager.page_size()
            ),
            format!(
                "{:<38} {:<38} {:<10} {:<8} {:<25}",
                "ID", "TEMPLATE", "STATUS", "COUNTRY", "LAST SUCCESS"
            ),
        )?;
        for row in rows {
            let color = match row.status {
                InstanceStatus::Active => Some(Colors::ACTIVE),
                InstanceStatus::Suspended => Some(Colors::SUSPENDED),
                InstanceStatus::Unknown => None,
            };
            let last_success = row
                .last_success_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            self.colored_line(
                color,
                format!(
                    "{:<38} {:<38} {:<10} {:<8} {:<25}",
                    row.id,
                    row.parent_id,
                    row.status.to_string(),
                    row.country.as_deref().unwrap_or("-"),
                    last_success
                ),
            )?;
        }
        io::stdout().flush()?;
        Ok(())
    }

    pub fn print_executions(&self, records: &[&ExecutionRecord], stats: &ExecutionStats) -> Result<()> {
        self.header(
            &format!("Executions ({})", records.len()),
            format!(
                "{:<38} {:<38} {:<20} {:<9} {:<10} {:<10}",
                "ID", "INSTANCE", "SCHEDULED FOR", "OUTCOME", "TRIGGER", "DURATION"
            ),
        )?;
        for record in records {
            let color = match record.outcome {
                Some(ExecutionOutcome::Failed) => Some(Colors::FAILED),
                None => Some(Colors::DIM),
                _ => None,
            };
            let outcome = record
                .outcome
                .map(|o| o.to_string())
                .unwrap_or_else(|| "-".to_string());
            self.colored_line(
                color,
                format!(
                    "{:<38} {:<38} {:<20} {:<9} {:<10} {:<10}",
                    record.id,
                    record.parent_id,
                    record.scheduled_for.format("%Y-%m-%d %H:%M:%S").to_string(),
                    outcome,
                    record.trigger_type.to_string(),
                    record.duration_label()
                ),
            )?;
            if let Some(message) = &record.error_message {
                self.colored_line(Some(Colors::FAILED), format!("    {}", truncate(message, 120)))?;
            }
        }

        let mut summary: Vec<String> = stats
            .outcomes()
            .into_iter()
            .map(|o| format!("{o}: {}", stats.count(o)))
            .collect();
        if stats.in_progress > 0 {
            summary.push(format!("in progress: {}", stats.in_progress));
        }
        if !summary.is_empty() {
            self.print_info(&summary.join(" | "))?;
        }
        Ok(())
    }

    pub fn print_regions(&self, regions: &[Region]) -> Result<()> {
        self.header("Regions", format!("{:<10} {:<30}", "CODE", "NAME"))?;
        for region in regions {
            self.colored_line(
                None,
                format!("{:<10} {:<30}", region.code, region.name.as_deref().unwrap_or("-")),
            )?;
        }
        Ok(())
    }

    pub fn print_countries(&self, countries: &[Country]) -> Result<()> {
        self.header("Countries", format!("{:<6} {:<30} {:<10}", "CODE", "NAME", "REGION"))?;
        for country in countries {
            self.colored_line(
                None,
                format!(
                    "{:<6} {:<30} {:<10}",
                    country.code,
                    country.name.as_deref().unwrap_or("-"),
                    country.region.as_deref().unwrap_or("-")
                ),
            )?;
        }
        Ok(())
    }

    /// Ask a yes/no question; only an explicit yes confirms.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::PROMPT),
            Print(format!("{question} [y/N] ")),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let answer = input.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        self.colored_line(Some(Colors::DIM), msg.to_string())?;
        io::stdout().flush()?;
        Ok(())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
