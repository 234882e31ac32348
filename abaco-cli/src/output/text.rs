//! Text output formatting with colors.

use std::path::Path;

use abaco_core::{
    Category, CategoryEntry, CategoryStatus, CategorySummary, CycleOutcome, Money, Record,
    RecordView, Snapshot, Transaction,
};
use abaco_fetch::ProbeResult;
use abaco_store::Settings;
use chrono::{DateTime, Local, Utc};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// Formats a snapshot, optionally limited to one category.
    pub fn format_snapshot(&self, snapshot: &Snapshot, only: Option<Category>) -> String {
        let mut lines = Vec::new();

        let fetched = snapshot
            .fetched_at()
            .map_or_else(|| "never".to_string(), |at| self.format_time(at));
        lines.push(format!(
            "{} #{} - fetched {} ({})",
            self.bold("Abaco snapshot"),
            snapshot.revision(),
            fetched,
            self.format_outcome(snapshot.outcome())
        ));
        lines.push("─".repeat(60));

        for (category, entry) in snapshot.entries() {
            if only.is_some_and(|c| c != category) {
                continue;
            }
            lines.push(String::new());
            lines.push(self.format_entry(category, entry));
        }

        lines.join("\n")
    }

    /// Formats one category: header with status, then its records.
    pub fn format_entry(&self, category: Category, entry: &CategoryEntry) -> String {
        let mut lines = vec![format!(
            "{} [{}]",
            self.bold(category.display_name()),
            self.status_badge(&entry.status)
        )];

        if let (Some(at), false) = (entry.last_success, entry.status.is_ok()) {
            lines.push(format!("  {}", self.dim(&format!("last good data {}", self.format_time(at)))));
        }

        let Some(data) = entry.data.as_deref() else {
            lines.push(format!("  {}", self.dim("unavailable")));
            return lines.join("\n");
        };

        if data.is_empty() {
            lines.push(format!("  {}", self.dim("no records")));
        }
        for record in &data.records {
            lines.push(self.format_record_line(record));
        }
        if let Some(summary) = &data.summary {
            lines.extend(self.format_summary(summary));
        }
        if !data.rejected.is_empty() {
            lines.push(format!(
                "  {}",
                self.yellow(&format!("{} record(s) could not be read", data.rejected.len()))
            ));
        }

        lines.join("\n")
    }

    /// One record as an aligned line.
    pub fn format_record_line(&self, record: &Record) -> String {
        let amount = record
            .primary_amount()
            .map(|m| self.format_money(m))
            .unwrap_or_default();
        format!(
            "  {:<10} {:<32} {:>20}",
            record.id().as_str(),
            truncate(record.label(), 32),
            amount
        )
    }

    fn format_summary(&self, summary: &CategorySummary) -> Vec<String> {
        let mut lines = Vec::new();
        let mut push = |label: &str, value: String| {
            lines.push(format!("  {} {}", self.dim(&format!("{label}:")), value));
        };
        match summary {
            CategorySummary::Accounts(s) => {
                if let Some(total) = &s.total_balance {
                    push("total balance", self.format_money(total));
                }
                if let Some(count) = s.total_accounts.or(s.account_count) {
                    push("accounts", count.to_string());
                }
            }
            CategorySummary::Cards(s) => {
                if let Some(used) = &s.total_used {
                    push("total used", self.format_money(used));
                }
                if let Some(limit) = &s.total_limit {
                    push("total limit", self.format_money(limit));
                }
                if let Some(available) = &s.total_available {
                    push("available", self.format_money(available));
                }
            }
        }
        lines
    }

    /// Every field of one record.
    pub fn format_record_detail(&self, view: &RecordView<'_>) -> String {
        let record = view.record;
        let mut lines = vec![format!(
            "{} {} [{}]",
            self.bold(record.label()),
            self.dim(&record.entity_key()),
            self.status_badge(view.status)
        )];
        let mut field = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                lines.push(format!("  {:<18} {}", format!("{name}:"), value));
            }
        };
        let money = |m: &Money| Some(self.format_money(m));

        match record {
            Record::Profile(p) => {
                field("name", p.name.clone());
                field("email", p.email.clone());
                field("currency", Some(p.default_currency.to_string()));
            }
            Record::Account(a) => {
                field("name", Some(a.name.clone()));
                field("type", a.account_type.clone());
                field("institution", a.institution.clone());
                field("balance", money(&a.balance));
            }
            Record::Card(c) => {
                field("brand", c.brand.clone());
                field("current balance", money(&c.current_balance));
                field("limit", money(&c.limit));
                field("available", money(&c.available));
                field("closing day", c.closing_day.map(|d| d.to_string()));
                field("due day", c.due_day.map(|d| d.to_string()));
            }
            Record::Investment(i) => {
                field("type", i.investment_type.clone());
                field("current value", money(&i.current_value));
                field("invested", money(&i.invested_amount));
            }
            Record::NetWorthSummary(n) => {
                field("total", money(&n.total_value));
                field("assets", money(&n.total_assets));
                field("liabilities", money(&n.total_liabilities));
                field("items", n.item_count.map(|c| c.to_string()));
            }
            Record::NetWorthItem(n) => {
                field("type", n.item_type.clone());
                field("category", n.item_category.clone());
                field("current value", money(&n.current_value));
                field("acquired for", money(&n.acquisition_value));
            }
            Record::Asset(a) => {
                field("type", a.asset_type.clone());
                field("icon", a.icon.clone());
                field("quantity", a.quantity.map(|q| q.normalize().to_string()));
                field("current value", money(&a.current_value));
            }
            Record::Transaction(t) => {
                field("amount", money(&t.amount));
                field("kind", Some(t.kind.as_str().to_string()));
                field("date", t.date.map(|d| d.to_string()));
                field("category", t.category.clone());
                field("account", t.account_id.as_ref().map(ToString::to_string));
            }
        }
        if let Some(at) = view.last_success {
            field("updated", Some(self.format_time(at)));
        }

        lines.join("\n")
    }

    // ========================================================================
    // Other commands
    // ========================================================================

    /// Formats a probe result.
    pub fn format_probe(&self, result: &ProbeResult) -> String {
        match &result.outcome {
            Ok(()) => format!(
                "{} API reachable, token accepted ({} ms)",
                self.green("✓"),
                result.response_time_ms()
            ),
            Err(e) => format!("{} {} error: {}", self.red("✗"), e.kind(), e),
        }
    }

    /// Formats a created transaction.
    pub fn format_transaction(&self, tx: &Transaction) -> String {
        format!(
            "{} transaction {}: {} {} ({})",
            self.green("Created"),
            tx.id,
            tx.description,
            self.format_money(&tx.amount),
            tx.kind.as_str()
        )
    }

    /// Formats settings for `config show`.
    pub fn format_settings(&self, settings: &Settings, path: &Path) -> String {
        let mut lines = vec![
            self.bold("Abaco Configuration"),
            "─".repeat(40),
            format!("Settings file:      {}", path.display()),
            String::new(),
            format!("Base URL:           {}", settings.base_url),
            format!("Refresh interval:   {}s", settings.refresh_interval().as_secs()),
            format!("Request timeout:    {}s", settings.request_timeout_secs),
            format!("Cycle deadline:     {}s", settings.cycle_deadline_secs),
            format!(
                "Retries:            {} (backoff {}ms..{}ms)",
                settings.max_retries, settings.retry_base_delay_ms, settings.retry_max_delay_ms
            ),
            format!("Max concurrency:    {}", settings.max_concurrency),
            format!("Max pages:          {}", settings.max_pages),
            format!("Default currency:   {}", settings.default_currency),
            format!("Log level:          {}", settings.log_level),
        ];
        if !settings.endpoint_overrides.is_empty() {
            lines.push(String::new());
            lines.push("Endpoint overrides:".to_string());
            for (category, path) in &settings.endpoint_overrides {
                lines.push(format!("  {category:<18} {path}"));
            }
        }
        lines.join("\n")
    }

    // ========================================================================
    // Pieces
    // ========================================================================

    /// Formats money with two decimal places, e.g. `BRL 1500.00`.
    pub fn format_money(&self, money: &Money) -> String {
        let text = format!("{} {:.2}", money.currency, money.amount);
        if money.is_negative() {
            self.red(&text)
        } else {
            text
        }
    }

    /// Status label, colored by severity.
    pub fn status_badge(&self, status: &CategoryStatus) -> String {
        match status {
            CategoryStatus::Ok => self.green("ok"),
            CategoryStatus::Stale { reason } => self.yellow(&format!("stale: {reason}")),
            CategoryStatus::Failed { reason } => self.red(&format!("failed: {reason}")),
        }
    }

    /// Cycle outcome in a few words.
    pub fn format_outcome(&self, outcome: &CycleOutcome) -> String {
        match outcome {
            CycleOutcome::NeverRun => self.dim("not refreshed yet"),
            CycleOutcome::Complete => self.green("complete"),
            CycleOutcome::Partial { failed } => {
                let names: Vec<_> = failed.iter().map(Category::as_str).collect();
                self.yellow(&format!("partial, failed: {}", names.join(", ")))
            }
            CycleOutcome::AuthFailed => self.red("authentication failed"),
        }
    }

    fn format_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    /// Highlights an identifier.
    pub fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
