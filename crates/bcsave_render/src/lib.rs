use std::fmt::Write as _;

use bcsave_core::core_api::{Session, Snapshot};
use bcsave_core::{IntegrityStatus, ManagedItem, ManagedItemType};
use serde_json::{Map as JsonMap, Value as JsonValue};

const LABEL_WIDTH: usize = 18;
const VALUE_WIDTH: usize = 16;
const SHEET_WIDTH: usize = 76;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Also list every managed item and the section layout.
    pub verbose: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub country: bool,
    pub game_version: bool,
    pub inquiry_code: bool,
    pub catfood: bool,
    pub xp: bool,
    pub normal_tickets: bool,
    pub rare_tickets: bool,
    pub platinum_tickets: bool,
    pub legend_tickets: bool,
    pub np: bool,
    pub leadership: bool,
    pub user_rank: bool,
    pub managed_items: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.country
            || self.game_version
            || self.inquiry_code
            || self.catfood
            || self.xp
            || self.normal_tickets
            || self.rare_tickets
            || self.platinum_tickets
            || self.legend_tickets
            || self.np
            || self.leadership
            || self.user_rank
            || self.managed_items
    }
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(&session.snapshot())),
    }
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, &session.snapshot())),
    }
}

/// `key=value` lines for the selected fields, in a fixed order.
pub fn render_selected_pairs(
    session: &Session,
    fields: &FieldSelection,
) -> Vec<(&'static str, String)> {
    let snapshot = session.snapshot();
    let counters = &snapshot.counters;
    let mut out = Vec::new();

    if fields.country {
        out.push(("country", snapshot.country.to_string()));
    }
    if fields.game_version {
        out.push(("game_version", snapshot.game_version.to_string()));
    }
    if fields.inquiry_code {
        out.push(("inquiry_code", snapshot.inquiry_code.clone()));
    }
    if fields.catfood {
        out.push(("catfood", counters.catfood.to_string()));
    }
    if fields.xp {
        out.push(("xp", counters.xp.to_string()));
    }
    if fields.normal_tickets {
        out.push(("normal_tickets", counters.normal_tickets.to_string()));
    }
    if fields.rare_tickets {
        out.push(("rare_tickets", counters.rare_tickets.to_string()));
    }
    if fields.platinum_tickets {
        out.push(("platinum_tickets", counters.platinum_tickets.to_string()));
    }
    if fields.legend_tickets {
        out.push(("legend_tickets", counters.legend_tickets.to_string()));
    }
    if fields.np {
        out.push(("np", counters.np.to_string()));
    }
    if fields.leadership {
        out.push(("leadership", counters.leadership.to_string()));
    }
    if fields.user_rank {
        out.push(("user_rank", snapshot.user_rank.to_string()));
    }
    if fields.managed_items {
        for item in &snapshot.managed_items {
            out.push(("managed_item", format_managed_item(item)));
        }
    }

    out
}

pub fn render_text(session: &Session) -> String {
    render_text_with_options(session, TextRenderOptions::default())
}

pub fn render_text_with_options(session: &Session, options: TextRenderOptions) -> String {
    let snapshot = session.snapshot();
    let counters = &snapshot.counters;
    let mut out = String::new();

    let title = format!(
        "BATTLE CATS SAVE  {}  v{}",
        snapshot.country,
        snapshot.game_version.dotted()
    );
    let _ = writeln!(out, "{}", centered_no_trailing(&title, SHEET_WIDTH));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {:<LABEL_WIDTH$}{}",
        "Inquiry code:", snapshot.inquiry_code
    );
    let _ = writeln!(
        out,
        "  {:<LABEL_WIDTH$}{}",
        "Integrity:",
        format_integrity(&snapshot.integrity)
    );
    let _ = writeln!(out);

    let rows: [(&str, String, &str, String); 5] = [
        (
            "Cat Food:",
            format_number_with_commas(counters.catfood),
            "XP:",
            format_number_with_commas(counters.xp),
        ),
        (
            "Normal tickets:",
            format_number_with_commas(counters.normal_tickets),
            "Rare tickets:",
            format_number_with_commas(counters.rare_tickets),
        ),
        (
            "Platinum tickets:",
            format_number_with_commas(counters.platinum_tickets),
            "Legend tickets:",
            format_number_with_commas(counters.legend_tickets),
        ),
        (
            "NP:",
            format_number_with_commas(counters.np),
            "Leadership:",
            counters.leadership.to_string(),
        ),
        (
            "User rank:",
            snapshot.user_rank.to_string(),
            "Cats owned:",
            format!("{} / {}", snapshot.owned_cats, snapshot.total_cats),
        ),
    ];
    for (left_label, left, right_label, right) in &rows {
        let line = format!(
            "  {left_label:<LABEL_WIDTH$}{left:>VALUE_WIDTH$}    {right_label:<LABEL_WIDTH$}{right:>VALUE_WIDTH$}"
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    let _ = writeln!(out);

    write_managed_items(&mut out, &snapshot, options.verbose);

    if options.verbose {
        let layout = session.file().layout();
        if !layout.sections.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Layout ({} bytes):", layout.file_len);
            for section in &layout.sections {
                let _ = writeln!(
                    out,
                    "    {:<20}{:>10}..{}",
                    section.id.name(),
                    section.range.start,
                    section.range.end
                );
            }
        }
    }

    out
}

fn write_managed_items(out: &mut String, snapshot: &Snapshot, verbose: bool) {
    let _ = writeln!(
        out,
        "  {:<LABEL_WIDTH$}{}",
        "Managed items:",
        snapshot.managed_items.len()
    );
    for kind in ManagedItemType::ALL {
        let net: i64 = snapshot
            .managed_items
            .iter()
            .filter(|item| item.managed_item_type == kind)
            .map(ManagedItem::signed_amount)
            .sum();
        if net != 0 {
            let _ = writeln!(out, "    {:<16}{:+}", kind.as_str(), net);
        }
    }
    if verbose {
        for item in &snapshot.managed_items {
            let _ = writeln!(out, "    {}", format_managed_item(item));
        }
    }
}

fn selected_json(fields: &FieldSelection, snapshot: &Snapshot) -> JsonMap<String, JsonValue> {
    let counters = &snapshot.counters;
    let mut out = JsonMap::new();

    if fields.country {
        out.insert(
            "country".to_string(),
            JsonValue::String(snapshot.country.to_string()),
        );
    }
    if fields.game_version {
        out.insert(
            "game_version".to_string(),
            JsonValue::from(snapshot.game_version.get()),
        );
    }
    if fields.inquiry_code {
        out.insert(
            "inquiry_code".to_string(),
            JsonValue::String(snapshot.inquiry_code.clone()),
        );
    }
    if fields.catfood {
        out.insert("catfood".to_string(), JsonValue::from(counters.catfood));
    }
    if fields.xp {
        out.insert("xp".to_string(), JsonValue::from(counters.xp));
    }
    if fields.normal_tickets {
        out.insert(
            "normal_tickets".to_string(),
            JsonValue::from(counters.normal_tickets),
        );
    }
    if fields.rare_tickets {
        out.insert(
            "rare_tickets".to_string(),
            JsonValue::from(counters.rare_tickets),
        );
    }
    if fields.platinum_tickets {
        out.insert(
            "platinum_tickets".to_string(),
            JsonValue::from(counters.platinum_tickets),
        );
    }
    if fields.legend_tickets {
        out.insert(
            "legend_tickets".to_string(),
            JsonValue::from(counters.legend_tickets),
        );
    }
    if fields.np {
        out.insert("np".to_string(), JsonValue::from(counters.np));
    }
    if fields.leadership {
        out.insert(
            "leadership".to_string(),
            JsonValue::from(counters.leadership),
        );
    }
    if fields.user_rank {
        out.insert("user_rank".to_string(), JsonValue::from(snapshot.user_rank));
    }
    if fields.managed_items {
        out.insert(
            "managed_items".to_string(),
            managed_items_to_json(&snapshot.managed_items),
        );
    }

    out
}

fn default_json(snapshot: &Snapshot) -> JsonMap<String, JsonValue> {
    let counters = &snapshot.counters;
    let mut out = JsonMap::new();

    out.insert(
        "country".to_string(),
        JsonValue::String(snapshot.country.to_string()),
    );
    out.insert(
        "game_version".to_string(),
        JsonValue::from(snapshot.game_version.get()),
    );
    out.insert(
        "inquiry_code".to_string(),
        JsonValue::String(snapshot.inquiry_code.clone()),
    );
    out.insert("catfood".to_string(), JsonValue::from(counters.catfood));
    out.insert("xp".to_string(), JsonValue::from(counters.xp));
    out.insert(
        "normal_tickets".to_string(),
        JsonValue::from(counters.normal_tickets),
    );
    out.insert(
        "rare_tickets".to_string(),
        JsonValue::from(counters.rare_tickets),
    );
    out.insert(
        "platinum_tickets".to_string(),
        JsonValue::from(counters.platinum_tickets),
    );
    out.insert(
        "legend_tickets".to_string(),
        JsonValue::from(counters.legend_tickets),
    );
    out.insert(
        "platinum_shards".to_string(),
        JsonValue::from(counters.platinum_shards),
    );
    out.insert("np".to_string(), JsonValue::from(counters.np));
    out.insert(
        "leadership".to_string(),
        JsonValue::from(counters.leadership),
    );
    out.insert("play_time".to_string(), JsonValue::from(counters.play_time));
    out.insert("user_rank".to_string(), JsonValue::from(snapshot.user_rank));
    out.insert("owned_cats".to_string(), JsonValue::from(snapshot.owned_cats));
    out.insert("total_cats".to_string(), JsonValue::from(snapshot.total_cats));
    out.insert(
        "managed_items".to_string(),
        managed_items_to_json(&snapshot.managed_items),
    );
    out.insert(
        "integrity".to_string(),
        serde_json::to_value(&snapshot.integrity).unwrap_or(JsonValue::Null),
    );

    out
}

fn managed_items_to_json(items: &[ManagedItem]) -> JsonValue {
    JsonValue::Array(
        items
            .iter()
            .map(|item| serde_json::to_value(item).unwrap_or(JsonValue::Null))
            .collect(),
    )
}

fn format_managed_item(item: &ManagedItem) -> String {
    format!(
        "{}{} {} at {} ({})",
        if item.signed_amount() < 0 { "-" } else { "+" },
        item.amount,
        item.managed_item_type.as_str(),
        item.detail_created_at,
        item.detail_code
    )
}

fn format_integrity(status: &IntegrityStatus) -> String {
    match status {
        IntegrityStatus::Unchecked => "unchecked".to_string(),
        IntegrityStatus::Verified => "verified".to_string(),
        IntegrityStatus::Mismatch { stored, computed } => {
            format!("MISMATCH (stored {stored}, computed {computed})")
        }
    }
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}

fn format_number_with_commas(n: i32) -> String {
    let digits = i64::from(n).unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        result.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
