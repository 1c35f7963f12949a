use std::fs;
use std::path::PathBuf;
use std::process;

use bcsave_core::core_api::{CoreError, CoreErrorCode, Engine, Session};
use bcsave_core::{GameVersion, IntegrityPolicy, OpenOptions};
use bcsave_render::{
    FieldSelection, JsonStyle, TextRenderOptions, render_json_full, render_json_selected,
    render_selected_pairs, render_text_with_options,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Set to `1` or `true` for JSON log lines on stderr.
const LOG_JSON_ENV: &str = "BCSAVE_LOG_JSON";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    #[arg(long)]
    country: bool,
    #[arg(long = "game-version")]
    game_version: bool,
    #[arg(long = "inquiry-code")]
    inquiry_code: bool,
    #[arg(long)]
    catfood: bool,
    #[arg(long)]
    xp: bool,
    #[arg(long = "normal-tickets")]
    normal_tickets: bool,
    #[arg(long = "rare-tickets")]
    rare_tickets: bool,
    #[arg(long = "platinum-tickets")]
    platinum_tickets: bool,
    #[arg(long = "legend-tickets")]
    legend_tickets: bool,
    #[arg(long)]
    np: bool,
    #[arg(long)]
    leadership: bool,
    #[arg(long = "user-rank")]
    user_rank: bool,
    #[arg(long = "managed-items")]
    managed_items: bool,
    #[arg(long)]
    json: bool,
    /// Verbose text output and debug logging.
    #[arg(long, short)]
    verbose: bool,
    /// Open saves whose integrity trailer does not match.
    #[arg(long = "accept-integrity-mismatch")]
    accept_integrity_mismatch: bool,
    /// Print the signed managed-item payload instead of a summary.
    #[arg(long = "backup-payload")]
    backup_payload: bool,
    #[arg(long = "save-key", requires = "backup_payload")]
    save_key: Option<String>,
    #[arg(long = "set-catfood")]
    set_catfood: Option<i32>,
    #[arg(long = "set-xp")]
    set_xp: Option<i32>,
    #[arg(long = "set-normal-tickets")]
    set_normal_tickets: Option<i32>,
    #[arg(long = "set-rare-tickets")]
    set_rare_tickets: Option<i32>,
    #[arg(long = "set-platinum-tickets")]
    set_platinum_tickets: Option<i32>,
    #[arg(long = "set-legend-tickets")]
    set_legend_tickets: Option<i32>,
    #[arg(long = "set-np")]
    set_np: Option<i32>,
    #[arg(long = "set-leadership")]
    set_leadership: Option<i16>,
    #[arg(long = "set-inquiry-code")]
    set_inquiry_code: Option<String>,
    #[arg(long = "set-game-version")]
    set_game_version: Option<u32>,
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            country: self.country,
            game_version: self.game_version,
            inquiry_code: self.inquiry_code,
            catfood: self.catfood,
            xp: self.xp,
            normal_tickets: self.normal_tickets,
            rare_tickets: self.rare_tickets,
            platinum_tickets: self.platinum_tickets,
            legend_tickets: self.legend_tickets,
            np: self.np,
            leadership: self.leadership,
            user_rank: self.user_rank,
            managed_items: self.managed_items,
        }
    }

    fn has_edits(&self) -> bool {
        self.set_catfood.is_some()
            || self.set_xp.is_some()
            || self.set_normal_tickets.is_some()
            || self.set_rare_tickets.is_some()
            || self.set_platinum_tickets.is_some()
            || self.set_legend_tickets.is_some()
            || self.set_np.is_some()
            || self.set_leadership.is_some()
            || self.set_inquiry_code.is_some()
            || self.set_game_version.is_some()
    }

    fn open_options(&self) -> OpenOptions {
        let policy = if self.accept_integrity_mismatch {
            IntegrityPolicy::Accept
        } else {
            IntegrityPolicy::Reject
        };
        OpenOptions::new().integrity(policy)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let use_json = std::env::var(LOG_JSON_ENV)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if use_json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let fields = cli.field_selection();
    let has_edits = cli.has_edits();

    if has_edits && cli.output.is_none() {
        eprintln!("--set-* flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set-* flag");
        process::exit(2);
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let engine = Engine::new();
    let mut session = engine
        .open_bytes(bytes, &cli.open_options())
        .unwrap_or_else(|e| {
            eprintln!("Error parsing save file: {}", cli.path.display());
            eprintln!("  {e}");
            if e.code == CoreErrorCode::IntegrityMismatch {
                eprintln!("  rerun with --accept-integrity-mismatch to open it anyway");
            }
            process::exit(1);
        });

    if session.file().integrity().is_mismatch() {
        warn!(path = %cli.path.display(), "opened save with mismatched integrity trailer");
    }

    apply_edits(&cli, &mut session);

    if let Some(out_path) = cli.output.as_ref() {
        let edited_bytes = session.to_bytes().unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });
        fs::write(out_path, &edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        info!(path = %out_path.display(), len = edited_bytes.len(), "wrote edited save");
    }

    if cli.backup_payload {
        let payload = session
            .backup_payload(cli.save_key.as_deref())
            .unwrap_or_else(|e| {
                eprintln!("Error building backup payload: {e}");
                process::exit(1);
            });
        println!("{payload}");
        return;
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_selected_pairs(&session, &fields) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = cli.output.as_ref() {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    print!(
        "{}",
        render_text_with_options(
            &session,
            TextRenderOptions {
                verbose: cli.verbose
            }
        )
    );
}

fn apply_edits(cli: &Cli, session: &mut Session) {
    if let Some(code) = cli.set_inquiry_code.as_deref() {
        session.set_inquiry_code(code).unwrap_or_else(|e| {
            eprintln!("Error applying inquiry code edit: {e}");
            process::exit(1);
        });
    }
    if let Some(version) = cli.set_game_version {
        session
            .set_game_version(GameVersion::new(version))
            .unwrap_or_else(|e| {
                eprintln!("Error applying game version edit: {e}");
                process::exit(1);
            });
    }

    type MonetisedEdit = fn(&mut Session, i32) -> Result<(), CoreError>;
    let monetised: [(&str, Option<i32>, MonetisedEdit); 4] = [
        ("catfood", cli.set_catfood, Session::set_catfood),
        ("rare tickets", cli.set_rare_tickets, Session::set_rare_tickets),
        (
            "platinum tickets",
            cli.set_platinum_tickets,
            Session::set_platinum_tickets,
        ),
        (
            "legend tickets",
            cli.set_legend_tickets,
            Session::set_legend_tickets,
        ),
    ];
    for (label, value, apply) in monetised {
        if let Some(value) = value {
            apply(session, value).unwrap_or_else(|e| {
                eprintln!("Error applying {label} edit: {e}");
                process::exit(1);
            });
        }
    }

    if let Some(xp) = cli.set_xp {
        session.set_xp(xp);
    }
    if let Some(tickets) = cli.set_normal_tickets {
        session.set_normal_tickets(tickets);
    }
    if let Some(np) = cli.set_np {
        session.set_np(np);
    }
    if let Some(leadership) = cli.set_leadership {
        session.set_leadership(leadership);
    }
}
