//! # Comment Box Generator (commentbox)
//!
//! A CLI tool that frames text in a Unicode box-drawing border, optionally
//! wrapped as a `/* … */` block comment, ready to paste into source code.
//!
//! ## Overview
//!
//! Content comes from a file, `--text`, or stdin. Each side of the box takes
//! its own line style (solid, two/three/four dashes, double line) and
//! thickness (light, heavy); the glyph resolver picks matching corners.
//!
//! ## Flow
//!
//! ```text
//! Args + .commentboxrc → Config → Read input → Tab expansion → Render → Output
//!                                                                 ↓
//!                                            stdout | --output FILE | --json
//!                                            --dry-run / --diff against FILE
//!                                            --watch: re-render on every save
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | General error (file not found, permission denied, I/O error) |
//! | 2 | Invalid command-line arguments |
//! | 3 | Dry-run mode: output file would change |
//! | 4 | Parse error (invalid UTF-8 or binary input) |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::ValueEnum;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use commentbox::{
    BorderGlyphs, BoxMetrics, BoxSpec, DEFAULT_MIN_WIDTH, DEFAULT_PADDING, LineEnding, LineStyle,
    LineThickness, SideSpec, content_lines, expand_tabs, measure, render,
};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rich_rust::terminal;
use rich_rust::{ColorSystem, Console};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Exit Codes
// ─────────────────────────────────────────────────────────────────────────────

/// Semantic exit codes for scripting and CI integration
mod exit_codes {
    /// Success - completed without errors
    pub const SUCCESS: i32 = 0;
    /// General error (file not found, permission denied, I/O error)
    pub const ERROR: i32 = 1;
    /// Invalid command-line arguments
    pub const INVALID_ARGS: i32 = 2;
    /// Dry-run mode: output file would change
    pub const WOULD_CHANGE: i32 = 3;
    /// Parse error (invalid UTF-8 or binary file detected)
    pub const PARSE_ERROR: i32 = 4;
}

#[derive(Debug)]
struct ArgError(String);

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ArgError {}

#[derive(Debug)]
struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug)]
struct RunOutcome {
    dry_run: bool,
    would_change: bool,
}

fn error_chain_has<T: std::error::Error + 'static>(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<T>())
}

fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    if error_chain_has::<ArgError>(err) {
        exit_codes::INVALID_ARGS
    } else if error_chain_has::<ParseError>(err) {
        exit_codes::PARSE_ERROR
    } else {
        exit_codes::ERROR
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CLI Arguments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ColorMode {
    /// Auto-detect color support
    Auto,
    /// Always emit colors (even when not a TTY)
    Always,
    /// Never emit colors
    Never,
}

/// Comment Box Generator: frames text in Unicode box-drawing borders
#[derive(Parser, Debug)]
#[command(
    name = "commentbox",
    version,
    about,
    long_about = None,
    after_help = "STYLES:\n  solid, double-dash, triple-dash, quadruple-dash, double-line (alias: double)\n\nEXIT CODES:\n  0  Success\n  1  General error (file not found, permission denied, I/O error)\n  2  Invalid command-line arguments\n  3  Dry-run mode: output file would change\n  4  Parse error (invalid UTF-8 or binary input)\n"
)]
struct Args {
    /// Input file. Reads from stdin if neither FILE nor --text is given.
    #[arg(value_name = "FILE", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Text to frame instead of reading a file or stdin
    #[arg(short = 't', long, value_name = "TEXT")]
    text: Option<String>,

    /// Path to config file (default: search for .commentboxrc)
    #[arg(long = "config", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Ignore config files
    #[arg(long = "no-config")]
    no_config: bool,

    /// Minimum box width including borders [default: 100]
    #[arg(short = 'W', long, value_name = "N")]
    min_width: Option<usize>,

    /// Spaces between the borders and the longest line [default: 2]
    #[arg(short = 'p', long, value_name = "N")]
    padding: Option<usize>,

    /// Tab width for expansion [default: 4]
    #[arg(long, value_name = "N")]
    tab_width: Option<usize>,

    /// Wrap the box in /* */ (default)
    #[arg(long, overrides_with = "no_comment")]
    comment: bool,

    /// Emit the bare box without comment markers
    #[arg(long = "no-comment", overrides_with = "comment")]
    no_comment: bool,

    /// Center each line (default)
    #[arg(long, overrides_with = "no_center")]
    center: bool,

    /// Left-align lines after the padding
    #[arg(long = "no-center", overrides_with = "center")]
    no_center: bool,

    /// Line style for all four sides [default: solid]
    #[arg(long, value_enum, value_name = "STYLE")]
    style: Option<LineStyle>,

    /// Line thickness for all four sides [default: heavy]
    #[arg(long, value_enum, value_name = "THICKNESS")]
    thick: Option<LineThickness>,

    /// Line style of the top edge
    #[arg(long, value_enum, value_name = "STYLE")]
    top_style: Option<LineStyle>,

    /// Line thickness of the top edge
    #[arg(long, value_enum, value_name = "THICKNESS")]
    top_thick: Option<LineThickness>,

    /// Line style of the bottom edge
    #[arg(long, value_enum, value_name = "STYLE")]
    bottom_style: Option<LineStyle>,

    /// Line thickness of the bottom edge
    #[arg(long, value_enum, value_name = "THICKNESS")]
    bottom_thick: Option<LineThickness>,

    /// Line style of the left edge
    #[arg(long, value_enum, value_name = "STYLE")]
    left_style: Option<LineStyle>,

    /// Line thickness of the left edge
    #[arg(long, value_enum, value_name = "THICKNESS")]
    left_thick: Option<LineThickness>,

    /// Line style of the right edge
    #[arg(long, value_enum, value_name = "STYLE")]
    right_style: Option<LineStyle>,

    /// Line thickness of the right edge
    #[arg(long, value_enum, value_name = "THICKNESS")]
    right_thick: Option<LineThickness>,

    /// Row separator [default: native]
    #[arg(long, value_enum)]
    line_ending: Option<LineEnding>,

    /// Write the box to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Create backup of the output file before overwriting it
    #[arg(long, requires = "output")]
    backup: bool,

    /// Extension for backup files (default: .bak)
    #[arg(long, default_value = ".bak", requires = "backup")]
    backup_ext: String,

    /// Preview without writing the output file (exit 0=no changes, 3=would change)
    #[arg(short = 'n', long, requires = "output")]
    dry_run: bool,

    /// Show unified diff against the output file instead of writing it
    #[arg(short = 'd', long, requires = "output")]
    diff: bool,

    /// Watch the input file and re-render on every change
    #[arg(short = 'w', long, requires = "input", conflicts_with_all = ["dry_run", "diff", "json"])]
    watch: bool,

    /// Debounce interval in milliseconds (for --watch mode)
    #[arg(long, default_value = "500", requires = "watch")]
    debounce_ms: u64,

    /// Output the result as JSON for programmatic processing
    #[arg(long, conflicts_with_all = ["verbose", "diff"])]
    json: bool,

    /// Verbose output showing box metrics and timing
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Color output: auto, always, or never
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,

    /// Subcommand (config management)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// The four sides of the box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl Args {
    fn global_side(&self) -> SideOverride {
        SideOverride {
            style: self.style,
            thick: self.thick,
        }
    }

    fn side(&self, side: Side) -> SideOverride {
        let (style, thick) = match side {
            Side::Top => (self.top_style, self.top_thick),
            Side::Bottom => (self.bottom_style, self.bottom_thick),
            Side::Left => (self.left_style, self.left_thick),
            Side::Right => (self.right_style, self.right_thick),
        };
        SideOverride { style, thick }
    }

    /// `Some` when --comment or --no-comment was given (last one wins)
    fn comment_flag(&self) -> Option<bool> {
        if self.no_comment {
            Some(false)
        } else if self.comment {
            Some(true)
        } else {
            None
        }
    }

    /// `Some` when --center or --no-center was given (last one wins)
    fn center_flag(&self) -> Option<bool> {
        if self.no_center {
            Some(false)
        } else if self.center {
            Some(true)
        } else {
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommands
// ─────────────────────────────────────────────────────────────────────────────

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config management actions
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Initialize a new .commentboxrc config file
    Init {
        /// Create in home directory instead of current
        #[arg(long)]
        global: bool,
    },
    /// Show effective configuration (merged file + defaults)
    Show,
    /// Show path to active config file
    Path,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default tab expansion width
const DEFAULT_TAB_WIDTH: usize = 4;

/// Default debounce for watch mode, in milliseconds
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default backup extension
const DEFAULT_BACKUP_EXT: &str = ".bak";

/// Largest accepted --min-width
const MAX_MIN_WIDTH: usize = 4096;

/// Largest accepted --padding
const MAX_PADDING: usize = 512;

/// Runtime configuration: CLI args merged over the config file
#[derive(Debug)]
struct Config {
    min_width: usize,
    padding: usize,
    tab_width: usize,
    comment: bool,
    center: bool,
    line_ending: LineEnding,
    top: SideSpec,
    bottom: SideSpec,
    left: SideSpec,
    right: SideSpec,
    color: ColorMode,
    verbose: bool,
    json: bool,
    diff: bool,
    dry_run: bool,
    watch: bool,
    debounce_ms: u64,
    backup: bool,
    backup_ext: String,
}

impl Config {
    fn box_spec(&self, content: String) -> BoxSpec {
        BoxSpec {
            top: self.top,
            bottom: self.bottom,
            left: self.left,
            right: self.right,
            min_width: self.min_width,
            padding: self.padding,
            is_centered: self.center,
            is_comment: self.comment,
            line_ending: self.line_ending,
            content,
        }
    }
}

/// A style/thickness pair from one source; either half may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
struct SideOverride {
    style: Option<LineStyle>,
    thick: Option<LineThickness>,
}

impl SideOverride {
    /// A single source may not ask for a heavy double line
    fn validate(&self, source: &str) -> Result<(), ArgError> {
        if self.style == Some(LineStyle::DoubleLine) && self.thick == Some(LineThickness::Heavy) {
            return Err(ArgError(format!(
                "{}: double-line sides have no heavy variant",
                source
            )));
        }
        Ok(())
    }
}

/// Layer side settings: defaults, config file (all sides, then this side),
/// CLI (all sides, then this side). Later layers win per field.
fn resolve_side(side: Side, args: &Args, file: &FileConfig) -> Result<SideSpec, ArgError> {
    let name = side.name();
    let layers = [
        (file.global_side(), "config file style/thick".to_string()),
        (file.side(side), format!("config file [{}]", name)),
        (args.global_side(), "--style/--thick".to_string()),
        (args.side(side), format!("--{0}-style/--{0}-thick", name)),
    ];

    let default = SideSpec::heavy();
    let mut style = default.style;
    let mut thick = default.thickness;

    for (layer, source) in &layers {
        layer.validate(source)?;
        if let Some(s) = layer.style {
            style = s;
        }
        if let Some(t) = layer.thick {
            thick = t;
        }
    }

    Ok(SideSpec::new(style, thick))
}

/// Merge CLI args over file config over built-in defaults
fn build_config(args: &Args, file: &FileConfig) -> Result<Config> {
    let backup_ext = if args.backup_ext == DEFAULT_BACKUP_EXT {
        file.backup_ext
            .clone()
            .unwrap_or_else(|| DEFAULT_BACKUP_EXT.to_string())
    } else {
        args.backup_ext.clone()
    };

    let debounce_ms = if args.debounce_ms == DEFAULT_DEBOUNCE_MS {
        file.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    } else {
        args.debounce_ms
    };

    let color = if args.color == ColorMode::Auto {
        file.color.unwrap_or(ColorMode::Auto)
    } else {
        args.color
    };

    // JSON owns stdout: file settings never combine it with console output or
    // a diff, and an explicit CLI flag beats the file on either side
    let json = args.json
        || (file.json.unwrap_or(false) && !args.verbose && !args.diff && !args.watch);
    let verbose = args.verbose || (file.verbose.unwrap_or(false) && !json);

    Ok(Config {
        min_width: args.min_width.or(file.min_width).unwrap_or(DEFAULT_MIN_WIDTH),
        padding: args.padding.or(file.padding).unwrap_or(DEFAULT_PADDING),
        tab_width: args.tab_width.or(file.tab_width).unwrap_or(DEFAULT_TAB_WIDTH),
        comment: args.comment_flag().or(file.comment).unwrap_or(true),
        center: args.center_flag().or(file.center).unwrap_or(true),
        line_ending: args.line_ending.or(file.line_ending).unwrap_or_default(),
        top: resolve_side(Side::Top, args, file)?,
        bottom: resolve_side(Side::Bottom, args, file)?,
        left: resolve_side(Side::Left, args, file)?,
        right: resolve_side(Side::Right, args, file)?,
        color,
        verbose,
        json,
        diff: args.diff,
        dry_run: args.dry_run,
        watch: args.watch,
        debounce_ms,
        backup: args.backup || file.backup.unwrap_or(false),
        backup_ext,
    })
}

fn validate_config(config: &Config) -> Result<()> {
    if config.min_width < 2 || config.min_width > MAX_MIN_WIDTH {
        return Err(ArgError(format!(
            "--min-width must be between 2 and {}",
            MAX_MIN_WIDTH
        ))
        .into());
    }

    if config.padding > MAX_PADDING {
        return Err(ArgError(format!("--padding must be at most {}", MAX_PADDING)).into());
    }

    if config.tab_width == 0 || config.tab_width > 16 {
        return Err(ArgError("--tab-width must be between 1 and 16".to_string()).into());
    }

    if config.json && (config.verbose || config.diff) {
        return Err(
            ArgError("--json cannot be combined with --verbose or --diff".to_string()).into(),
        );
    }

    Ok(())
}

struct VerboseStyle {
    use_color: bool,
}

impl VerboseStyle {
    fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn wrap(&self, tag: &str, text: impl fmt::Display) -> String {
        if self.use_color {
            format!("[{}]{}[/]", tag, text)
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: impl fmt::Display) -> String {
        self.wrap("bold green", text)
    }

    fn warn(&self, text: impl fmt::Display) -> String {
        self.wrap("yellow", text)
    }

    fn dim(&self, text: impl fmt::Display) -> String {
        self.wrap("dim", text)
    }

    fn bold(&self, text: impl fmt::Display) -> String {
        self.wrap("bold", text)
    }

    fn stat_label(&self, text: impl fmt::Display) -> String {
        self.wrap("bold blue", text)
    }

    fn separator(&self) -> String {
        self.wrap("dim", "───")
    }
}

/// Print box metrics and timing
fn print_summary(result: &RenderResult, console: &Console, styles: &VerboseStyle) {
    let m = &result.metrics;
    let g = &result.glyphs;

    console.print("");
    console.print(&format!(
        "{} Summary {}",
        styles.separator(),
        styles.separator()
    ));

    console.print(&format!(
        "  {} {}×{} ({} content row(s), {} row(s) emitted)",
        styles.stat_label("Box:"),
        m.width,
        m.height,
        m.content_rows,
        m.total_rows
    ));

    console.print(&format!(
        "  {} {} {} {} {}  {} {} {} {}",
        styles.stat_label("Glyphs:"),
        g.upper_left,
        g.upper_right,
        g.lower_left,
        g.lower_right,
        g.top,
        g.bottom,
        g.left,
        g.right
    ));

    console.print(&format!(
        "  {} {:.3}ms",
        styles.stat_label("Time:"),
        result.elapsed.as_secs_f64() * 1000.0
    ));

    console.print("");
}

fn build_console(color: ColorMode) -> (Console, VerboseStyle) {
    match color {
        ColorMode::Never => (Console::new(), VerboseStyle::new(false)),
        ColorMode::Always => {
            let system = terminal::detect_color_system().unwrap_or(ColorSystem::Standard);
            let console = Console::builder()
                .force_terminal(true)
                .color_system(system)
                .build();
            (console, VerboseStyle::new(true))
        }
        ColorMode::Auto => {
            if std::env::var("NO_COLOR").is_ok() {
                return (Console::new(), VerboseStyle::new(false));
            }

            if std::env::var("FORCE_COLOR").is_ok() {
                let system = terminal::detect_color_system().unwrap_or(ColorSystem::Standard);
                let console = Console::builder()
                    .force_terminal(true)
                    .color_system(system)
                    .build();
                return (console, VerboseStyle::new(true));
            }

            let console = Console::new();
            let use_color = console.is_color_enabled();
            (console, VerboseStyle::new(use_color))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config File Support
// ─────────────────────────────────────────────────────────────────────────────

/// Config file names searched in order
const CONFIG_FILENAMES: &[&str] = &[".commentboxrc", ".commentboxrc.toml", "commentboxrc.toml"];

/// Configuration loaded from a .commentboxrc file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    /// Minimum box width
    min_width: Option<usize>,
    /// Horizontal padding
    padding: Option<usize>,
    /// Tab expansion width
    tab_width: Option<usize>,
    /// Wrap in /* */
    comment: Option<bool>,
    /// Center lines
    center: Option<bool>,
    /// Row separator: native, lf, crlf
    line_ending: Option<LineEnding>,
    /// Line style for all sides
    style: Option<LineStyle>,
    /// Line thickness for all sides
    thick: Option<LineThickness>,
    /// Top edge overrides
    top: Option<SideOverride>,
    /// Bottom edge overrides
    bottom: Option<SideOverride>,
    /// Left edge overrides
    left: Option<SideOverride>,
    /// Right edge overrides
    right: Option<SideOverride>,
    /// Show verbose output
    verbose: Option<bool>,
    /// Color mode: auto, always, never
    color: Option<ColorMode>,
    /// Output as JSON
    json: Option<bool>,
    /// Create backup before overwriting --output
    backup: Option<bool>,
    /// Backup file extension
    backup_ext: Option<String>,
    /// Watch mode debounce in milliseconds
    debounce_ms: Option<u64>,
}

impl FileConfig {
    fn global_side(&self) -> SideOverride {
        SideOverride {
            style: self.style,
            thick: self.thick,
        }
    }

    fn side(&self, side: Side) -> SideOverride {
        let table = match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        };
        table.unwrap_or_default()
    }
}

/// Search for a config file starting from the given directory
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    // Search up the directory tree
    loop {
        for filename in CONFIG_FILENAMES {
            let config_path = current.join(filename);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    // Check home directory
    if let Some(home) = dirs::home_dir() {
        for filename in CONFIG_FILENAMES {
            let config_path = home.join(filename);
            if config_path.exists() {
                return Some(config_path);
            }
        }
    }

    None
}

/// Load and parse a config file
fn load_config_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Locate the config file for these args, if any
fn locate_config_file(args: &Args) -> Result<Option<PathBuf>> {
    if args.no_config {
        return Ok(None);
    }

    if let Some(ref path) = args.config_file {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }
        return Ok(Some(path.clone()));
    }

    let start_dir = args
        .input
        .as_ref()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    Ok(find_config_file(&start_dir))
}

/// Create Config by merging file config with CLI args (CLI wins)
fn create_config(args: &Args) -> Result<Config> {
    let file_config = match locate_config_file(args)? {
        Some(path) => load_config_file(&path)?,
        None => FileConfig::default(),
    };

    build_config(args, &file_config)
}

/// Default config file content
const DEFAULT_CONFIG: &str = r#"# .commentboxrc - commentbox configuration file

# Smallest box width, borders included
min_width = 100

# Spaces between the borders and the longest line
padding = 2

# Tab expansion width
# tab_width = 4

# Layout
# center = true
# comment = true
# line_ending = "native"   # native | lf | crlf

# Border for all four sides
# style: solid | double-dash | triple-dash | quadruple-dash | double-line
# thick: light | heavy
style = "solid"
thick = "heavy"

# Output options
# verbose = false
# color = "auto"
# json = false
# backup = false
# backup_ext = ".bak"
# debounce_ms = 500

# Per-side overrides (keep these tables last)
# [top]
# style = "double-line"
#
# [right]
# thick = "light"
"#;

/// Handle the config subcommand
fn run_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { global } => {
            let path = if *global {
                dirs::home_dir()
                    .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
                    .join(".commentboxrc")
            } else {
                PathBuf::from(".commentboxrc")
            };

            if path.exists() {
                return Err(anyhow::anyhow!(
                    "Config file already exists: {}",
                    path.display()
                ));
            }

            fs::write(&path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to create config file: {}", path.display()))?;

            eprintln!("Created config file: {}", path.display());
            Ok(())
        }

        ConfigAction::Show => {
            // Parse minimal args to get effective config
            let args = Args::parse_from(["commentbox"]);
            let config = create_config(&args)?;

            eprintln!("Effective configuration:");
            eprintln!("  min_width: {}", config.min_width);
            eprintln!("  padding: {}", config.padding);
            eprintln!("  tab_width: {}", config.tab_width);
            eprintln!("  comment: {}", config.comment);
            eprintln!("  center: {}", config.center);
            eprintln!("  line_ending: {:?}", config.line_ending);
            for (name, side) in [
                ("top", config.top),
                ("bottom", config.bottom),
                ("left", config.left),
                ("right", config.right),
            ] {
                eprintln!("  {}: {:?} {:?}", name, side.style, side.thickness);
            }
            eprintln!("  verbose: {}", config.verbose);
            eprintln!("  color: {:?}", config.color);
            eprintln!("  json: {}", config.json);
            eprintln!("  backup: {}", config.backup);
            eprintln!("  backup_ext: {}", config.backup_ext);
            eprintln!("  debounce_ms: {}", config.debounce_ms);

            let start_dir = std::env::current_dir().unwrap_or_default();
            if let Some(path) = find_config_file(&start_dir) {
                eprintln!();
                eprintln!("Config file: {}", path.display());
            }

            Ok(())
        }

        ConfigAction::Path => {
            let start_dir = std::env::current_dir().unwrap_or_default();
            match find_config_file(&start_dir) {
                Some(path) => {
                    println!("{}", path.display());
                    Ok(())
                }
                None => anyhow::bail!("No config file found"),
            }
        }
    }
}

fn run_command(command: &Commands) -> Result<()> {
    match command {
        Commands::Config { action } => run_config_command(action),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON Output Structures
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonOutput<'a> {
    version: &'static str,
    status: &'static str,
    source: &'a str,
    metrics: BoxMetrics,
    glyphs: BorderGlyphs,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<OutputStats>,
    rendered: &'a str,
}

#[derive(Serialize)]
struct OutputStats {
    path: String,
    changed: bool,
    written: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum file size (100 MB) - reject larger files to prevent memory issues
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Read content from a file path
fn read_file(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(ParseError(format!(
            "File too large: {} ({} MB). Maximum supported size is {} MB.",
            path.display(),
            metadata.len() / (1024 * 1024),
            MAX_FILE_SIZE / (1024 * 1024)
        ))
        .into());
    }

    let source_label = path.display().to_string();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;

    parse_bytes_to_text(bytes, &source_label)
}

/// Read content from stdin
fn read_stdin_content() -> Result<String> {
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("Failed to read stdin")?;
    parse_bytes_to_text(buf, "stdin")
}

/// Convert raw bytes to text, checking for binary content and valid UTF-8
fn parse_bytes_to_text(bytes: Vec<u8>, source_label: &str) -> Result<String> {
    if bytes.contains(&0) {
        return Err(ParseError(format!("Input appears to be binary: {}", source_label)).into());
    }

    let content = String::from_utf8(bytes).map_err(|err| {
        let utf8_err = err.utf8_error();
        let valid_up_to = utf8_err.valid_up_to();
        let byte = err.as_bytes().get(valid_up_to).copied();
        let detail = match byte {
            Some(b) => format!(
                "Invalid UTF-8 at byte position {} (byte value: 0x{:02X}) in {}",
                valid_up_to, b, source_label
            ),
            None => format!("Invalid UTF-8 in {}", source_label),
        };
        ParseError(detail)
    })?;

    Ok(content)
}

/// Read the content to frame and a label naming where it came from
fn read_input(args: &Args) -> Result<(String, String)> {
    if let Some(ref text) = args.text {
        Ok((text.clone(), "--text".to_string()))
    } else if let Some(ref path) = args.input {
        let content = strip_line_terminator(read_file(path)?);
        Ok((content, path.display().to_string()))
    } else {
        Ok((strip_line_terminator(read_stdin_content()?), "stdin".to_string()))
    }
}

/// Drop the one line terminator that ends a file or piped input
fn strip_line_terminator(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// Expand tabs on every line
fn prepare_content(raw: &str, tab_width: usize) -> String {
    raw.split('\n')
        .map(|line| expand_tabs(line, tab_width))
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// A rendered box and what went into it
#[derive(Debug)]
struct RenderResult {
    source: String,
    rendered: String,
    metrics: BoxMetrics,
    glyphs: BorderGlyphs,
    line_ending: LineEnding,
    elapsed: Duration,
}

impl RenderResult {
    /// The rendered box followed by one line ending, as written to files
    fn output_text(&self) -> String {
        let mut text = self.rendered.clone();
        text.push_str(self.line_ending.as_str());
        text
    }
}

/// Render raw input according to the config
fn process_input(
    raw: &str,
    source: String,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<RenderResult> {
    let content = prepare_content(raw, config.tab_width);

    if config.verbose {
        console.print(&styles.bold(format!(
            "Rendering {} ({} line(s))...",
            source,
            content_lines(&content).len()
        )));
    }

    let start = Instant::now();
    let spec = config.box_spec(content);
    let glyphs = BorderGlyphs::resolve(&spec).context("Failed to resolve border glyphs")?;
    let rendered = render(&spec).with_context(|| format!("Failed to render {}", source))?;
    let metrics = measure(&spec);

    Ok(RenderResult {
        source,
        rendered,
        metrics,
        glyphs,
        line_ending: spec.line_ending,
        elapsed: start.elapsed(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

/// Creates a backup of the file by appending the extension to the filename.
/// For example: "banner.txt" with extension ".bak" becomes "banner.txt.bak"
fn create_backup(path: &Path, ext: &str) -> Result<PathBuf> {
    let mut backup_name = path.as_os_str().to_owned();
    backup_name.push(ext);
    let backup_path = PathBuf::from(backup_name);

    fs::copy(path, &backup_path)
        .with_context(|| format!("Failed to create backup at {}", backup_path.display()))?;

    Ok(backup_path)
}

/// Current contents of an output file compared with a new rendering
#[derive(Debug)]
struct OutputComparison {
    path: PathBuf,
    existing: String,
    would_change: bool,
}

fn compare_with_existing(path: &Path, new_text: &str) -> Result<OutputComparison> {
    let existing = if path.exists() {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read output file: {}", path.display()))?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        String::new()
    };

    let would_change = existing != new_text;
    Ok(OutputComparison {
        path: path.to_path_buf(),
        existing,
        would_change,
    })
}

/// Write the rendering to its output file, backing it up first if asked
fn write_output(
    path: &Path,
    text: &str,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<()> {
    if config.backup && path.exists() {
        let backup_path = create_backup(path, &config.backup_ext)?;
        if config.verbose {
            console.print(&styles.dim(format!("Created backup: {}", backup_path.display())));
        }
    }

    fs::write(path, text).with_context(|| format!("Failed to write to file: {}", path.display()))
}

/// Output a unified diff between the output file and the new rendering
fn output_diff(comparison: &OutputComparison, new_text: &str) -> Result<()> {
    if !comparison.would_change {
        return Ok(());
    }

    let label = comparison.path.display();
    let diff = TextDiff::from_lines(comparison.existing.as_str(), new_text);
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "--- a/{}", label)?;
    writeln!(stdout, "+++ b/{} (proposed)", label)?;

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        writeln!(stdout, "{}", hunk.header())?;
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            let line = change.value();
            if line.ends_with('\n') {
                write!(stdout, "{}{}", sign, line)?;
            } else {
                writeln!(stdout, "{}{}", sign, line)?;
            }
        }
    }

    Ok(())
}

/// Output JSON for a rendering
fn output_json(
    config: &Config,
    result: &RenderResult,
    comparison: Option<&OutputComparison>,
    written: bool,
) -> Result<()> {
    let json_output = JsonOutput {
        version: "1.0",
        status: if config.dry_run {
            "dry_run"
        } else {
            "success"
        },
        source: &result.source,
        metrics: result.metrics,
        glyphs: result.glyphs,
        output: comparison.map(|c| OutputStats {
            path: c.path.display().to_string(),
            changed: c.would_change,
            written,
        }),
        rendered: &result.rendered,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&json_output).context("Failed to serialize JSON output")?
    );

    Ok(())
}

/// Deliver a rendering according to the output mode
fn output_result(
    args: &Args,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
    result: &RenderResult,
) -> Result<RunOutcome> {
    let text = result.output_text();
    let comparison = match args.output {
        Some(ref path) => Some(compare_with_existing(path, &text)?),
        None => None,
    };
    let would_change = comparison.as_ref().is_some_and(|c| c.would_change);
    let may_write = !config.dry_run && !config.diff;

    if let Some(ref c) = comparison {
        if config.diff {
            output_diff(c, &text)?;
        }

        if may_write && c.would_change {
            write_output(&c.path, &text, config, console, styles)?;
        }

        if config.verbose {
            let label = c.path.display();
            let message = match (would_change, may_write) {
                (true, true) => styles.success(format!("Wrote {}", label)),
                (true, false) => styles.warn(format!("Would modify: {}", label)),
                (false, _) => styles.success(format!("No changes needed: {}", label)),
            };
            console.print(&message);
        }
    }

    if config.json {
        output_json(config, result, comparison.as_ref(), may_write && would_change)?;
    } else if comparison.is_none() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    }

    if config.verbose {
        print_summary(result, console, styles);
    }

    Ok(RunOutcome {
        dry_run: config.dry_run,
        would_change,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Watch Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Trailing-edge debounce: a burst of change events yields one render once
/// no event has arrived for the debounce interval.
#[derive(Debug)]
struct Debouncer {
    interval: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_event: None,
        }
    }

    /// Note a change at `now`; restarts the quiet period.
    fn record(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    /// True once per burst, when the quiet period has elapsed at `now`.
    fn ready(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Re-read, render and emit the watched file once
fn render_watched(
    path: &Path,
    args: &Args,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<()> {
    let raw = strip_line_terminator(read_file(path)?);
    let result = process_input(&raw, path.display().to_string(), config, console, styles)?;
    let text = result.output_text();

    match args.output {
        Some(ref output) => write_output(output, &text, config, console, styles)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    if config.verbose {
        print_summary(&result, console, styles);
    }

    Ok(())
}

/// Watch the input file and re-render on each save
fn watch_and_render(
    path: &Path,
    args: &Args,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<RunOutcome> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!(
            "--watch requires a file, not a directory: {}",
            path.display()
        );
    }
    if let Some(ref output) = args.output {
        if same_file(path, output) {
            return Err(ArgError(
                "--watch cannot write its output over the watched input".to_string(),
            )
            .into());
        }
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    // Set up file watcher
    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch file: {}", path.display()))?;

    let mut debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms));

    eprintln!(
        "Watching {} for changes (Ctrl+C to stop)...",
        path.display()
    );

    if let Err(e) = render_watched(path, args, config, console, styles) {
        eprintln!("✗ {:#}", e);
    }
    let mut renders = 1usize;

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    debouncer.record(Instant::now());
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if debouncer.ready(Instant::now()) {
            match render_watched(path, args, config, console, styles) {
                Ok(()) => {
                    renders += 1;
                    eprintln!("✓ Re-rendered {}", path.display());
                }
                Err(e) => eprintln!("✗ {:#}", e),
            }
        }
    }

    eprintln!("\nWatch mode stopped after {} render(s).", renders);

    Ok(RunOutcome {
        dry_run: false,
        would_change: false,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

fn run(args: Args) -> Result<RunOutcome> {
    let config = create_config(&args)?;
    validate_config(&config)?;
    let (console, styles) = build_console(config.color);

    if config.watch {
        let path = args
            .input
            .as_deref()
            .ok_or_else(|| ArgError("--watch requires an input file".to_string()))?;
        return watch_and_render(path, &args, &config, &console, &styles);
    }

    let (raw, source) = read_input(&args)?;
    let result = process_input(&raw, source, &config, &console, &styles)?;
    output_result(&args, &config, &console, &styles, &result)
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
                _ => exit_codes::INVALID_ARGS,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Some(command) = &args.command {
        let exit_code = match run_command(command) {
            Ok(()) => exit_codes::SUCCESS,
            Err(err) => {
                eprintln!("Error: {:#}", err);
                exit_code_for_error(&err)
            }
        };
        std::process::exit(exit_code);
    }

    let exit_code = match run(args) {
        Ok(outcome) => {
            if outcome.dry_run && outcome.would_change {
                exit_codes::WOULD_CHANGE
            } else {
                exit_codes::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code_for_error(&err)
        }
    };

    std::process::exit(exit_code);
}
