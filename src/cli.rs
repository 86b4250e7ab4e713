//! Command-line interface for tmplfix.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to fix
    pub inputs: Vec<PathBuf>,

    /// Number of spaces per nesting level
    pub indent: Option<usize>,

    /// Extra spaces inside multi-line tags
    pub inner_indent: Option<usize>,

    /// Disable reindentation
    pub no_indent: bool,

    /// Strip trailing blanks
    pub trailing_space: Option<bool>,

    /// Empty whitespace-only lines
    pub space_line: Option<bool>,

    /// Remove blanks before `|` filters
    pub pipe_prefix_spacing: Option<bool>,

    /// Remove blanks after `|` filters
    pub pipe_suffix_spacing: Option<bool>,

    /// Output to stdout instead of in-place
    pub stdout: bool,

    /// Report files that would change without writing them
    pub check: bool,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Silent mode (no output)
    pub silent: bool,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Template file extensions (in addition to configured ones)
    pub extensions: Vec<String>,

    /// Enable debug output
    pub debug: bool,
}

/// Optional boolean switch: `--name`, `--name=true` or `--name=false`
fn bool_switch(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_name("BOOL")
        .num_args(0..=1)
        .require_equals(true)
        .default_missing_value("true")
        .value_parser(clap::value_parser!(bool))
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("tmplfix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Style fixer for Twig and HTML templates")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to fix ('-' reads stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("indent")
                .short('i')
                .long("indent")
                .help("Number of spaces per nesting level [default: 4]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("inner-indent")
                .long("inner-indent")
                .help("Extra spaces for lines inside multi-line tags [default: 2]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("no-indent")
                .long("no-indent")
                .help("Disable reindentation")
                .action(ArgAction::SetTrue),
        )
        .arg(bool_switch(
            "trailing-space",
            "Enable/disable stripping of trailing blanks",
        ))
        .arg(bool_switch(
            "space-line",
            "Enable/disable emptying of whitespace-only lines",
        ))
        .arg(bool_switch(
            "pipe-prefix-spacing",
            "Enable/disable removal of blanks before '|' filters",
        ))
        .arg(bool_switch(
            "pipe-suffix-spacing",
            "Enable/disable removal of blanks after '|' filters",
        ))
        .arg(
            Arg::new("stdout")
                .short('s')
                .long("stdout")
                .help("Output to stdout instead of modifying files in-place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("List files that would change without writing them; exit 1 if any")
                .action(ArgAction::SetTrue)
                .conflicts_with("stdout"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively fix directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("extension")
                .short('x')
                .long("extension")
                .help("Additional template file extension (can be repeated, e.g., -x njk)")
                .value_name("EXT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config and per-file decisions)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (no output, for editor integration)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    };

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        indent: matches.get_one::<usize>("indent").copied(),
        inner_indent: matches.get_one::<usize>("inner-indent").copied(),
        no_indent: matches.get_flag("no-indent"),
        trailing_space: matches.get_one::<bool>("trailing-space").copied(),
        space_line: matches.get_one::<bool>("space-line").copied(),
        pipe_prefix_spacing: matches.get_one::<bool>("pipe-prefix-spacing").copied(),
        pipe_suffix_spacing: matches.get_one::<bool>("pipe-suffix-spacing").copied(),
        stdout: matches.get_flag("stdout"),
        check: matches.get_flag("check"),
        config: matches.get_one::<PathBuf>("config").cloned(),
        recursive: matches.get_flag("recursive"),
        exclude: strings("exclude"),
        extensions: strings("extension"),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
        jobs: matches.get_one::<usize>("jobs").copied(),
    }
}
