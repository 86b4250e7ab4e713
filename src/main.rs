//! tmplfix - Style fixer for Twig and HTML templates

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs::File;
use std::io::{self, BufReader, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use glob::Pattern;
use rayon::prelude::*;
use tmplfix::process::format_file;
use tmplfix::{build_cli, find_directive, parse_args, CliArgs, Config, Result, Rule};
use tracing::{debug, warn, Level};
use walkdir::WalkDir;

/// Default maximum file size in bytes (100 MB)
/// Files larger than this are skipped to prevent memory exhaustion
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Outcome of processing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStatus {
    Unchanged,
    Changed,
    Skipped,
}

/// Totals across all processed files
#[derive(Default)]
struct Summary {
    changed: AtomicUsize,
    unchanged: AtomicUsize,
    skipped: AtomicUsize,
    errors: AtomicUsize,
}

impl Summary {
    fn record(&self, status: FileStatus) {
        let counter = match status {
            FileStatus::Unchanged => &self.unchanged,
            FileStatus::Changed => &self.changed,
            FileStatus::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() -> Result<ExitCode> {
    let args = parse_args();
    init_tracing(args.debug);

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    // If no inputs and running interactively, print usage; otherwise read from stdin
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        build_cli().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    }

    if use_stdin {
        let config = build_config(&args, None)?;
        let status = process_stdin(&config, &args)?;
        return Ok(exit_code(&args, status == FileStatus::Changed, false));
    }

    // For explicit config files, we use one config for all files
    // For auto-discovery, each file may have its own config
    let cwd_config = build_config(&args, None)?;
    let base_config = args.config.as_ref().map(|_| cwd_config.clone());

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                warn!("failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args, &cwd_config.extensions);

    if files.is_empty() {
        if !args.silent {
            eprintln!("No template files found to fix.");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let summary = Summary::default();
    // Sequential for stdout so outputs don't interleave
    if args.stdout || args.jobs == Some(1) {
        files
            .iter()
            .for_each(|path| process_path(path, base_config.as_ref(), &args, &summary));
    } else {
        files
            .par_iter()
            .for_each(|path| process_path(path, base_config.as_ref(), &args, &summary));
    }

    print_summary(&summary, &args);

    let changed = summary.changed.load(Ordering::Relaxed) > 0;
    let failed = summary.errors.load(Ordering::Relaxed) > 0;
    Ok(exit_code(&args, changed, failed))
}

/// Install the stderr log subscriber
fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Warning: failed to install logger: {e}");
    }
}

fn exit_code(args: &CliArgs, changed: bool, failed: bool) -> ExitCode {
    if is_failure(args, changed, failed) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Errors always fail; changes only fail under `--check`
fn is_failure(args: &CliArgs, changed: bool, failed: bool) -> bool {
    failed || (args.check && changed)
}

/// Build configuration from CLI args and optional config file
///
/// If `for_path` is provided and no explicit config file is specified,
/// uses auto-discovery to find config files in parent directories.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        debug!(path = %config_path.display(), "using explicit config file");
        Config::from_toml_file(config_path)?
    } else {
        let start = match for_path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir().unwrap_or_default(),
        };
        let discovered = Config::discover_config_files(&start);
        debug!(
            start = %start.display(),
            files = ?discovered,
            "discovered config files"
        );
        Config::from_discovered_files(&start)
    };

    // Override with CLI arguments
    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    if let Some(inner_indent) = args.inner_indent {
        config.inner_indent = inner_indent;
    }
    if args.no_indent {
        config.set_rule(Rule::Indent, false);
    }
    let switches = [
        (Rule::TrailingSpace, args.trailing_space),
        (Rule::SpaceLine, args.space_line),
        (Rule::PipePrefixSpacing, args.pipe_prefix_spacing),
        (Rule::PipeSuffixSpacing, args.pipe_suffix_spacing),
    ];
    for (rule, value) in switches {
        if let Some(enabled) = value {
            config.set_rule(rule, enabled);
        }
    }
    for ext in &args.extensions {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        if !config.extensions.iter().any(|known| known == ext) {
            config.extensions.push(ext.to_string());
        }
    }

    debug!(?config, "resolved configuration");

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Collect all files to process, handling directories and recursive flag
fn collect_files(args: &CliArgs, extensions: &[String]) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("ignoring exclude pattern '{p}': {e}");
                None
            }
        })
        .collect();

    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_file() {
            // Explicit files are taken whatever their extension
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            // Symlink loops surface as walk errors and are skipped
            let max_depth = if args.recursive { 256 } else { 1 };
            for entry in WalkDir::new(input)
                .follow_links(true)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                let path = entry.path();
                if path.is_file()
                    && is_template_file(path, extensions)
                    && !is_excluded(path, &exclude_patterns)
                {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            warn!("no such file or directory: {}", input.display());
        }
    }

    files
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    for pattern in patterns {
        if pattern.matches(&path_str) {
            return true;
        }

        if let Some(file_name) = path.file_name() {
            if pattern.matches(&file_name.to_string_lossy()) {
                return true;
            }
        }

        // Directory patterns match any component
        for component in path.components() {
            if let std::path::Component::Normal(c) = component {
                if pattern.matches(&c.to_string_lossy()) {
                    return true;
                }
            }
        }
    }

    false
}

/// Check if a file has one of the template extensions (with or without leading dot)
fn is_template_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|known| known.strip_prefix('.').unwrap_or(known) == ext)
        })
}

/// Resolve the config for one file and process it, recording the outcome
fn process_path(path: &Path, base_config: Option<&Config>, args: &CliArgs, summary: &Summary) {
    let file_result = match base_config {
        Some(config) => process_single_file(path, config, args),
        None => build_config(args, Some(path))
            .and_then(|config| process_single_file(path, &config, args)),
    };

    match file_result {
        Ok(status) => summary.record(status),
        Err(e) => {
            summary.errors.fetch_add(1, Ordering::Relaxed);
            eprintln!("Error fixing {}: {e:#}", path.display());
        }
    }
}

fn print_summary(summary: &Summary, args: &CliArgs) {
    if args.silent || args.stdout {
        return;
    }
    let changed = summary.changed.load(Ordering::Relaxed);
    let unchanged = summary.unchanged.load(Ordering::Relaxed);
    let skipped = summary.skipped.load(Ordering::Relaxed);
    let errors = summary.errors.load(Ordering::Relaxed);

    let verb = if args.check { "would fix" } else { "fixed" };
    let mut line = format!("{changed} files {verb}, {unchanged} unchanged");
    if skipped > 0 {
        line.push_str(&format!(", {skipped} skipped"));
    }
    if errors > 0 {
        line.push_str(&format!(", {errors} errors"));
    }
    eprintln!("{line}.");
}

/// Apply directive overrides from file contents to a configuration
fn apply_directive_overrides(config: &mut Config, contents: &[u8], source_name: &str) -> Result<()> {
    let cursor = Cursor::new(contents);
    if let Some(overrides) = find_directive(&mut BufReader::new(cursor)) {
        debug!(source = source_name, ?overrides, "found file directive");
        overrides.apply_to(config);
        if let Some(error) = config.validate() {
            anyhow::bail!("Invalid directive in {source_name}: {error}");
        }
    }
    Ok(())
}

/// Fix one buffer with its directive applied
fn fix_contents(contents: &[u8], config: &Config, source_name: &str) -> Result<Vec<u8>> {
    let mut file_config = config.clone();
    apply_directive_overrides(&mut file_config, contents, source_name)?;

    let reader = BufReader::new(Cursor::new(contents));
    let mut output = Vec::with_capacity(contents.len());
    format_file(reader, &mut output, &file_config, source_name)?;
    Ok(output)
}

/// Process a single file
fn process_single_file(path: &Path, config: &Config, args: &CliArgs) -> Result<FileStatus> {
    // Check file size BEFORE reading to prevent memory exhaustion
    let file_size = std::fs::metadata(path)?.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        if !args.silent {
            eprintln!(
                "Skipping {} ({} MB exceeds limit of {} MB)",
                path.display(),
                file_size / (1024 * 1024),
                DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
            );
        }
        return Ok(FileStatus::Skipped);
    }

    let mut file_contents = Vec::new();
    File::open(path)?.read_to_end(&mut file_contents)?;

    let source_name = path.to_string_lossy();
    let output = fix_contents(&file_contents, config, &source_name)?;
    let status = if output == file_contents {
        FileStatus::Unchanged
    } else {
        FileStatus::Changed
    };
    debug!(file = %source_name, ?status, "processed");

    if args.stdout {
        io::stdout().lock().write_all(&output)?;
    } else if args.check {
        if status == FileStatus::Changed && !args.silent {
            println!("{}", path.display());
        }
    } else if status == FileStatus::Changed {
        std::fs::write(path, &output)?;
        if !args.silent {
            eprintln!("Fixed: {}", path.display());
        }
    }

    Ok(status)
}

/// Process input from stdin, output to stdout
fn process_stdin(config: &Config, args: &CliArgs) -> Result<FileStatus> {
    let mut stdin_contents = Vec::new();
    io::stdin()
        .take(DEFAULT_MAX_FILE_SIZE + 1)
        .read_to_end(&mut stdin_contents)?;

    if u64::try_from(stdin_contents.len()).unwrap_or(u64::MAX) > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large (exceeds limit of {} MB)",
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    let output = fix_contents(&stdin_contents, config, "stdin")?;
    let status = if output == stdin_contents {
        FileStatus::Unchanged
    } else {
        FileStatus::Changed
    };

    if !args.check {
        io::stdout().write_all(&output)?;
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_template_file() {
        let extensions = vec!["twig".to_string(), ".html".to_string()];
        assert!(is_template_file(Path::new("a/page.twig"), &extensions));
        assert!(is_template_file(Path::new("index.html"), &extensions));
        assert!(!is_template_file(Path::new("style.css"), &extensions));
        assert!(!is_template_file(Path::new("Makefile"), &extensions));
    }

    #[test]
    fn test_is_excluded() {
        let patterns = vec![
            Pattern::new("vendor").unwrap(),
            Pattern::new("*.min.html").unwrap(),
        ];
        assert!(is_excluded(Path::new("app/vendor/x.twig"), &patterns));
        assert!(is_excluded(Path::new("public/app.min.html"), &patterns));
        assert!(!is_excluded(Path::new("templates/base.twig"), &patterns));
        assert!(!is_excluded(Path::new("vendor.twig"), &[]));
    }

    #[test]
    fn test_fix_contents_applies_directive() {
        let input = b"{# tmplfix: -i 2 #}\n<div>\nx\n</div>\n";
        let output = fix_contents(input, &Config::default(), "test").unwrap();
        assert_eq!(output, b"{# tmplfix: -i 2 #}\n<div>\n  x\n</div>\n");
    }

    #[test]
    fn test_fix_contents_rejects_invalid_directive() {
        let input = b"{# tmplfix: -i 0 #}\n<div>\n</div>\n";
        assert!(fix_contents(input, &Config::default(), "test").is_err());
    }

    #[test]
    fn test_is_failure() {
        let check = tmplfix::parse_args_from(["tmplfix", "--check", "a.twig"]);
        let write = tmplfix::parse_args_from(["tmplfix", "a.twig"]);
        assert!(is_failure(&check, true, false));
        assert!(!is_failure(&check, false, false));
        assert!(!is_failure(&write, true, false));
        assert!(is_failure(&write, false, true));
    }
}
