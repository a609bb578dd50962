//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Merging arguments over the configuration file and saved presets
//! - Driving a run and rendering its progress and results
//! - Managing saved presets

use crate::classifier::{ClassifierError, DelimiterSpec, extract_category};
use crate::config::{
    AppConfig, ConfigError, DelimiterPreset, DelimiterPresets, ExtensionProfiles,
};
use crate::orchestrator::{ClassificationMode, ExtensionInput, Orchestrator, RunRequest};
use crate::output::OutputFormatter;
use crate::report::{BatchResult, RunEvent};
use crate::scanner::ScanPolicy;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(name = "dirsort", version)]
#[command(about = "Sort files into category folders by extension or by a delimited part of their name")]
pub struct Cli {
    /// Configuration file (defaults to ./.dirsortrc.toml, then ~/.config/dirsort/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sort files by extension
    Extension {
        #[command(flatten)]
        run: RunArgs,
        /// JSON file of "ext": "Category" pairs
        #[arg(long, value_name = "PATH")]
        map_file: Option<PathBuf>,
        /// Saved extension profile to use
        #[arg(long, conflicts_with = "map_file")]
        profile: Option<String>,
    },
    /// Sort files by the text between two delimiters in their name
    Delimiter {
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        delimiter: DelimiterArgs,
    },
    /// Sort using the mode from the configuration file
    Run {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Show which category a file name would get in delimiter mode
    Preview {
        file_name: String,
        #[command(flatten)]
        delimiter: DelimiterArgs,
    },
    /// List or edit saved presets
    Presets {
        #[command(subcommand)]
        action: Option<PresetAction>,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Folder to read files from
    pub source: PathBuf,
    /// Folder that receives the category folders
    pub target: PathBuf,
    /// Remove each source file after it was copied
    #[arg(long = "move")]
    pub move_files: bool,
    /// Only look at files directly inside the source folder
    #[arg(long)]
    pub flat: bool,
    /// Descend at most N levels (1 is the same as --flat)
    #[arg(long, value_name = "N", conflicts_with = "flat")]
    pub max_depth: Option<usize>,
    /// Write the run result as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Default, Args)]
pub struct DelimiterArgs {
    /// Saved delimiter preset to start from
    #[arg(long)]
    pub preset: Option<String>,
    #[arg(long)]
    pub start_token: Option<String>,
    #[arg(long)]
    pub end_token: Option<String>,
    /// Occurrence of the start token, or -1 for the start of the name
    #[arg(long, allow_negative_numbers = true)]
    pub start_pos: Option<i32>,
    /// Occurrence of the end token, or -1 for the end of the name
    #[arg(long, allow_negative_numbers = true)]
    pub end_pos: Option<i32>,
}

#[derive(Debug, Subcommand)]
pub enum PresetAction {
    /// List saved extension profiles and delimiter presets
    List,
    /// Add or change an extension mapping in a profile
    Map {
        extension: String,
        category: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Remove an extension mapping from a profile
    Unmap {
        extension: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Save a delimiter preset
    AddDelimiter {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        example: String,
        #[command(flatten)]
        delimiter: DelimiterArgs,
    },
    /// Delete a delimiter preset
    RemoveDelimiter { name: String },
}

/// Errors surfaced to the user by the command line.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("Could not read extension map {}: {source}", path.display())]
    MapFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("A classification is already running")]
    Busy,
    #[error("{0}")]
    Run(String),
}

/// Runs the CLI application.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["dirsort", "extension", "/path/to/source", "/path/to/target"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Extension {
            run,
            map_file,
            profile,
        } => {
            let mut request = base_request(&run, &config);
            request.mode = ClassificationMode::Extension;
            request.extensions = resolve_extensions(&config, map_file, profile.as_deref())?;
            execute(request, run.report)
        }
        Command::Delimiter { run, delimiter } => {
            let mut request = base_request(&run, &config);
            request.mode = ClassificationMode::Delimiter;
            request.delimiter = resolve_delimiter(&delimiter, &config)?;
            execute(request, run.report)
        }
        Command::Run { run } => {
            let mut request = base_request(&run, &config);
            request.mode = config.run.mode;
            match request.mode {
                ClassificationMode::Extension => {
                    request.extensions = resolve_extensions(&config, None, None)?
                }
                ClassificationMode::Delimiter => request.delimiter = config.delimiter.clone(),
            }
            execute(request, run.report)
        }
        Command::Preview {
            file_name,
            delimiter,
        } => preview(&file_name, &resolve_delimiter(&delimiter, &config)?),
        Command::Presets { action } => manage_presets(&config, action.unwrap_or(PresetAction::List)),
    }
}

fn base_request(run: &RunArgs, config: &AppConfig) -> RunRequest {
    let mut request = RunRequest::new(&run.source, &run.target);
    request.scan = resolve_scan_policy(run, config);
    request.delete_source = run.move_files || config.run.delete_source;
    request
}

/// Command line switches win over the configuration file.
pub(crate) fn resolve_scan_policy(run: &RunArgs, config: &AppConfig) -> ScanPolicy {
    if run.flat {
        ScanPolicy::Flat
    } else if let Some(depth) = run.max_depth {
        ScanPolicy::Bounded(depth)
    } else {
        config.scan.policy()
    }
}

/// Starts from the named preset (or the configured delimiter) and applies overrides.
pub(crate) fn resolve_delimiter(
    args: &DelimiterArgs,
    config: &AppConfig,
) -> Result<DelimiterSpec, CliError> {
    let mut spec = match &args.preset {
        Some(name) => {
            let mut presets = DelimiterPresets::new(config.presets_dir());
            presets.load()?;
            presets
                .get(name)
                .map(DelimiterPreset::spec)
                .ok_or_else(|| ConfigError::PresetNotFound(name.clone()))?
        }
        None => config.delimiter.clone(),
    };

    if let Some(token) = &args.start_token {
        spec.start_token = token.clone();
    }
    if let Some(token) = &args.end_token {
        spec.end_token = token.clone();
    }
    if let Some(pos) = args.start_pos {
        spec.start_pos = pos;
    }
    if let Some(pos) = args.end_pos {
        spec.end_pos = pos;
    }
    Ok(spec)
}

/// Picks the extension map: a map file, a named profile, the saved default
/// profile, or the built-in table, in that order.
pub(crate) fn resolve_extensions(
    config: &AppConfig,
    map_file: Option<PathBuf>,
    profile: Option<&str>,
) -> Result<ExtensionInput, CliError> {
    if let Some(path) = map_file {
        let text = fs::read_to_string(&path).map_err(|e| CliError::MapFile {
            path: path.clone(),
            source: e,
        })?;
        return Ok(ExtensionInput::Serialized(text));
    }

    let mut profiles = ExtensionProfiles::new(config.presets_dir());
    if let Some(name) = profile {
        profiles.load(Some(name))?;
        info!(profile = name, mappings = profiles.extensions().len(), "using extension profile");
        return Ok(ExtensionInput::Parsed(profiles.extension_map()));
    }

    match profiles.load(None) {
        Ok(()) => Ok(ExtensionInput::Parsed(profiles.extension_map())),
        Err(ConfigError::ConfigNotFound(path)) => {
            debug!(path = %path.display(), "no saved extension profiles, using built-in table");
            Ok(ExtensionInput::default())
        }
        Err(e) => {
            warn!(error = %e, "saved extension profiles unusable, using built-in table");
            Ok(ExtensionInput::default())
        }
    }
}

fn execute(request: RunRequest, report: Option<PathBuf>) -> Result<(), CliError> {
    OutputFormatter::info(&format!(
        "Sorting {} into {}",
        request.source_dir.display(),
        request.target_dir.display()
    ));

    let orchestrator = Orchestrator::new();
    let handle = orchestrator.start(request).ok_or(CliError::Busy)?;

    let pb = OutputFormatter::create_progress_bar();
    let event = handle.wait(|percent, message| {
        pb.set_position(u64::from(percent));
        pb.set_message(message.to_string());
    });
    pb.finish_and_clear();

    match event {
        RunEvent::Completed(result) => {
            print_result(&result);
            if let Some(path) = report {
                write_report(&result, &path)?;
                OutputFormatter::plain(&format!("Report written to {}", path.display()));
            }
            Ok(())
        }
        RunEvent::Failed(message) => Err(CliError::Run(message)),
        RunEvent::Progress { .. } => Err(CliError::Run("run ended without a result".to_string())),
    }
}

fn print_result(result: &BatchResult) {
    if result.total_files == 0 {
        OutputFormatter::warning("No files found");
        return;
    }

    OutputFormatter::summary_table(result);
    OutputFormatter::failure_list(&result.failed_files);

    if result.failed_count > 0 {
        OutputFormatter::warning(&format!(
            "{} of {} files could not be sorted",
            result.failed_count, result.total_files
        ));
    } else {
        OutputFormatter::success("Classification complete");
    }
}

pub(crate) fn write_report(result: &BatchResult, path: &std::path::Path) -> Result<(), CliError> {
    let json = result.to_json()?;
    fs::write(path, json).map_err(|e| CliError::Report {
        path: path.to_path_buf(),
        source: e,
    })
}

fn preview(file_name: &str, spec: &DelimiterSpec) -> Result<(), CliError> {
    spec.validate()?;
    match extract_category(spec, file_name) {
        Some(category) => OutputFormatter::success(&format!("{} -> {}", file_name, category)),
        None => OutputFormatter::warning(&format!(
            "{}: no category between '{}' #{} and '{}' #{}",
            file_name, spec.start_token, spec.start_pos, spec.end_token, spec.end_pos
        )),
    }
    Ok(())
}

fn manage_presets(config: &AppConfig, action: PresetAction) -> Result<(), CliError> {
    let dir = config.presets_dir();
    match action {
        PresetAction::List => list_presets(config),
        PresetAction::Map {
            extension,
            category,
            profile,
        } => {
            let mut profiles = load_profile_for_edit(&dir, profile.as_deref())?;
            profiles.add_mapping(&extension, &category)?;
            profiles.save()?;
            OutputFormatter::success(&format!(
                "{} -> {} saved in profile '{}'",
                extension,
                category,
                profiles.current_profile()
            ));
            Ok(())
        }
        PresetAction::Unmap { extension, profile } => {
            let mut profiles = load_profile_for_edit(&dir, profile.as_deref())?;
            profiles.delete_mapping(&extension)?;
            profiles.save()?;
            OutputFormatter::success(&format!(
                "{} removed from profile '{}'",
                extension,
                profiles.current_profile()
            ));
            Ok(())
        }
        PresetAction::AddDelimiter {
            name,
            description,
            example,
            delimiter,
        } => {
            let mut presets = DelimiterPresets::new(&dir);
            match presets.load() {
                Ok(()) | Err(ConfigError::ConfigNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
            let spec = resolve_delimiter(&delimiter, config)?;
            presets.add(DelimiterPreset {
                name: name.clone(),
                description,
                delimiter_start: spec.start_token,
                delimiter_end: spec.end_token,
                start_pos: spec.start_pos,
                end_pos: spec.end_pos,
                preview_example: example,
            })?;
            OutputFormatter::success(&format!("Preset '{}' saved", name));
            Ok(())
        }
        PresetAction::RemoveDelimiter { name } => {
            let mut presets = DelimiterPresets::new(&dir);
            presets.load()?;
            presets.delete(&name)?;
            OutputFormatter::success(&format!("Preset '{}' deleted", name));
            Ok(())
        }
    }
}

/// Loads a profile for editing. A missing store or profile starts empty.
fn load_profile_for_edit(
    dir: &std::path::Path,
    profile: Option<&str>,
) -> Result<ExtensionProfiles, CliError> {
    let mut profiles = ExtensionProfiles::new(dir);
    match profiles.load(profile) {
        Ok(()) => {}
        Err(ConfigError::ConfigNotFound(_)) | Err(ConfigError::ProfileNotFound(_)) => {
            profiles.clear();
            if let Some(name) = profile {
                profiles.set_profile(name);
            }
        }
        Err(e) => return Err(e.into()),
    }
    Ok(profiles)
}

fn list_presets(config: &AppConfig) -> Result<(), CliError> {
    let dir = config.presets_dir();

    OutputFormatter::header("EXTENSION PROFILES");
    let mut profiles = ExtensionProfiles::new(&dir);
    match profiles.load(None) {
        Ok(()) | Err(ConfigError::ProfileNotFound(_)) => {
            for name in profiles.profiles() {
                OutputFormatter::plain(&format!("  {}", name));
            }
        }
        Err(ConfigError::ConfigNotFound(_)) => {
            OutputFormatter::plain("  (none saved, the built-in table is used)")
        }
        Err(e) => OutputFormatter::warning(&e.to_string()),
    }

    OutputFormatter::header("DELIMITER PRESETS");
    let mut presets = DelimiterPresets::new(&dir);
    match presets.load() {
        Ok(()) if presets.presets().is_empty() => OutputFormatter::plain("  (none saved)"),
        Ok(()) => {
            for preset in presets.presets() {
                let mut line = format!(
                    "  {}: '{}' #{} .. '{}' #{}",
                    preset.name,
                    preset.delimiter_start,
                    preset.start_pos,
                    preset.delimiter_end,
                    preset.end_pos
                );
                if !preset.description.is_empty() {
                    line.push_str(&format!(" ({})", preset.description));
                }
                if !preset.preview_example.is_empty() {
                    let category = extract_category(&preset.spec(), &preset.preview_example)
                        .unwrap_or_else(|| "-".to_string());
                    line.push_str(&format!(" e.g. {} -> {}", preset.preview_example, category));
                }
                OutputFormatter::plain(&line);
            }
        }
        Err(ConfigError::ConfigNotFound(_)) => OutputFormatter::plain("  (none saved)"),
        Err(e) => OutputFormatter::warning(&e.to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    fn config_with_presets(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.presets.dir = Some(dir.to_path_buf());
        config
    }

    #[test]
    fn test_parse_extension_command() {
        let cli = parse(&[
            "dirsort", "-vv", "extension", "src", "dst", "--move", "--max-depth", "3",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Extension { run, .. } => {
                assert!(run.move_files);
                assert_eq!(
                    resolve_scan_policy(&run, &AppConfig::default()),
                    ScanPolicy::Bounded(3)
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_flat_conflicts_with_max_depth() {
        let result = Cli::try_parse_from(["dirsort", "delimiter", "a", "b", "--flat", "--max-depth", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_policy_falls_back_to_config() {
        let cli = parse(&["dirsort", "run", "a", "b"]);
        let Command::Run { run } = cli.command else {
            panic!("expected run command");
        };
        let mut config = AppConfig::default();
        config.scan.recursive = false;
        assert_eq!(resolve_scan_policy(&run, &config), ScanPolicy::Flat);
    }

    #[test]
    fn test_delimiter_overrides_accept_negative_positions() {
        let cli = parse(&[
            "dirsort", "preview", "a_b_c.txt", "--start-pos", "-1", "--end-pos", "1",
        ]);
        let Command::Preview { delimiter, .. } = cli.command else {
            panic!("expected preview command");
        };
        let spec = resolve_delimiter(&delimiter, &AppConfig::default()).unwrap();
        assert_eq!(spec, DelimiterSpec::new("_", "_", -1, 1));
        assert_eq!(extract_category(&spec, "a_b_c.txt"), Some("a".to_string()));
    }

    #[test]
    fn test_delimiter_from_preset() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config_with_presets(temp_dir.path());
        let mut presets = DelimiterPresets::new(temp_dir.path());
        presets
            .add(DelimiterPreset {
                name: "dash".to_string(),
                description: String::new(),
                delimiter_start: "-".to_string(),
                delimiter_end: "-".to_string(),
                start_pos: 1,
                end_pos: -1,
                preview_example: String::new(),
            })
            .unwrap();

        let args = DelimiterArgs {
            preset: Some("dash".to_string()),
            end_token: Some(".".to_string()),
            ..Default::default()
        };
        let spec = resolve_delimiter(&args, &config).unwrap();
        assert_eq!(spec, DelimiterSpec::new("-", ".", 1, -1));

        let missing = DelimiterArgs {
            preset: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_delimiter(&missing, &config),
            Err(CliError::Config(ConfigError::PresetNotFound(_)))
        ));
    }

    #[test]
    fn test_extensions_default_to_builtin_table() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config_with_presets(temp_dir.path());
        let input = resolve_extensions(&config, None, None).unwrap();
        assert!(matches!(input, ExtensionInput::Parsed(map) if map.get("png").is_some()));
    }

    #[test]
    fn test_extensions_from_profile_and_map_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config_with_presets(temp_dir.path());

        let mut profiles = ExtensionProfiles::new(temp_dir.path());
        profiles.set_profile("work");
        profiles.add_mapping("xlsx", "Sheets").unwrap();
        profiles.save().unwrap();

        let input = resolve_extensions(&config, None, Some("work")).unwrap();
        assert!(matches!(input, ExtensionInput::Parsed(map) if map.get("xlsx") == Some("Sheets")));
        assert!(resolve_extensions(&config, None, Some("home")).is_err());

        let map_file = temp_dir.path().join("map.json");
        fs::write(&map_file, r#"{"txt": "Notes"}"#).unwrap();
        let input = resolve_extensions(&config, Some(map_file), None).unwrap();
        assert!(matches!(input, ExtensionInput::Serialized(text) if text.contains("Notes")));

        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            resolve_extensions(&config, Some(missing), None),
            Err(CliError::MapFile { .. })
        ));
    }

    #[test]
    fn test_write_report() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("report.json");
        let mut result = BatchResult::new();
        result.finish();

        write_report(&result, &path).expect("Failed to write report");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["success_count"], 0);
        assert!(value["finished_at"].is_string());
    }

    #[test]
    fn test_presets_map_and_unmap() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config_with_presets(temp_dir.path());

        manage_presets(
            &config,
            PresetAction::Map {
                extension: ".HEIC".to_string(),
                category: "Phone Photos".to_string(),
                profile: None,
            },
        )
        .unwrap();

        let mut profiles = ExtensionProfiles::new(temp_dir.path());
        profiles.load(None).unwrap();
        assert_eq!(profiles.category("heic"), Some("Phone Photos"));

        manage_presets(
            &config,
            PresetAction::Unmap {
                extension: "heic".to_string(),
                profile: None,
            },
        )
        .unwrap();
        profiles.load(None).unwrap();
        assert_eq!(profiles.category("heic"), None);
    }

    #[test]
    fn test_presets_add_and_remove_delimiter() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config_with_presets(temp_dir.path());

        manage_presets(
            &config,
            PresetAction::AddDelimiter {
                name: "dates".to_string(),
                description: "date segment".to_string(),
                example: "img_2024_01.png".to_string(),
                delimiter: DelimiterArgs::default(),
            },
        )
        .unwrap();

        let mut presets = DelimiterPresets::new(temp_dir.path());
        presets.load().unwrap();
        assert_eq!(presets.names(), vec!["dates"]);

        manage_presets(
            &config,
            PresetAction::RemoveDelimiter {
                name: "dates".to_string(),
            },
        )
        .unwrap();
        presets.load().unwrap();
        assert!(presets.names().is_empty());
    }
}
