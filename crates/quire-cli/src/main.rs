use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quire_config::Config;
use quire_engine::{Editor, EditorOptions, ImagePolicy, Metrics, SanitizePolicy};

mod script;

#[derive(Parser, Debug)]
#[command(name = "quire-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.config/quire/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print the sanitized form of a markup file
    Sanitize {
        /// Markup file, `-` for stdin
        file: PathBuf,

        /// Apply the clipboard allowlist instead of the document one
        #[arg(long)]
        paste: bool,
    },
    /// Print word and character counts
    Stats {
        /// Markup file, `-` for stdin
        file: PathBuf,
    },
    /// Replay an editing script against a markup file and print the result
    Edit {
        /// Markup file, `-` for stdin
        file: PathBuf,

        /// Script file, one command per line
        script: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref()).context("Failed to load config")?;
    log::debug!("using {config:?}");
    let options = editor_options(&config);

    match cli.command {
        CliCommand::Sanitize { file, paste } => {
            let markup = read_input(&file)?;
            let policy = if paste {
                SanitizePolicy::paste().with_images(options.paste_images)
            } else {
                SanitizePolicy::document()
            };
            let policy = policy.with_image_policy(options.image_policy);
            let document = quire_engine::sanitize_document(&markup, &policy);
            println!("{}", quire_engine::serialize(&document));
        }
        CliCommand::Stats { file } => {
            let markup = read_input(&file)?;
            let editor = Editor::new(&markup, options);
            let Metrics {
                word_count,
                char_count,
            } = editor.metrics();
            println!("words: {word_count}");
            println!("chars: {char_count}");
        }
        CliCommand::Edit { file, script } => {
            let markup = read_input(&file)?;
            let source = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let steps = script::parse(&source)?;
            let mut editor = Editor::new(&markup, options);
            script::run(&mut editor, steps)?;
            println!("{}", editor.content());
        }
    }
    Ok(())
}

fn editor_options(config: &Config) -> EditorOptions {
    EditorOptions {
        history_depth: config.history_depth,
        image_policy: ImagePolicy {
            max_bytes: config.max_image_bytes,
            allowed_types: config.allowed_image_types.clone(),
        },
        paste_images: config.paste_images,
        placeholder: config.placeholder.clone(),
        read_only: false,
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut markup = String::new();
        io::stdin()
            .read_to_string(&mut markup)
            .context("Failed to read stdin")?;
        return Ok(markup);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["quire-cli", "--config", "q.toml", "sanitize", "-", "--paste"]);
        assert_eq!(cli.config, Some(PathBuf::from("q.toml")));
        assert!(matches!(cli.command, CliCommand::Sanitize { paste: true, .. }));

        let cli = Cli::parse_from(["quire-cli", "edit", "doc.html", "steps.txt"]);
        assert!(matches!(cli.command, CliCommand::Edit { .. }));
    }

    #[test]
    fn config_maps_onto_editor_options() {
        let config = Config {
            history_depth: 3,
            max_image_bytes: 10,
            allowed_image_types: vec!["png".into()],
            paste_images: true,
            placeholder: "Type".into(),
        };
        let options = editor_options(&config);
        assert_eq!(options.history_depth, 3);
        assert_eq!(options.image_policy.max_bytes, 10);
        assert!(options.image_policy.allows_mime("image/png"));
        assert!(!options.image_policy.allows_mime("image/gif"));
        assert!(options.paste_images);
        assert_eq!(options.placeholder, "Type");
    }

    #[test]
    fn reads_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.html");
        std::fs::write(&path, "<p>x</p>").unwrap();
        assert_eq!(read_input(&path).unwrap(), "<p>x</p>");
        assert!(read_input(&dir.path().join("missing.html")).is_err());
    }
}
