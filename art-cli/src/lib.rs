//! # Emoji Art CLI
//!
//! Command-line host for emoji art documents.
//!
//! ## Usage
//!
//! ```bash
//! emoji-art new art.json --background https://example.com/sky.png
//! emoji-art apply art.json script.jsonl
//! emoji-art show art.json --resolve
//! emoji-art fit art.json --width 1280 --height 720
//! ```
//!
//! Scripts hold one JSON intent per line, for example
//! `{"intent":"add_emoji","glyph":"😀","position":{"x":0,"y":0},"size":40}`.
//! Blank lines and lines starting with `#` are skipped.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use art_core::{ArtDocument, Background, FetchStatus, Size, Url, ViewTransform};
use art_document::{ControllerConfig, DocumentController, Intent, IntentOutcome, LoaderConfig};
use clap::{Parser, Subcommand};
use serde::Serialize;

/// Command-line arguments for emoji-art.
#[derive(Debug, Clone, Parser)]
#[command(name = "emoji-art")]
#[command(about = "Create, edit and inspect emoji art documents")]
#[command(version)]
pub struct CliArgs {
    /// User agent for background image requests
    #[arg(long, env = "EMOJI_ART_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Per-request timeout for background images, in seconds
    #[arg(long, env = "EMOJI_ART_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum number of undo steps kept while applying a script
    #[arg(long, env = "EMOJI_ART_HISTORY_LIMIT", default_value_t = art_core::DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an empty document
    New {
        /// Where to write the document
        path: PathBuf,
        /// Remote background image URL
        #[arg(long)]
        background: Option<Url>,
    },
    /// Print a summary of a document
    Show {
        /// Document to read
        path: PathBuf,
        /// Load the background image and report the outcome
        #[arg(long)]
        resolve: bool,
    },
    /// Apply a script of intents and save the result
    Apply {
        /// Document to edit
        path: PathBuf,
        /// File with one JSON intent per line
        script: PathBuf,
        /// Write the result here instead of over the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compute the zoom that fits the background into a viewport
    Fit {
        /// Document to read
        path: PathBuf,
        /// Viewport width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Viewport height in pixels
        #[arg(long, default_value = "720")]
        height: u32,
    },
}

impl From<&CliArgs> for ControllerConfig {
    fn from(args: &CliArgs) -> Self {
        let mut loader = LoaderConfig::default();
        if let Some(user_agent) = &args.user_agent {
            loader.user_agent.clone_from(user_agent);
        }
        loader.request_timeout = args.timeout_secs.map(Duration::from_secs);
        Self {
            history_limit: args.history_limit,
            loader,
        }
    }
}

/// Summary printed by `show`.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    /// Background description.
    pub background: String,
    /// Number of emojis.
    pub emojis: usize,
    /// Last issued emoji id.
    pub last_emoji_id: u64,
    /// Fetch status, when the background was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_status: Option<FetchStatus>,
    /// Resolved image size, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<(u32, u32)>,
}

/// Run a parsed command, returning what to print.
///
/// # Errors
///
/// Fails on unreadable or corrupt documents, unwritable output, malformed
/// scripts and rejected intents.
pub async fn run(args: &CliArgs) -> anyhow::Result<String> {
    let config = ControllerConfig::from(args);
    match &args.command {
        Command::New { path, background } => {
            let mut document = ArtDocument::new();
            if let Some(url) = background {
                document.set_background(Background::RemoteUrl(url.clone()));
            }
            save(path, &document).await?;
            tracing::info!(path = %path.display(), "Created document");
            Ok(format!("created {}", path.display()))
        }
        Command::Show { path, resolve } => {
            let document = load(path).await?;
            let summary = if *resolve {
                let controller = controller(document, &config)?;
                let status = controller.wait_until_settled().await;
                let image = controller
                    .background_image()
                    .map(|image| (image.width, image.height));
                summarize(controller.document(), Some(status), image)
            } else {
                summarize(&document, None, None)
            };
            Ok(serde_json::to_string_pretty(&summary)?)
        }
        Command::Apply {
            path,
            script,
            output,
        } => {
            let document = load(path).await?;
            let script = tokio::fs::read_to_string(script)
                .await
                .with_context(|| format!("reading script {}", script.display()))?;
            let mut controller = controller(document, &config)?;
            let outcomes = apply_script(&mut controller, &script)?;
            let target = output.as_deref().unwrap_or(path);
            save(target, controller.document()).await?;
            let mut report = outcomes
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            report.push(format!("saved {}", target.display()));
            Ok(report.join("\n"))
        }
        Command::Fit {
            path,
            width,
            height,
        } => {
            let document = load(path).await?;
            let controller = controller(document, &config)?;
            let status = controller.wait_until_settled().await;
            let viewport = Size::new(f64::from(*width), f64::from(*height));
            let view = controller.zoom_to_fit(viewport).unwrap_or_else(|| {
                tracing::info!(status = %status, "No background image to fit, keeping default view");
                ViewTransform::default()
            });
            Ok(serde_json::to_string_pretty(&view)?)
        }
    }
}

/// Apply each intent line of `script` in order.
///
/// # Errors
///
/// Stops at the first line that does not parse or whose intent is rejected;
/// intents before it stay applied.
pub fn apply_script(
    controller: &mut DocumentController,
    script: &str,
) -> anyhow::Result<Vec<IntentOutcome>> {
    let mut outcomes = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let number = index + 1;
        let intent: Intent =
            serde_json::from_str(line).with_context(|| format!("line {number}: malformed intent"))?;
        tracing::debug!(line = number, ?intent, "Applying intent");
        let outcome = controller
            .apply(intent)
            .with_context(|| format!("line {number}: intent rejected"))?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn controller(document: ArtDocument, config: &ControllerConfig) -> anyhow::Result<DocumentController> {
    DocumentController::with_http(document, tokio::runtime::Handle::current(), config)
        .context("building HTTP client")
}

fn summarize(
    document: &ArtDocument,
    fetch_status: Option<FetchStatus>,
    image: Option<(u32, u32)>,
) -> DocumentSummary {
    DocumentSummary {
        background: document.background().to_string(),
        emojis: document.emojis().len(),
        last_emoji_id: document.last_emoji_id(),
        fetch_status,
        image,
    }
}

async fn load(path: &Path) -> anyhow::Result<ArtDocument> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    art_core::deserialize(&bytes).with_context(|| format!("decoding {}", path.display()))
}

async fn save(path: &Path, document: &ArtDocument) -> anyhow::Result<()> {
    let bytes = art_core::serialize(document)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use art_core::{EmojiId, Position};

    fn args(command: Command) -> CliArgs {
        CliArgs {
            user_agent: None,
            timeout_secs: None,
            history_limit: 10,
            command,
        }
    }

    #[test]
    fn test_cli_parses_env_style_flags() {
        let args = CliArgs::parse_from([
            "emoji-art",
            "--user-agent",
            "tester/1.0",
            "--timeout-secs",
            "5",
            "fit",
            "art.json",
            "--width",
            "640",
        ]);
        let config = ControllerConfig::from(&args);
        assert_eq!(config.loader.user_agent, "tester/1.0");
        assert_eq!(config.loader.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.history_limit, art_core::DEFAULT_HISTORY_LIMIT);
        match args.command {
            Command::Fit { width, height, .. } => assert_eq!((width, height), (640, 720)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_apply_show() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("art.json");
        let script = dir.path().join("script.jsonl");
        std::fs::write(
            &script,
            concat!(
                "# a smiley that wanders\n",
                r#"{"intent":"add_emoji","glyph":"😀","position":{"x":0,"y":0},"size":40}"#,
                "\n",
                r#"{"intent":"move_emoji","id":1,"offset":{"dx":10,"dy":-5}}"#,
                "\n\n",
                r#"{"intent":"undo"}"#,
                "\n",
                r#"{"intent":"redo"}"#,
                "\n",
            ),
        )
        .expect("write script");

        run(&args(Command::New {
            path: doc.clone(),
            background: None,
        }))
        .await
        .expect("new");

        let report = run(&args(Command::Apply {
            path: doc.clone(),
            script,
            output: None,
        }))
        .await
        .expect("apply");
        assert!(report.starts_with(r#"{"outcome":"added","id":1}"#));

        let saved = art_core::deserialize(&std::fs::read(&doc).expect("read")).expect("decode");
        let emoji = saved.lookup(EmojiId::new(1)).expect("emoji");
        assert_eq!(emoji.position, Position::new(10, -5));

        let shown = run(&args(Command::Show {
            path: doc,
            resolve: true,
        }))
        .await
        .expect("show");
        let summary: serde_json::Value = serde_json::from_str(&shown).expect("json");
        assert_eq!(summary["emojis"], 1);
        assert_eq!(summary["fetch_status"]["status"], "idle");
    }

    #[tokio::test]
    async fn test_script_stops_at_rejected_intent() {
        let mut controller = DocumentController::with_http(
            ArtDocument::new(),
            tokio::runtime::Handle::current(),
            &ControllerConfig::default(),
        )
        .expect("controller");
        let script = concat!(
            r#"{"intent":"add_emoji","glyph":"🎉","position":{"x":1,"y":1},"size":8}"#,
            "\n",
            r#"{"intent":"remove_emoji","id":1}"#,
            "\n",
            r#"{"intent":"scale_emoji","id":1,"factor":2.0}"#,
            "\n",
        );
        let err = apply_script(&mut controller, script).expect_err("missing emoji");
        assert!(err.to_string().contains("line 3"));
        assert!(controller.document().emojis().is_empty());
        assert_eq!(controller.undo_action_name(), Some("Remove"));
    }
}
