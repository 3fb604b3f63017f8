use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use sentence_follower::dom::{parse_html, to_html, Document};
use sentence_follower::highlight::{FormattingPatch, LineLayout, Point, PointerEvent};
use sentence_follower::host::{TabId, TabStateHost};
use sentence_follower::sentence_detector::{normalize_sentence, BoundaryRules, SentenceBoundaryLocator};
use sentence_follower::{HighlighterConfig, SentenceHighlighter};

#[derive(Parser, Debug)]
#[command(name = "sentence-follower")]
#[command(about = "Locate and highlight the sentence under a pointer")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sentence containing a character offset of a text file
    Locate {
        file: PathBuf,

        /// Character offset into the file
        #[arg(long)]
        offset: usize,

        /// Emit JSON instead of tab-separated text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Walk a text file sentence by sentence
    Split {
        file: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Print the line layout used to map points to text
    Layout { html: PathBuf },
    /// Highlight the sentence under a point of an HTML page and print the page
    Highlight {
        html: PathBuf,

        /// Column of the pointer
        #[arg(long)]
        x: f64,

        /// Line of the pointer
        #[arg(long)]
        y: f64,

        /// Marker background color
        #[arg(long)]
        background: Option<String>,

        /// Marker text color
        #[arg(long)]
        text_color: Option<String>,

        /// Inherit the page background instead of coloring it
        #[arg(long)]
        default_background: bool,

        /// Inherit the page text color
        #[arg(long)]
        default_text: bool,

        #[command(flatten)]
        rules: RuleArgs,
    },
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct RuleArgs {
    /// Do not absorb footnote markers such as [1] after a terminator
    #[arg(long)]
    no_footnotes: bool,

    /// Treat "Dr." and similar titles as sentence ends
    #[arg(long)]
    no_abbreviations: bool,
}

impl RuleArgs {
    fn rules(self) -> BoundaryRules {
        BoundaryRules {
            footnotes: !self.no_footnotes,
            title_abbreviations: !self.no_abbreviations,
            ..BoundaryRules::default()
        }
    }
}

#[derive(Serialize)]
struct LocateOutput<'a> {
    start: usize,
    end: usize,
    sentence: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: stdout carries command output, so structured JSON logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Locate {
            file,
            offset,
            json,
            rules,
        } => locate(&file, offset, json, rules).await,
        Command::Split { file, rules } => split(&file, rules).await,
        Command::Layout { html } => layout(&html).await,
        Command::Highlight {
            html,
            x,
            y,
            background,
            text_color,
            default_background,
            default_text,
            rules,
        } => {
            let patch = FormattingPatch {
                background_color: background,
                text_color,
                use_default_background: default_background.then_some(true),
                use_default_text: default_text.then_some(true),
            };
            highlight(&html, Point::new(x, y), patch, rules).await
        }
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn read_page(path: &Path) -> Result<Document> {
    let html = read_text(path).await?;
    parse_html(&html).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn locate(file: &Path, offset: usize, json: bool, rules: RuleArgs) -> Result<()> {
    let text = read_text(file).await?;
    let locator = SentenceBoundaryLocator::new(rules.rules())?;
    let span = locator.locate(&text, offset);
    let sentence = span.slice(&text);
    info!(offset, start = span.start, end = span.end, "Located sentence");

    if json {
        let output = LocateOutput {
            start: span.start,
            end: span.end,
            sentence,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}\t{}\t{}", span.start, span.end, sentence);
    }
    Ok(())
}

async fn split(file: &Path, rules: RuleArgs) -> Result<()> {
    let text = read_text(file).await?;
    let locator = SentenceBoundaryLocator::new(rules.rules())?;
    let len = text.chars().count();

    let mut offset = 0;
    let mut index = 0;
    while offset < len {
        let span = locator.locate(&text, offset);
        if span.is_empty() {
            break;
        }
        let sentence = normalize_sentence(span.slice(&text));
        if !sentence.is_empty() {
            println!("{}\t{}\t({},{})", index, sentence, span.start, span.end);
            index += 1;
        }
        // WHY: a span ending at or before the current offset would loop forever
        offset = span.end.max(offset + 1);
    }
    info!(sentences = index, chars = len, "Split complete");
    Ok(())
}

async fn layout(html: &Path) -> Result<()> {
    let doc = read_page(html).await?;
    for (line, content) in LineLayout.lines(&doc).iter().enumerate() {
        println!("{}\t{}", line, content.text(&doc));
    }
    Ok(())
}

async fn highlight(html: &Path, point: Point, patch: FormattingPatch, rules: RuleArgs) -> Result<()> {
    let mut doc = read_page(html).await?;

    // WHY: the in-memory host plays the browser's settings store for one tab
    let host = TabStateHost::spawn();
    let client = host.client(TabId(1));
    client.set_formatting(patch).await?;
    client.set_enabled(true).await?;

    let config = HighlighterConfig {
        rules: rules.rules(),
        ..HighlighterConfig::default()
    };
    let mut engine = SentenceHighlighter::new(config)?;
    engine.initialize(&mut doc, &client).await;

    let target = LineLayout
        .element_from_point(&doc, point)
        .with_context(|| format!("Nothing under point ({}, {})", point.x, point.y))?;
    let event = PointerEvent { point, target };
    match engine.handle_pointer_move(&mut doc, &LineLayout, &event) {
        Some(report) => info!(
            start = report.span.start,
            end = report.span.end,
            wrapped = report.wrapped,
            failed = report.failed,
            "Highlight applied"
        ),
        None => info!("Nothing highlighted"),
    }

    println!("{}", to_html(&doc));
    Ok(())
}
