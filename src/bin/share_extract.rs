use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use urlinbox::intake::collect_single_text;
use urlinbox::model::SharedItem;
use urlinbox::title::TitleRules;

#[derive(Parser)]
#[command(name = "share_extract")]
#[command(about = "Extract links and titles from shared text")]
struct Cli {
    /// Shared text; read from stdin when omitted
    text: Option<String>,
    #[arg(short, long, default_value = "")]
    subject: String,
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct Extraction {
    subject: String,
    items: Vec<SharedItem>,
}

fn extract(text: &str, subject: &str) -> Extraction {
    let rules = TitleRules::default();
    Extraction {
        subject: subject.to_string(),
        items: collect_single_text(&rules, text, subject, None),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let text = match cli.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read shared text from stdin")?;
            buf
        }
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text to extract from");
    }

    let extraction = extract(&text, &cli.subject);

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    } else {
        println!("{}", serde_json::to_string(&extraction)?);
    }

    Ok(())
}
