//! `metalens fetch` — fetch a URL and print, save or preview its metadata.
//!
//! With a terminal attached this walks the interactive flow: prompt for
//! a URL when none was given, fetch with a spinner, then offer an action
//! menu. Piped or flagged invocations skip every prompt.

use std::io::IsTerminal;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rustyline::DefaultEditor;

use crate::cli::output::{self, Styled};
use crate::error::MetalensError;
use crate::extract::PageMetadata;
use crate::files;
use crate::pipeline::Pipeline;
use crate::server::{self, ServerConfig};

pub async fn run(
    url_arg: Option<String>,
    save: Option<Option<String>>,
    preview: bool,
) -> anyhow::Result<()> {
    // Debug logging lands on stderr; stdout stays reserved for data.
    if output::is_verbose() {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("metalens=debug".parse().unwrap()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let s = Styled::new();
    let mut url = match url_arg {
        Some(u) => u,
        None => prompt_url()?,
    };

    loop {
        match fetch_once(&url).await {
            Ok(metadata) => return present(&metadata, &url, save, preview, &s).await,
            Err(err) => {
                if !interactive() {
                    return Err(err.into());
                }
                explain_error(&err, &url, &s);
                match retry_menu()? {
                    Some(new_url) => url = new_url,
                    None => std::process::exit(1),
                }
            }
        }
    }
}

/// Whether prompts and menus are appropriate.
fn interactive() -> bool {
    std::io::stdin().is_terminal() && !output::is_quiet() && !output::is_json()
}

async fn fetch_once(url: &str) -> Result<PageMetadata, MetalensError> {
    let spinner = (!output::is_quiet() && !output::is_json()).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
        pb.set_message(format!("Fetching metadata for {url}..."));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    });

    let result = Pipeline::new().run(url).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}

async fn present(
    metadata: &PageMetadata,
    url: &str,
    save: Option<Option<String>>,
    preview: bool,
    s: &Styled,
) -> anyhow::Result<()> {
    let human = !output::is_quiet() && !output::is_json();
    if human {
        eprintln!("\n  {} Metadata retrieved successfully!", s.ok_sym());
    }

    if output::is_json() {
        output::print_json(&serde_json::to_value(metadata)?);
    }

    let saved = save.is_some();
    if let Some(given) = save {
        let filename = match given {
            Some(name) => files::parse_file_name(&name),
            None => files::default_save_name(url)?,
        };
        files::save_metadata(metadata, Path::new(&filename))?;
        if human {
            eprintln!("  {} Metadata saved to {filename}", s.ok_sym());
        }
    }

    if preview {
        if human {
            eprintln!("\n  Starting local preview server...");
        }
        return preview_server(url).await;
    }

    if saved || output::is_json() {
        return Ok(());
    }

    if interactive() {
        return actions_menu(metadata, url, s).await;
    }

    // Piped with no flags: behave like the log action.
    println!("{}", serde_json::to_string_pretty(metadata)?);
    Ok(())
}

// ── Prompts ──────────────────────────────────────────────────────────────

fn prompt_url() -> anyhow::Result<String> {
    let mut editor = DefaultEditor::new()?;
    prompt_nonempty(&mut editor, "Enter website URL: ")
}

fn prompt_nonempty(editor: &mut DefaultEditor, prompt: &str) -> anyhow::Result<String> {
    loop {
        let line = editor.readline(prompt)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            eprintln!("  URL is required");
            continue;
        }
        return Ok(trimmed.to_string());
    }
}

async fn actions_menu(metadata: &PageMetadata, url: &str, s: &Styled) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    eprintln!();
    eprintln!("  What would you like to do?");
    eprintln!("    1) Log metadata to console");
    eprintln!("    2) Save metadata to JSON file");
    eprintln!("    3) View in local preview");
    loop {
        let line = editor.readline("  > ")?;
        match line.trim() {
            "1" => {
                eprintln!("\n  Metadata content:");
                println!("{}", serde_json::to_string_pretty(metadata)?);
                return Ok(());
            }
            "2" => {
                eprintln!("\n  Saving metadata to file...");
                let default = files::default_save_name(url)?;
                let given = editor
                    .readline_with_initial("  Enter filename to save as: ", (default.as_str(), ""))?;
                let filename = files::parse_file_name(given.trim());
                files::save_metadata(metadata, Path::new(&filename))?;
                eprintln!("  {} Metadata saved to {filename}", s.ok_sym());
                return Ok(());
            }
            "3" => {
                eprintln!("\n  Starting local preview server...");
                return preview_server(url).await;
            }
            _ => eprintln!("  Please enter 1, 2 or 3"),
        }
    }
}

fn retry_menu() -> anyhow::Result<Option<String>> {
    let mut editor = DefaultEditor::new()?;
    eprintln!();
    eprintln!("  Would you like to:");
    eprintln!("    1) Try a different URL");
    eprintln!("    2) Exit");
    loop {
        let line = editor.readline("  > ")?;
        match line.trim() {
            "1" => return Ok(Some(prompt_nonempty(&mut editor, "Enter a new URL: ")?)),
            "2" => return Ok(None),
            _ => eprintln!("  Please enter 1 or 2"),
        }
    }
}

// ── Presentation ─────────────────────────────────────────────────────────

/// One colored explanation block per error kind, with a hint on how to
/// get unstuck.
fn explain_error(err: &MetalensError, url: &str, s: &Styled) {
    eprintln!("\n  {} Error retrieving metadata", s.err_sym());
    match err {
        MetalensError::DomainNotFound { .. } => {
            eprintln!("  {}", s.red(&format!("Domain Not Found: \"{url}\"")));
            eprintln!("  {}", s.red(&err.to_string()));
            eprintln!(
                "  {}",
                s.red("The website domain does not exist or cannot be resolved.")
            );
            eprintln!(
                "  {}",
                s.red("Please check if the domain name is spelled correctly.")
            );
        }
        MetalensError::Network { .. } => {
            eprintln!(
                "  {}",
                s.yellow(&format!("Network Error: Unable to connect to {url}"))
            );
            eprintln!("  {}", s.yellow(&err.to_string()));
            eprintln!(
                "  {}",
                s.yellow("Please check your internet connection and try again.")
            );
        }
        MetalensError::NotFound { .. } => {
            eprintln!("  {}", s.magenta(&format!("Page Not Found: {url}")));
            eprintln!("  {}", s.magenta(&err.to_string()));
            eprintln!(
                "  {}",
                s.magenta("Please check if the URL path is correct and exists.")
            );
        }
        MetalensError::InvalidUrl { .. } => {
            eprintln!("  {}", s.blue(&format!("Invalid URL Format: {url}")));
            eprintln!("  {}", s.blue(&err.to_string()));
            eprintln!(
                "  {}",
                s.blue("Please enter a valid URL including http:// or https://.")
            );
        }
        MetalensError::ContentParsing { .. } => {
            eprintln!("  {}", s.cyan(&format!("Content Parsing Error: {url}")));
            eprintln!("  {}", s.cyan(&err.to_string()));
            eprintln!("  {}", s.cyan("The content couldn't be parsed properly."));
        }
        MetalensError::Http { status, .. } => {
            eprintln!("  {}", s.red(&format!("HTTP Error {status}: {url}")));
            eprintln!("  {}", s.red(&err.to_string()));
        }
        _ => {
            eprintln!("  {}", s.red(&err.to_string()));
            eprintln!("  {}", s.red("An unexpected error occurred. Please try again."));
        }
    }
}

async fn preview_server(url: &str) -> anyhow::Result<()> {
    let s = Styled::new();
    let url = url.to_string();
    server::serve_with(ServerConfig::default(), move |addr| {
        let preview = format!(
            "http://localhost:{}/?url={}",
            addr.port(),
            urlencoding::encode(&url)
        );
        if !output::is_quiet() && !output::is_json() {
            eprintln!("  {} Preview running at {preview}", s.ok_sym());
            eprintln!("  Press Ctrl+C to stop the server");
            open_in_browser(&preview);
        }
    })
    .await
}

/// Open `url` in the system browser. Spawn failures fall back to a
/// printed hint.
fn open_in_browser(url: &str) {
    let spawned = if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", "", url]).spawn()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };
    if spawned.is_err() {
        eprintln!("  Open {url} in your browser to view the preview");
    }
}
