mod api;
mod app;
mod config;
mod constants;
mod download;
mod format;
mod forms;
mod input;
mod logging;
mod markup;
mod model;
mod theme;
mod ui;
mod view;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use api::ApiClient;
use app::App;
use config::Config;
use constants::constants;
use format::{episode_label, format_upload_date};
use forms::{SearchQuery, UploadForm, VideoForm};
use model::{SearchOutcome, SearchSource};
use view::ResultsView;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Search, download and upload subtitles", long_about = None)]
struct Args {
  /// Backend base URL (default: from prefs.toml, else http://127.0.0.1:5000)
  #[arg(long, global = true)]
  server: Option<String>,

  /// Where downloaded subtitles are saved (default: your downloads folder)
  #[arg(long, global = true)]
  download_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Search subtitles and print the results
  Search {
    query: String,
    /// Only return subtitles in this language
    #[arg(short, long)]
    lang: Option<String>,
    #[arg(short, long, value_enum)]
    source: Option<SearchSource>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },
  /// Download a stored subtitle by id
  Download { id: i64 },
  /// Upload a subtitle file
  Upload {
    file: PathBuf,
    #[arg(short, long)]
    title: String,
    #[arg(short, long, default_value = "")]
    language: String,
    #[arg(long, default_value = "")]
    year: String,
    #[arg(long, default_value = "")]
    season: String,
    #[arg(long, default_value = "")]
    episode: String,
  },
  /// Transcribe a video into an SRT file
  VideoToSrt {
    file: PathBuf,
    /// Spoken language, e.g. en-US
    #[arg(short, long)]
    language: Option<String>,
  },
  /// List languages of stored subtitles
  Languages,
  /// List recently uploaded subtitles
  Recent {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    per_page: Option<u32>,
  },
  /// Print shell completions
  Completions { shell: Shell },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
  Text,
  Json,
  Html,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let config = Config::load();
  let server = args.server.clone().unwrap_or_else(|| config.server_url());
  let download_dir = args.download_dir.clone().unwrap_or_else(|| config.download_dir());
  let api = ApiClient::new(&server).context("Failed to build HTTP client")?;

  let Some(command) = args.command else {
    let _guard = logging::init_file(&config::log_dir())?;
    info!(server = %server, "starting tui");
    return run_tui(App::new(api, &config, download_dir)).await;
  };

  if let Command::Completions { shell } = command {
    clap_complete::generate(shell, &mut Args::command(), "subfox", &mut std::io::stdout());
    return Ok(());
  }

  logging::init_stderr()?;
  run_command(command, &api, &config, download_dir).await
}

async fn run_tui(mut app: App) -> Result<()> {
  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  app.trigger_languages();
  let result = run(&mut terminal, &mut app).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key_event(app, key),
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  Ok(())
}

// --- Subcommands ---

async fn run_command(command: Command, api: &ApiClient, config: &Config, download_dir: PathBuf) -> Result<()> {
  match command {
    Command::Search { query, lang, source, format } => {
      let source = source.unwrap_or_else(|| config.search_source());
      let query = SearchQuery::new(&query, lang.as_deref(), source)?;
      let outcome = api.search(&query).await.context("Search request failed")?;
      print_search(outcome, format)?;
    }
    Command::Download { id } => {
      let download = api.download(id).await.with_context(|| format!("Failed to download subtitle {}", id))?;
      let path = download.save_to(&download_dir).await?;
      println!("{}", path.display());
    }
    Command::Upload { file, title, language, year, season, episode } => {
      let form = UploadForm { file: Some(file), title, language, year, season, episode };
      let payload = form.validate()?;
      let stored = api.upload(&payload).await.context("Upload failed")?;
      println!("{}", stored.message.unwrap_or_else(|| app::UPLOAD_OK_TEXT.to_string()));
      if let Some(subtitle) = stored.subtitle {
        println!("id {}", subtitle.id);
      }
    }
    Command::VideoToSrt { file, language } => {
      let mut form = VideoForm { file: Some(file), ..Default::default() };
      if let Some(language) = language {
        form.language = language;
      }
      let payload = form.validate()?;
      eprintln!("{}", app::VIDEO_PROCESSING_LINES[0]);
      let download = api.video_to_srt(&payload).await.context("Video conversion failed")?;
      let path = download.save_to(&download_dir).await?;
      println!("{}", path.display());
    }
    Command::Languages => {
      for language in api.languages().await.context("Failed to list languages")? {
        println!("{}", language);
      }
    }
    Command::Recent { page, per_page } => {
      let per_page = per_page.unwrap_or(constants().recent_per_page);
      let listing = api.recent(page, per_page).await.context("Failed to list subtitles")?;
      let now = Utc::now();
      for s in &listing.subtitles {
        let episode = episode_label(s.season, s.episode).map(|e| format!(" {}", e)).unwrap_or_default();
        let date = s.upload_date.as_deref().map(|d| format_upload_date(d, now)).unwrap_or_default();
        println!("{:>6}  {}{}  [{}]  {}", s.id, s.title, episode, s.language.as_deref().unwrap_or("-"), date);
      }
      println!("page {} of {} ({} total)", listing.current_page, listing.pages, listing.total);
    }
    Command::Completions { .. } => {}
  }
  Ok(())
}

fn print_search(outcome: SearchOutcome, format: OutputFormat) -> Result<()> {
  if let SearchOutcome::Rejected(message) = &outcome {
    bail!("{}", message);
  }
  let view = ResultsView::from(outcome);
  match format {
    OutputFormat::Html => println!("{}", markup::render_results(&view, Utc::now())),
    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view.results())?),
    OutputFormat::Text => {
      if let Some(banner) = view.banner() {
        println!("{}", banner);
      }
      if view.results().is_empty() {
        println!("{}", view::NO_RESULTS_TEXT);
      }
      let now = Utc::now();
      for result in view.results() {
        let badges: Vec<String> = view::badges(result, now).iter().map(view::Badge::text).collect();
        let handle = match result.id {
          Some(id) => format!("{:>6}", id),
          None => format!("{:>6}", "ext"),
        };
        println!("{}  {}  {}", handle, result.title, badges.join(" · "));
      }
    }
  }
  Ok(())
}
