use anyhow::{bail, Context};
use bcult_site::dom::html::{self, LoadedPage};
use bcult_site::dom::{CardInput, FieldMark, Key, MemoryPage};
use bcult_site::storage::{FileStore, MemoryStore, StorageKeys};
use bcult_site::{
    DraftRecord, DraftStore, ModalState, ProjectRecord, Site, SiteConfig, SiteHandle, SubmissionPhase,
    Theme, ThemeState, UiEvent,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bcult-site", about = "Drive the BCULT site behavior against static pages")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the regions a page has and which features are live
    Inspect { page: PathBuf },
    /// Render the gallery with optional search and category
    Render {
        page: PathBuf,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Dataset file overriding the page's own
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Activate a project card and print the modal
    Open {
        page: PathBuf,
        id: u64,
        #[arg(long, value_enum, default_value_t = Via::Click)]
        via: Via,
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Save, load or clear the contact draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Submit a contact page's form in real time
    Submit {
        page: PathBuf,
        #[arg(long)]
        store: PathBuf,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show or toggle the stored theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand, Debug)]
enum DraftAction {
    Save {
        #[arg(long)]
        store: PathBuf,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Load {
        #[arg(long)]
        store: PathBuf,
    },
    Clear {
        #[arg(long)]
        store: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    Show {
        #[arg(long)]
        store: PathBuf,
    },
    Toggle {
        #[arg(long)]
        store: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    message: Option<String>,
    #[arg(long)]
    newsletter: bool,
}

impl FieldArgs {
    fn to_draft(&self) -> DraftRecord {
        DraftRecord {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            message: self.message.clone().unwrap_or_default(),
            newsletter: self.newsletter,
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.message.is_none() && !self.newsletter
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Via {
    Click,
    Enter,
}

fn init_logging(verbose: u8) -> anyhow::Result<flexi_logger::LoggerHandle> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let handle = flexi_logger::Logger::try_with_env_or_str(level)?.log_to_stderr().start()?;
    Ok(handle)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SiteConfig> {
    match path {
        Some(p) => Ok(SiteConfig::from_json_file(p)?),
        None => Ok(SiteConfig::default()),
    }
}

fn load_page(path: &Path, data: Option<&Path>) -> anyhow::Result<LoadedPage> {
    let mut loaded = html::load_file(path)?;
    if let Some(data) = data {
        let text = std::fs::read_to_string(data).with_context(|| format!("reading {}", data.display()))?;
        let records: Vec<ProjectRecord> =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", data.display()))?;
        loaded.dataset = Some(records);
    }
    Ok(loaded)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn gallery_site(config: SiteConfig, loaded: LoadedPage) -> anyhow::Result<(MemoryPage, Site)> {
    if loaded.report.layout.gallery.is_none() {
        bail!("page has no gallery container");
    }
    let page = loaded.page;
    let site = Site::new(config, page.capabilities(), Box::new(MemoryStore::new()), loaded.dataset);
    Ok((page, site))
}

async fn submit(config: SiteConfig, loaded: LoadedPage, store: PathBuf, fields: &FieldArgs) -> anyhow::Result<()> {
    if !loaded.report.layout.contact_form {
        bail!("page has no contact form");
    }
    let page = loaded.page;
    let worker_page = page.clone();
    let dataset = loaded.dataset;
    let handle = SiteHandle::spawn(move || {
        Ok(Site::new(config, worker_page.capabilities(), Box::new(FileStore::open(store)), dataset))
    })
    .await?;

    // Typed values win over the restored draft.
    if !fields.is_empty() {
        let draft = fields.to_draft();
        page.type_into("name", &draft.name);
        page.type_into("email", &draft.email);
        page.type_into("message", &draft.message);
        page.set_checked("newsletter", draft.newsletter);
    }

    handle.dispatch(UiEvent::Submit).await?;
    let mut seen = 0;
    let mut last_status = None;
    loop {
        let snap = handle.snapshot().await?;
        for phase in &snap.history[seen..] {
            println!("phase: {:?}", phase);
        }
        seen = snap.history.len();

        let status = page.snapshot().status.map(|s| s.text);
        if status.is_some() && status != last_status {
            println!("status: {}", status.as_deref().unwrap_or_default());
        }
        last_status = status;

        if !snap.timers_pending {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    let page_snap = page.snapshot();
    let invalid: Vec<&str> = page_snap
        .fields
        .iter()
        .filter(|f| f.mark == Some(FieldMark::Invalid))
        .map(|f| f.spec.name.as_str())
        .collect();
    let history = handle.snapshot().await?.history;
    handle.close().await?;

    if !history.contains(&SubmissionPhase::Sent) {
        if !invalid.is_empty() {
            bail!("form rejected, invalid fields: {}", invalid.join(", "));
        }
        bail!("message was not sent");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose)?;
    let config = load_config(cli.config.as_deref())?;
    let keys = StorageKeys::new(&config.storage_prefix);

    match cli.command {
        Command::Inspect { page } => {
            let loaded = load_page(&page, None)?;
            print_json(&loaded.report)?;
        }
        Command::Render { page, search, category, data } => {
            let (page, mut site) = gallery_site(config, load_page(&page, data.as_deref())?)?;
            if let Some(term) = search {
                page.set_search_term(&term);
            }
            if let Some(cat) = category {
                page.select_category(&cat);
            }
            site.dispatch(UiEvent::SearchInput);
            let snap = page.snapshot();
            print_json(&snap.cards)?;
            log::info!("snapshot digest {}", snap.digest());
        }
        Command::Open { page, id, via, data } => {
            let (page, mut site) = gallery_site(config, load_page(&page, data.as_deref())?)?;
            let input = match via {
                Via::Click => CardInput::Click,
                Via::Enter => CardInput::Key(Key::Enter),
            };
            site.dispatch(UiEvent::Card { record_id: id, input });
            if !matches!(site.modal_state(), ModalState::Open(_)) {
                bail!("card {} is not on the page", id);
            }
            print_json(&page.snapshot().modal)?;
        }
        Command::Draft { action } => match action {
            DraftAction::Save { store, fields } => {
                let mut store = FileStore::open(store);
                DraftStore::new(&mut store, &keys.draft).save(&fields.to_draft())?;
                println!("{}", config.labels.draft_saved);
            }
            DraftAction::Load { store } => {
                let mut store = FileStore::open(store);
                match DraftStore::new(&mut store, &keys.draft).load() {
                    Some(draft) => print_json(&draft)?,
                    None => println!("no draft"),
                }
            }
            DraftAction::Clear { store } => {
                let mut store = FileStore::open(store);
                DraftStore::new(&mut store, &keys.draft).clear()?;
                println!("{}", config.labels.draft_cleared);
            }
        },
        Command::Submit { page, store, fields } => {
            let loaded = load_page(&page, None)?;
            submit(config, loaded, store, &fields).await?;
        }
        Command::Theme { action } => match action {
            ThemeAction::Show { store } => {
                let store = FileStore::open(store);
                println!("{}", ThemeState::load(&store, &keys.theme, Theme::Light).current().as_str());
            }
            ThemeAction::Toggle { store } => {
                let mut store = FileStore::open(store);
                let mut theme = ThemeState::load(&store, &keys.theme, Theme::Light);
                let now = theme.toggle();
                theme.persist(&mut store)?;
                println!("{}", now.as_str());
            }
        },
    }
    Ok(())
}
