//! anime-explorer CLI application.

use anime_explorer::display;
use anime_explorer::query::{ContentRating, Status, SubType};
use anime_explorer::{
    CatalogError, Debouncer, FilterPatch, FilterState, JikanClient, SearchSession, SlotStore, Wishlist,
    WishlistSlots,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use shared::{Config, LogConfig, MediaKey, MediaKind};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog; without a term, list the top-rated titles
    Search(SearchArgs),

    /// Show the details of one title
    Show {
        /// anime or manga
        kind: MediaKind,
        /// MyAnimeList id
        id: u32,
    },

    /// List the genres of a media kind
    Genres {
        #[arg(long, default_value = "anime")]
        kind: MediaKind,
    },

    /// Manage the wishlist
    #[command(subcommand)]
    Wishlist(WishlistCommand),

    /// Interactive browsing with debounced search input
    Browse {
        #[arg(long, default_value = "anime")]
        kind: MediaKind,
    },
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
    /// Search term (words are joined with spaces)
    term: Vec<String>,

    #[arg(long, default_value = "anime")]
    kind: MediaKind,

    /// Format, e.g. tv, movie, ova for anime or manga, lightnovel, manhwa for manga
    #[arg(long = "type")]
    sub_type: Option<String>,

    /// Status, e.g. airing, complete, upcoming, publishing, hiatus
    #[arg(long)]
    status: Option<String>,

    /// Content rating (anime only): g, pg, pg13, r17, r, rx
    #[arg(long)]
    rating: Option<ContentRating>,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Subcommand, Debug)]
enum WishlistCommand {
    /// Show saved titles
    List {
        #[arg(long)]
        kind: Option<MediaKind>,
    },

    /// Fetch a title and save it
    Add { kind: MediaKind, id: u32 },

    /// Remove a title from the wishlist
    Remove {
        id: u32,
        /// Only remove from this partition
        #[arg(long)]
        kind: Option<MediaKind>,
    },

    /// Remove every title, or every title of one kind
    Clear {
        #[arg(long)]
        kind: Option<MediaKind>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mut log_config = LogConfig::from_settings(&config.logging, &config.log_dir());
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    debug!(config_file = %args.config.display(), "Loaded configuration");

    let store = SlotStore::new(config.wishlist_dir()).context("Failed to open wishlist storage")?;
    debug!(dir = %store.dir().display(), "Wishlist storage opened");
    let mut wishlist = Wishlist::load(store, WishlistSlots::from(&config.wishlist));

    match args.command {
        Command::Search(search) => run_search(&config, &wishlist, search).await,
        Command::Show { kind, id } => {
            let mut client = client(&config)?;
            let item = client
                .get_by_id(kind, id)
                .await
                .map_err(|e| fetch_error(e, kind, id))?;
            println!("{}", display::detail_view(&item, wishlist.contains(item.mal_id)));
            Ok(())
        }
        Command::Genres { kind } => {
            let mut client = client(&config)?;
            let genres = client.genres(kind).await.context("Failed to fetch genres")?;
            for genre in genres {
                println!("{:>5}  {} ({})", genre.mal_id, genre.name, genre.count);
            }
            Ok(())
        }
        Command::Wishlist(command) => run_wishlist(&config, &mut wishlist, command).await,
        Command::Browse { kind } => run_browse(&config, &mut wishlist, kind).await,
    }
}

fn client(config: &Config) -> Result<JikanClient> {
    JikanClient::from_config(&config.catalog).context("Failed to create Jikan client")
}

/// Describe a failed single-entry lookup
fn fetch_error(error: CatalogError, kind: MediaKind, id: u32) -> anyhow::Error {
    if error.is_not_found() {
        anyhow!("No {kind} with id {id}")
    } else if error.is_timeout() {
        anyhow!("Timed out fetching {kind} {id}")
    } else {
        anyhow::Error::new(error).context(format!("Failed to fetch {kind} {id}"))
    }
}

/// Build a filter state from command-line values
fn filters_from_args(
    kind: MediaKind,
    sub_type: Option<&str>,
    status: Option<&str>,
    rating: Option<ContentRating>,
) -> Result<FilterState> {
    let mut filters = FilterState::for_kind(kind);

    if let Some(value) = sub_type {
        let Some(sub_type) = SubType::parse(kind, value) else {
            let options: Vec<&str> = SubType::options(kind).iter().map(|t| t.as_param()).collect();
            bail!("Unknown {kind} type '{value}' (expected one of: {})", options.join(", "));
        };
        filters = filters.apply(FilterPatch::SubType(sub_type));
    }

    if let Some(value) = status {
        let Some(status) = Status::parse(kind, value) else {
            let options: Vec<&str> = Status::options(kind).iter().map(|s| s.as_param()).collect();
            bail!("Unknown {kind} status '{value}' (expected one of: {})", options.join(", "));
        };
        filters = filters.apply(FilterPatch::Status(status));
    }

    if let Some(rating) = rating {
        if kind != MediaKind::Anime {
            bail!("Content rating only applies to anime");
        }
        filters = filters.apply(FilterPatch::ContentRating(rating));
    }

    Ok(filters)
}

fn render(session: &SearchSession, wishlist: &Wishlist) {
    let heading = match session.term() {
        "" => format!("Top rated · {}", display::filter_summary(session.filters())),
        term => format!("\"{term}\" · {}", display::filter_summary(session.filters())),
    };
    println!("{heading}");
    println!("{}", display::results_block(session.results(), wishlist));
    if let Some(controls) = session.page_controls() {
        println!();
        println!("{}", display::page_controls_line(&controls));
    }
}

async fn run_search(config: &Config, wishlist: &Wishlist, args: SearchArgs) -> Result<()> {
    let filters = filters_from_args(
        args.kind,
        args.sub_type.as_deref(),
        args.status.as_deref(),
        args.rating,
    )?;

    let mut client = client(config)?;
    let mut session = SearchSession::new(filters);
    session.set_term(&args.term.join(" "));
    session.go_to_page(args.page);

    session.refresh(&mut client).await;
    render(&session, wishlist);
    Ok(())
}

/// Ask a yes/no question on the terminal; anything but "y"/"yes" is a no
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn run_wishlist(config: &Config, wishlist: &mut Wishlist, command: WishlistCommand) -> Result<()> {
    match command {
        WishlistCommand::List { kind } => {
            println!("{}", display::wishlist_block(wishlist, kind));
        }
        WishlistCommand::Add { kind, id } => {
            if let Some(saved) = wishlist.get(MediaKey { kind, id }) {
                println!("\"{}\" is already in your wishlist", saved.title);
                return Ok(());
            }

            let mut client = client(config)?;
            let item = client
                .get_by_id(kind, id)
                .await
                .map_err(|e| fetch_error(e, kind, id))?;
            let title = item.title.clone();
            if wishlist.add(item)? {
                println!("Added \"{title}\" to your wishlist");
            } else {
                println!("\"{title}\" is already in your wishlist");
            }
        }
        WishlistCommand::Remove { id, kind } => {
            let removed = match kind {
                Some(kind) => wishlist.remove_key(MediaKey { kind, id })?,
                None => wishlist.remove(id)?,
            };
            if removed {
                println!("Removed {id} from your wishlist");
            } else {
                println!("{id} is not in your wishlist");
            }
        }
        WishlistCommand::Clear { kind, yes } => {
            let scope = kind.map_or("titles".to_string(), |k| format!("{k} titles"));
            if !yes && !confirm(&format!("Are you sure you want to remove all {scope} from your wishlist?"))? {
                println!("Nothing removed");
                return Ok(());
            }
            match kind {
                Some(kind) => wishlist.clear_partition(kind)?,
                None => wishlist.clear_all()?,
            }
            println!("Removed all {scope} from your wishlist");
        }
    }
    Ok(())
}

/// A `:`-prefixed instruction in browse mode
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Quit,
    Help,
    Next,
    Previous,
    Page(u32),
    Filter(FilterPatch),
    Add(u32),
    Remove(u32),
    Show(u32),
    Wishlist,
}

const BROWSE_HELP: &str = "\
Type to search (results follow once you pause). Commands:
  :next / :prev / :page N      move between pages
  :kind anime|manga            switch media kind
  :type T / :status S / :rating R   toggle a filter
  :reset                       clear filters and search
  :add ID / :rm ID             add or remove a listed title
  :show ID                     details of a listed title
  :wishlist                    show the wishlist
  :quit";

fn parse_browse_command(input: &str, kind: MediaKind) -> Result<BrowseCommand> {
    let mut words = input.split_whitespace();
    let name = words.next().unwrap_or_default();
    let rest = words.collect::<Vec<_>>().join(" ");

    let id = || -> Result<u32> {
        rest.parse::<u32>()
            .with_context(|| format!("Expected a number after :{name}"))
    };

    let command = match name {
        "q" | "quit" => BrowseCommand::Quit,
        "h" | "help" => BrowseCommand::Help,
        "n" | "next" => BrowseCommand::Next,
        "p" | "prev" => BrowseCommand::Previous,
        "page" => BrowseCommand::Page(id()?),
        "kind" => BrowseCommand::Filter(FilterPatch::MediaKind(rest.parse()?)),
        "type" => match SubType::parse(kind, &rest) {
            Some(sub_type) => BrowseCommand::Filter(FilterPatch::SubType(sub_type)),
            None => bail!("Unknown {kind} type '{rest}'"),
        },
        "status" => match Status::parse(kind, &rest) {
            Some(status) => BrowseCommand::Filter(FilterPatch::Status(status)),
            None => bail!("Unknown {kind} status '{rest}'"),
        },
        "rating" => BrowseCommand::Filter(FilterPatch::ContentRating(rest.parse()?)),
        "reset" => BrowseCommand::Filter(FilterPatch::Reset),
        "add" => BrowseCommand::Add(id()?),
        "rm" | "remove" => BrowseCommand::Remove(id()?),
        "show" => BrowseCommand::Show(id()?),
        "w" | "wishlist" => BrowseCommand::Wishlist,
        other => bail!("Unknown command ':{other}' (try :help)"),
    };
    Ok(command)
}

/// Notice for a filter patch the reconciler refused
fn rejection_notice(patch: FilterPatch, changed: bool, filters: &FilterState) -> Option<String> {
    if changed {
        return None;
    }

    let kind = filters.effective_kind();
    match patch {
        FilterPatch::ContentRating(_) => Some(format!("Content rating only applies to anime, not {kind}")),
        FilterPatch::SubType(sub_type) => Some(format!("Type {} does not apply to {kind}", sub_type.as_param())),
        FilterPatch::Status(status) => Some(format!("Status {} does not apply to {kind}", status.as_param())),
        FilterPatch::Reset | FilterPatch::MediaKind(_) => None,
    }
}

async fn run_browse(config: &Config, wishlist: &mut Wishlist, kind: MediaKind) -> Result<()> {
    let mut client = client(config)?;
    let mut session = SearchSession::new(FilterState::for_kind(kind));
    let (mut debouncer, mut settled) = Debouncer::new(config.debounce_window());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(
        kind = %kind,
        debounce_ms = debouncer.window().as_millis() as u64,
        "Browse session started"
    );
    println!("{BROWSE_HELP}\n");
    session.refresh(&mut client).await;
    render(&session, wishlist);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };

                let Some(input) = line.trim().strip_prefix(':') else {
                    debouncer.push(line);
                    continue;
                };

                let command = match parse_browse_command(input, session.filters().effective_kind()) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };

                let refetch = match command {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Help => {
                        println!("{BROWSE_HELP}");
                        false
                    }
                    BrowseCommand::Next => {
                        let page = session.page();
                        session.next_page() != page
                    }
                    BrowseCommand::Previous => {
                        let page = session.page();
                        session.previous_page() != page
                    }
                    BrowseCommand::Page(page) => {
                        let current = session.page();
                        session.go_to_page(page) != current
                    }
                    BrowseCommand::Filter(patch) => {
                        if patch == FilterPatch::Reset {
                            debouncer.cancel();
                        }
                        let changed = session.apply_filter(patch);
                        if let Some(notice) = rejection_notice(patch, changed, session.filters()) {
                            println!("{notice}");
                        }
                        changed
                    }
                    BrowseCommand::Add(id) => {
                        let listed = session.results().items.iter().find(|item| item.mal_id == id);
                        match listed {
                            Some(item) => match wishlist.add(item.clone()) {
                                Ok(true) => println!("Added \"{}\"", item.title),
                                Ok(false) => println!("\"{}\" is already in your wishlist", item.title),
                                Err(e) => {
                                    warn!(mal_id = id, error = %e, "Wishlist add failed");
                                    println!("Could not update wishlist: {e}");
                                }
                            },
                            None => println!("{id} is not on this page"),
                        }
                        false
                    }
                    BrowseCommand::Remove(id) => {
                        match wishlist.remove(id) {
                            Ok(true) => println!("Removed {id}"),
                            Ok(false) => println!("{id} is not in your wishlist"),
                            Err(e) => {
                                warn!(mal_id = id, error = %e, "Wishlist remove failed");
                                println!("Could not update wishlist: {e}");
                            }
                        }
                        false
                    }
                    BrowseCommand::Show(id) => {
                        let kind = session.filters().effective_kind();
                        match client.get_by_id(kind, id).await {
                            Ok(item) => println!("{}", display::detail_view(&item, wishlist.contains(id))),
                            Err(e) => println!("{:#}", fetch_error(e, kind, id)),
                        }
                        false
                    }
                    BrowseCommand::Wishlist => {
                        println!("{}", display::wishlist_block(wishlist, None));
                        false
                    }
                };

                if refetch {
                    session.refresh(&mut client).await;
                    render(&session, wishlist);
                }
            }
            Some(term) = settled.recv() => {
                if session.set_term(&term) {
                    session.refresh(&mut client).await;
                    render(&session, wishlist);
                }
            }
        }
    }

    info!("Browse session finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anime_explorer::query::{AnimeStatus, AnimeType, MangaType};

    #[test]
    fn test_filters_from_args() {
        let filters = filters_from_args(MediaKind::Anime, Some("TV"), Some("airing"), Some(ContentRating::Pg)).unwrap();
        assert_eq!(filters.sub_type, Some(SubType::Anime(AnimeType::Tv)));
        assert_eq!(filters.status, Some(Status::Anime(AnimeStatus::Airing)));
        assert_eq!(filters.content_rating, Some(ContentRating::Pg));
    }

    #[test]
    fn test_filters_from_args_rejects_other_kind() {
        assert!(filters_from_args(MediaKind::Anime, Some("manhwa"), None, None).is_err());
        assert!(filters_from_args(MediaKind::Manga, None, None, Some(ContentRating::G)).is_err());

        let manga = filters_from_args(MediaKind::Manga, Some("manhwa"), None, None).unwrap();
        assert_eq!(manga.sub_type, Some(SubType::Manga(MangaType::Manhwa)));
    }

    #[test]
    fn test_parse_browse_commands() {
        assert_eq!(parse_browse_command("q", MediaKind::Anime).unwrap(), BrowseCommand::Quit);
        assert_eq!(parse_browse_command("page 4", MediaKind::Anime).unwrap(), BrowseCommand::Page(4));
        assert_eq!(
            parse_browse_command("kind manga", MediaKind::Anime).unwrap(),
            BrowseCommand::Filter(FilterPatch::MediaKind(MediaKind::Manga))
        );
        assert_eq!(
            parse_browse_command("type light novel", MediaKind::Manga).unwrap(),
            BrowseCommand::Filter(FilterPatch::SubType(SubType::Manga(MangaType::LightNovel)))
        );
        assert_eq!(
            parse_browse_command("reset", MediaKind::Manga).unwrap(),
            BrowseCommand::Filter(FilterPatch::Reset)
        );
        assert_eq!(parse_browse_command("add 5114", MediaKind::Anime).unwrap(), BrowseCommand::Add(5114));
    }

    #[test]
    fn test_parse_browse_command_errors() {
        assert!(parse_browse_command("page two", MediaKind::Anime).is_err());
        assert!(parse_browse_command("type manhwa", MediaKind::Anime).is_err());
        assert!(parse_browse_command("dance", MediaKind::Anime).is_err());
    }

    #[test]
    fn test_rejected_rating_gets_notice() {
        let manga = FilterState::for_kind(MediaKind::Manga);
        let patch = FilterPatch::ContentRating(ContentRating::R17);
        let after = manga.apply(patch);

        assert_eq!(after, manga);
        let notice = rejection_notice(patch, after != manga, &after).unwrap();
        assert!(notice.contains("only applies to anime"));

        let anime = FilterState::for_kind(MediaKind::Anime);
        assert_eq!(rejection_notice(patch, anime.apply(patch) != anime, &anime), None);
        assert_eq!(
            rejection_notice(FilterPatch::MediaKind(MediaKind::Manga), false, &manga),
            None
        );
    }

    #[test]
    fn test_cli_parses() {
        let args = Args::try_parse_from([
            "anime-explorer", "search", "cowboy", "bebop", "--type", "tv", "--rating", "r17", "--page", "2",
        ])
        .unwrap();
        match args.command {
            Command::Search(search) => {
                assert_eq!(search.term.join(" "), "cowboy bebop");
                assert_eq!(search.rating, Some(ContentRating::R17));
                assert_eq!(search.page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let args = Args::try_parse_from(["anime-explorer", "wishlist", "clear", "--kind", "manga", "--yes"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Wishlist(WishlistCommand::Clear { kind: Some(MediaKind::Manga), yes: true })
        ));
    }
}
