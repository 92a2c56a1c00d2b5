mod player;
mod viewport;

use std::{
    env,
    io::{self, BufRead},
    path::PathBuf,
    process,
    sync::Arc,
    thread,
    time::Duration,
};

use crossbeam_channel::Sender;
use env_logger::{Builder, Env};
use rand::{rngs::StdRng, SeedableRng};
use reelfeed_core::{
    asset::{http::HttpAssetSource, simulated::SimulatedAssetSource, AssetSource},
    catalog::RandomProvider,
    config::FeedConfig,
    error::Error,
    feed::{Feed, FeedEvent},
    item::{RowId, VideoItem},
    playback::VideoPlayer,
};

use crate::{
    player::LoggingPlayer,
    viewport::{Viewport, ViewportChange},
};

const ENV_LOG: &str = "REELFEED_LOG";
const ENV_LOG_STYLE: &str = "REELFEED_LOG_STYLE";

const VISIBLE_ROWS: usize = 2;
const PRELOAD_ROWS: usize = 2;
const OFFLINE_LATENCY: Duration = Duration::from_millis(400);

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    offline: bool,
    seed: Option<u64>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().ok_or("--config expects a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--offline" => parsed.offline = true,
                "--seed" => {
                    let seed = args.next().ok_or("--seed expects a number")?;
                    parsed.seed = Some(seed.parse().map_err(|_| "--seed expects a number")?);
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(parsed)
    }
}

fn main() {
    // Setup logging from the env variables, with defaults.
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: reelfeed-cli [--config <path>] [--offline] [--seed <n>]");
            process::exit(2);
        }
    };
    if let Err(err) = start(args) {
        log::error!("{}", err);
        process::exit(1);
    }
}

fn start(args: Args) -> Result<(), Error> {
    let config = match &args.config {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };
    let catalog = config.catalog()?;
    let items = match args.seed {
        Some(seed) => catalog.populate(
            &mut RandomProvider::new(StdRng::seed_from_u64(seed)),
            config.item_count,
        ),
        None => catalog.populate(&mut RandomProvider::new(rand::rng()), config.item_count),
    };

    let source: Arc<dyn AssetSource> = if args.offline {
        Arc::new(SimulatedAssetSource::new(OFFLINE_LATENCY))
    } else {
        Arc::new(HttpAssetSource::new(config.proxy().as_deref()))
    };
    let mut feed = Feed::new(
        config.playback(),
        source,
        Box::new(|row: RowId, item: &VideoItem| {
            Box::new(LoggingPlayer::new(row, item)) as Box<dyn VideoPlayer>
        }),
    );

    let _ui_thread = thread::spawn({
        let sender = feed.sender();
        move || coordinate(items, sender)
    });

    feed.run();

    Ok(())
}

/// Plays the part of the list view: turns scroll and tap commands read from
/// stdin into feed events.
fn coordinate(items: Vec<VideoItem>, sender: Sender<FeedEvent>) {
    let mut viewport = Viewport::new(items.len(), VISIBLE_ROWS, PRELOAD_ROWS);
    dispatch(&sender, &items, viewport.open());
    print_help();

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let mut words = line.split_whitespace();
        let command = words.next();
        let row = words.next().and_then(|word| word.parse::<usize>().ok());
        match (command, row) {
            (Some("j"), _) => dispatch(&sender, &items, viewport.scroll_by(1)),
            (Some("k"), _) => dispatch(&sender, &items, viewport.scroll_by(-1)),
            (Some("g"), Some(row)) => dispatch(&sender, &items, viewport.scroll_to(row)),
            (Some("t"), Some(row)) if row < items.len() => {
                let _ = sender.send(FeedEvent::Replay { row: RowId(row) });
            }
            (Some("s"), _) => {
                for row in viewport.mounted_rows() {
                    let marker = if viewport.visible_rows().contains(&row) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{marker} {:>3} {}", row, items[row].title);
                }
            }
            (Some("q"), _) => break,
            (None, _) => {}
            _ => {
                log::warn!("unknown command");
                print_help();
            }
        }
    }
    let _ = sender.send(FeedEvent::Shutdown);
}

fn dispatch(sender: &Sender<FeedEvent>, items: &[VideoItem], changes: Vec<ViewportChange>) {
    for change in changes {
        let event = match change {
            ViewportChange::Mount(row) => FeedEvent::Mount {
                row: RowId(row),
                item: items[row].clone(),
            },
            ViewportChange::Unmount(row) => FeedEvent::Unmount { row: RowId(row) },
            ViewportChange::EnterVisible(row) => FeedEvent::EnterVisible { row: RowId(row) },
            ViewportChange::ExitVisible(row) => FeedEvent::ExitVisible { row: RowId(row) },
        };
        if sender.send(event).is_err() {
            log::warn!("feed is gone, dropping viewport changes");
            return;
        }
    }
}

fn print_help() {
    println!("j/k: scroll down/up, g <row>: jump, t <row>: tap play, s: status, q: quit");
}
