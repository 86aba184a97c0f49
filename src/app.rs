use crate::{
    board::Board,
    fetch::{
        Fetch,
        SourceFetcher,
    },
    loader::MetricsLoader,
    Args,
};
use color_eyre::Result;
use metrics_tracker_config::{
    PanelConfig,
    Ticker,
    ViewerConfig,
};
use std::io::BufRead;
use tokio::sync::mpsc;

/// What the viewer reacts to between refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Refresh,
    Quit,
}

impl Action {
    /// `q`/`quit` quits, any other line (a bare Enter included) refreshes.
    pub fn from_line(line: &str) -> Self {
        match line.trim() {
            "q" | "quit" => Action::Quit,
            _ => Action::Refresh,
        }
    }
}

pub struct App<F = SourceFetcher> {
    config: ViewerConfig,
    panels: Vec<PanelConfig>,
    loader: MetricsLoader<F>,
    board: Board,
    once: bool,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let once = args.once;
        let config = ViewerConfig::new(args.config.clone().as_deref(), args)?;
        let fetcher = SourceFetcher::new(config.request_timeout()?)?;
        Ok(Self::with_fetcher(config, fetcher, once))
    }
}

impl<F: Fetch> App<F> {
    pub fn with_fetcher(config: ViewerConfig, fetcher: F, once: bool) -> Self {
        let panels = config.resolved_panels();
        Self {
            board: Board::new(&panels),
            loader: MetricsLoader::new(fetcher),
            panels,
            config,
            once,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub async fn run(&mut self) -> Result<()> {
        info!(panels = self.panels.len(), data_dir = %self.config.data_dir.display(), "Starting viewer");
        self.load_all(false).await;
        self.render();
        if self.once {
            return Ok(());
        }

        let mut ticker = if self.config.auto_refresh {
            let cadence = self.config.refresh_cadence()?;
            info!(interval = %self.config.auto_refresh_interval, "Auto refresh enabled");
            Some(Ticker::new(cadence))
        } else {
            None
        };
        let mut actions = spawn_stdin_reader();
        let mut stdin_open = true;
        println!("Press Enter to refresh, q to quit.");

        loop {
            tokio::select! {
                action = actions.recv(), if stdin_open => match action {
                    Some(Action::Refresh) => {
                        info!("Manual refresh");
                        self.refresh().await;
                    }
                    Some(Action::Quit) => break,
                    None => {
                        debug!("stdin closed");
                        stdin_open = false;
                        if ticker.is_none() {
                            break;
                        }
                    }
                },
                _ = tick(&mut ticker) => {
                    info!("Auto refresh");
                    self.refresh().await;
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    break;
                }
            }
        }
        info!("Viewer stopped");
        Ok(())
    }

    /// Reloads every panel bypassing the cache, then redraws.
    pub async fn refresh(&mut self) {
        self.load_all(true).await;
        self.render();
    }

    /// Loads panels one after another, in configuration order.
    async fn load_all(&mut self, refreshing: bool) {
        for panel in &self.panels {
            let options = if refreshing {
                panel.options.refreshing()
            } else {
                panel.options.clone()
            };
            self.loader
                .load(&panel.source, &panel.id, &options, &mut self.board)
                .await;
        }
    }

    fn render(&self) {
        println!(
            "\n{}\nUpdated {}",
            self.board.render(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }
}

async fn tick(ticker: &mut Option<Ticker>) {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => std::future::pending().await,
    }
}

/// Reads stdin on a plain thread; a blocked read must not hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<Action> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(Action::from_line(&line)).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{
        FetchFuture,
        LoadError,
    };
    use metrics_tracker_series::{
        LoadOptions,
        SourceRef,
    };
    use pretty_assertions::assert_eq;
    use std::{
        path::PathBuf,
        sync::{
            atomic::{
                AtomicUsize,
                Ordering,
            },
            Arc,
        },
    };

    /// Counts fetches; the document grows by one record per fetch.
    #[derive(Clone, Default)]
    struct GrowingFetcher {
        fetches: Arc<AtomicUsize>,
    }

    impl Fetch for GrowingFetcher {
        fn fetch<'a>(&'a self, source: &'a SourceRef, _fresh: bool) -> FetchFuture<'a> {
            Box::pin(async move {
                let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
                match source {
                    SourceRef::Path(path) if path.ends_with("down.json") => Err(LoadError::Transport {
                        source_ref: source.clone(),
                        reason: "unreachable".into(),
                    }),
                    _ => {
                        let records: Vec<_> = (0..n)
                            .map(|i| format!(r#"{{"id":{i},"timestamp":"2024-01-0{}T00:00:00Z","count":{}}}"#, i + 1, (i + 1) * 10))
                            .collect();
                        Ok(format!(r#"{{"stars":[{}]}}"#, records.join(",")).into_bytes())
                    }
                }
            })
        }
    }

    fn config(panels: Vec<PanelConfig>) -> ViewerConfig {
        ViewerConfig {
            data_dir: PathBuf::from("/data"),
            auto_refresh: false,
            auto_refresh_interval: "30m".into(),
            request_timeout: "30s".into(),
            panels,
        }
    }

    fn panel(id: &str, source: &str) -> PanelConfig {
        PanelConfig {
            id: id.into(),
            title: id.into(),
            source: source.parse().unwrap(),
            options: LoadOptions {
                sort_by_timestamp: true,
                show_change: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn lines_map_to_actions() {
        assert_eq!(Action::from_line(""), Action::Refresh);
        assert_eq!(Action::from_line(" q "), Action::Quit);
        assert_eq!(Action::from_line("quit"), Action::Quit);
    }

    #[tokio::test]
    async fn once_renders_every_panel() {
        let fetcher = GrowingFetcher::default();
        let mut app = App::with_fetcher(
            config(vec![panel("stars", "stars.json"), panel("forks", "down.json")]),
            fetcher.clone(),
            true,
        );
        app.run().await.unwrap();

        assert_eq!(app.board().rows("stars").unwrap().len(), 1);
        assert!(app.board().error("forks").unwrap().contains("down.json"));
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_bypasses_the_cache() {
        let fetcher = GrowingFetcher::default();
        let mut app = App::with_fetcher(config(vec![panel("stars", "stars.json")]), fetcher.clone(), true);
        app.run().await.unwrap();
        app.refresh().await;

        let rows = app.board().rows("stars").unwrap();
        assert_eq!(
            rows.iter().map(|row| row.count.as_str()).collect::<Vec<_>>(),
            ["20", "10"]
        );
        assert_eq!(rows[0].change.unwrap().to_string(), "+10 (100.00%)");
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }
}
