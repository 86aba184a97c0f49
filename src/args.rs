use clap::Parser;
use std::path::PathBuf;

/// Terminal viewer for community growth metrics
#[derive(Parser, Debug, Clone)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Optional viewer config file (yaml), replacing `viewer.yaml` in the config directory.
    #[clap(long, value_name = "FILE", env = "METRICS_TRACKER_VIEWER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reload every panel on the configured interval (30 minutes by default).
    #[clap(long = "auto-refresh", env = "METRICS_TRACKER_AUTO_REFRESH", action)]
    pub auto_refresh: bool,

    /// Render every panel once and exit.
    #[clap(long, action)]
    pub once: bool,

    /// Log at debug level.
    #[clap(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if self.auto_refresh {
                cache.insert("auto_refresh".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = metrics_tracker_config::get_config_dir().display().to_string();
    let data_dir_path = metrics_tracker_config::get_data_dir().display().to_string();

    format!(
        "\
{}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        env!("CARGO_PKG_VERSION")
    )
}
