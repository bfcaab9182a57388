//! Command-line and environment settings.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use events_indexer_pipeline::consumer::WatchOptions;
use events_indexer_pipeline::loader::{LoaderConfig, RetryPolicy};
use events_indexer_repository::SinkOptions;
use events_indexer_shared::IndexTarget;

/// Default Elasticsearch URL.
const DEFAULT_ELASTICSEARCH_HOST: &str = "http://127.0.0.1:9200/";

/// Default index name.
const DEFAULT_ELASTICSEARCH_INDEX: &str = "kubernetesevents";

/// Default document type.
const DEFAULT_ELASTICSEARCH_TYPE: &str = "kubernetestable";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Settings for the events indexer.
///
/// Every flag can also be set through its environment variable; a `.env`
/// file in the working directory is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(name = "events-indexer")]
#[command(about = "Relay Kubernetes events into an Elasticsearch/OpenSearch index", long_about = None)]
pub struct Settings {
    /// Path to a kubeconfig file. Uses the in-cluster identity when unset.
    #[arg(long, env = "KUBECONFIG_PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Elasticsearch host URL.
    #[arg(long, env = "ELASTICSEARCH_HOST", default_value = DEFAULT_ELASTICSEARCH_HOST)]
    pub elasticsearch_host: String,

    /// Elasticsearch index name.
    #[arg(long, env = "ELASTICSEARCH_INDEX", default_value = DEFAULT_ELASTICSEARCH_INDEX)]
    pub elasticsearch_index: String,

    /// Elasticsearch document type. Empty for typeless clusters.
    #[arg(long, env = "ELASTICSEARCH_TYPE", default_value = DEFAULT_ELASTICSEARCH_TYPE)]
    pub elasticsearch_type: String,

    /// Make every document visible to searches before it is acknowledged.
    #[arg(long, env = "ELASTICSEARCH_REFRESH", default_value_t = true, action = ArgAction::Set)]
    pub refresh: bool,

    /// Timeout for each request to Elasticsearch, in seconds. 0 disables it.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Retries for a failed delivery before the event is dropped.
    #[arg(long, env = "DELIVERY_MAX_RETRIES", default_value_t = 0)]
    pub max_retries: u32,

    /// Wait before the first retry, in milliseconds. Doubles per retry.
    #[arg(long, env = "DELIVERY_RETRY_BACKOFF_MS", default_value_t = 200)]
    pub retry_backoff_ms: u64,

    /// Server-side watch timeout, in seconds (1 to 294). Unset keeps the watch
    /// open. The process exits when the watch ends.
    #[arg(
        long,
        env = "WATCH_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u32).range(1..295)
    )]
    pub watch_timeout_secs: Option<u32>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Settings {
    /// Where documents are written.
    pub fn index_target(&self) -> IndexTarget {
        IndexTarget::new(&self.elasticsearch_index, &self.elasticsearch_type)
    }

    /// Options for the index sink.
    pub fn sink_options(&self) -> SinkOptions {
        match self.request_timeout_secs {
            0 => SinkOptions::without_timeout(),
            secs => SinkOptions::with_request_timeout(Duration::from_secs(secs)),
        }
    }

    /// Delivery policy for the loader.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            refresh: self.refresh,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                initial_backoff: Duration::from_millis(self.retry_backoff_ms),
                ..Default::default()
            },
        }
    }

    /// Options for the event watch.
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            timeout_secs: self.watch_timeout_secs,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["events-indexer"]).unwrap();

        assert!(settings.kubeconfig.is_none());
        assert_eq!(settings.elasticsearch_host, "http://127.0.0.1:9200/");
        assert_eq!(
            settings.index_target(),
            IndexTarget::new("kubernetesevents", "kubernetestable")
        );
        assert!(settings.refresh);
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert_eq!(
            settings.sink_options().request_timeout,
            Some(Duration::from_secs(30))
        );

        let loader = settings.loader_config();
        assert!(loader.refresh);
        assert_eq!(loader.retry.max_retries, 0);
        assert!(settings.watch_options().timeout_secs.is_none());
    }

    #[test]
    fn test_flags() {
        let settings = Settings::try_parse_from([
            "events-indexer",
            "--kubeconfig",
            "/home/ops/.kube/config",
            "--elasticsearch-host",
            "http://es.logging.svc:9200/",
            "--elasticsearch-index",
            "cluster-events",
            "--elasticsearch-type",
            "",
            "--refresh",
            "false",
            "--request-timeout-secs",
            "0",
            "--max-retries",
            "3",
            "--retry-backoff-ms",
            "50",
            "--watch-timeout-secs",
            "240",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(
            settings.kubeconfig,
            Some(PathBuf::from("/home/ops/.kube/config"))
        );
        assert_eq!(settings.index_target().document_path(), "/cluster-events/_doc");
        assert!(!settings.refresh);
        assert!(settings.sink_options().request_timeout.is_none());
        assert_eq!(settings.log_format, LogFormat::Json);

        let loader = settings.loader_config();
        assert!(!loader.refresh);
        assert_eq!(loader.retry.max_retries, 3);
        assert_eq!(loader.retry.initial_backoff, Duration::from_millis(50));
        assert_eq!(settings.watch_options().timeout_secs, Some(240));
    }

    #[test]
    fn test_rejects_out_of_range_watch_timeout() {
        for value in ["0", "295", "300"] {
            let result =
                Settings::try_parse_from(["events-indexer", "--watch-timeout-secs", value]);
            assert!(result.is_err(), "accepted watch timeout {}", value);
        }

        let settings =
            Settings::try_parse_from(["events-indexer", "--watch-timeout-secs", "294"]).unwrap();
        assert_eq!(settings.watch_options().timeout_secs, Some(294));
    }

    #[test]
    fn test_rejects_invalid_log_format() {
        let result = Settings::try_parse_from(["events-indexer", "--log-format", "xml"]);
        assert!(result.is_err());
    }
}
