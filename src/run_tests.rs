//! Tests for the run module.

use super::*;

use std::collections::HashMap;

use telemetry_dispatch::dispatch::DispatcherBuilder;
use telemetry_dispatch::fetch::FetchTimeouts;
use telemetry_dispatch::provider::{ProviderError, Value};
use telemetry_dispatch::transport::{HttpRequest, HttpResponse};
use tokio::io::AsyncReadExt;

/// Echo endpoint answering after `delay`.
#[derive(Debug)]
struct SlowEcho {
    delay: std::time::Duration,
}

impl HttpClient for SlowEcho {
    async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
        tokio::time::sleep(self.delay).await;
        Ok(HttpResponse::with_body(http::StatusCode::OK, "203.0.113.7"))
    }
}

fn dispatcher(delay: std::time::Duration) -> Dispatcher<SlowEcho> {
    let public_address = PublicAddressFetch::new(
        SlowEcho { delay },
        url::Url::parse("http://echo.test/ip").unwrap(),
        FetchTimeouts::default(),
        Handle::current(),
    );

    let builder: DispatcherBuilder<SlowEcho> = Command::synchronous().fold(
        Dispatcher::builder(public_address),
        |builder, command| {
            builder.provider(command, move || -> Result<Value, ProviderError> {
                match command {
                    Command::BatteryInfo => Err(ProviderError::Unavailable { what: "battery" }),
                    _ => Ok(Value::text(command.name())),
                }
            })
        },
    );
    builder.build().unwrap()
}

/// Runs `serve` over `input` and returns the summary and parsed output lines.
async fn run_serve(
    dispatcher: &Dispatcher<SlowEcho>,
    input: &str,
) -> (ServeSummary, Vec<serde_json::Value>) {
    let (output, mut reader) = tokio::io::duplex(64 * 1024);

    let summary = serve(dispatcher, input.as_bytes(), output, std::future::pending())
        .await
        .unwrap();

    let mut text = String::new();
    reader.read_to_string(&mut text).await.unwrap();
    let lines = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (summary, lines)
}

fn by_id(lines: &[serde_json::Value]) -> HashMap<String, serde_json::Value> {
    lines
        .iter()
        .map(|line| (line["id"].to_string(), line.clone()))
        .collect()
}

mod run_error {
    use super::*;

    #[test]
    fn query_failed_displays_command() {
        let error = RunError::QueryFailed("getBatteryInfo".to_string());
        assert_eq!(error.to_string(), "Query 'getBatteryInfo' failed");
    }

    #[test]
    fn assemble_displays_source() {
        let error = RunError::Assemble(BuildError::MissingProvider(Command::RamInfo));
        assert_eq!(
            error.to_string(),
            "Failed to assemble dispatcher: No provider registered for getRamInfo"
        );
    }
}

mod command_list {
    use super::*;

    #[test]
    fn lists_every_command_once() {
        let list = command_list();

        assert_eq!(list.lines().count(), Command::ALL.len());
        assert!(list.lines().any(|l| l == "getPublicIPAddress (async)"));
        assert!(list.lines().any(|l| l == "versionInfo"));
    }
}

mod build {
    use super::*;
    use telemetry_dispatch::config::{Cli, ValidatedConfig};

    #[tokio::test]
    async fn production_dispatcher_covers_every_command() {
        let cli = Cli::parse_from_iter(["telemetry-dispatch"]);
        let config = ValidatedConfig::from_raw(&cli, None).unwrap();

        let dispatcher = build_dispatcher(&config, Handle::current());

        assert!(dispatcher.is_ok());
    }
}

mod query_mode {
    use super::*;

    #[tokio::test]
    async fn success_line_and_flag() {
        let dispatcher = dispatcher(std::time::Duration::ZERO);

        let (line, success) = query(&dispatcher, "getRamInfo").await.unwrap();

        assert!(success);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["value"], "getRamInfo");
    }

    #[tokio::test]
    async fn public_address_waits_for_lookup() {
        let dispatcher = dispatcher(std::time::Duration::from_millis(10));

        let (line, success) = query(&dispatcher, "getPublicIPAddress").await.unwrap();

        assert!(success);
        assert!(line.contains("203.0.113.7"));
    }

    #[tokio::test]
    async fn unsupported_command_is_failure() {
        let dispatcher = dispatcher(std::time::Duration::ZERO);

        let (line, success) = query(&dispatcher, "getWeather").await.unwrap();

        assert!(!success);
        assert!(line.contains("UNSUPPORTED_COMMAND"));
    }
}

mod serve_mode {
    use super::*;

    #[tokio::test]
    async fn answers_every_line_with_its_id() {
        let dispatcher = dispatcher(std::time::Duration::ZERO);
        let input = concat!(
            r#"{"id":1,"command":"getRamInfo"}"#,
            "\n",
            r#"{"id":2,"command":"getBatteryInfo"}"#,
            "\n",
            r#"{"id":3,"command":"getWeather"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"id":5,"command":"getPublicIPAddress"}"#,
            "\n",
        );

        let (summary, lines) = run_serve(&dispatcher, input).await;

        assert_eq!(
            summary,
            ServeSummary {
                dispatched: 4,
                malformed: 1
            }
        );
        assert_eq!(lines.len(), 5);

        let responses = by_id(&lines);
        assert_eq!(responses["1"]["value"], "getRamInfo");
        assert_eq!(responses["2"]["error"]["kind"], "PROVIDER_ERROR");
        assert_eq!(responses["3"]["error"]["kind"], "UNSUPPORTED_COMMAND");
        assert_eq!(responses["null"]["error"]["kind"], "MALFORMED_REQUEST");
        assert_eq!(responses["5"]["value"], "203.0.113.7");
    }

    #[tokio::test]
    async fn synchronous_responses_keep_request_order() {
        let dispatcher = dispatcher(std::time::Duration::ZERO);
        let input = concat!(
            r#"{"id":"a","command":"versionInfo"}"#,
            "\n",
            r#"{"id":"b","command":"getCameraInfo"}"#,
            "\n",
            r#"{"id":"c","command":"getSystemInfo"}"#,
            "\n",
        );

        let (_, lines) = run_serve(&dispatcher, input).await;

        let ids: Vec<_> = lines.iter().map(|l| l["id"].clone()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_is_drained_after_end_of_input() {
        let dispatcher = dispatcher(std::time::Duration::from_secs(3));
        let input = concat!(
            r#"{"id":1,"command":"getPublicIPAddress"}"#,
            "\n",
            r#"{"id":2,"command":"getDeviceInfo"}"#,
            "\n",
        );

        let (_, lines) = run_serve(&dispatcher, input).await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 2);
        assert_eq!(lines[1]["id"], 1);
        assert_eq!(lines[1]["value"], "203.0.113.7");
    }

    #[tokio::test]
    async fn shutdown_stops_reading() {
        let dispatcher = dispatcher(std::time::Duration::ZERO);
        let (output, mut reader) = tokio::io::duplex(1024);

        let summary = serve(
            &dispatcher,
            r#"{"id":1,"command":"getRamInfo"}"#.as_bytes(),
            output,
            std::future::ready(()),
        )
        .await
        .unwrap();

        let mut text = String::new();
        reader.read_to_string(&mut text).await.unwrap();
        assert_eq!(summary, ServeSummary::default());
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let dispatcher = dispatcher(std::time::Duration::ZERO);

        let (summary, lines) = run_serve(&dispatcher, "").await;

        assert_eq!(summary, ServeSummary::default());
        assert!(lines.is_empty());
    }
}
