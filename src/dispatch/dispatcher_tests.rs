//! Tests for `Dispatcher` and `DispatcherBuilder`.

use super::*;
use crate::command::{Command, Request};
use crate::fetch::{FetchTimeouts, PublicAddressFetch};
use crate::provider::{ProviderError, Value};
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Echo endpoint that always answers 200 with a fixed address.
#[derive(Debug)]
struct EchoClient;

impl HttpClient for EchoClient {
    async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
        Ok(HttpResponse::with_body(http::StatusCode::OK, "203.0.113.7"))
    }
}

/// Provider that returns an incrementing counter on each call.
struct CountingProvider {
    calls: AtomicUsize,
}

impl crate::provider::InfoProvider for CountingProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Value::text(n.to_string()))
    }
}

fn public_address() -> PublicAddressFetch<EchoClient> {
    PublicAddressFetch::new(
        EchoClient,
        url::Url::parse("https://api.ipify.org?format=text").unwrap(),
        FetchTimeouts::default(),
        tokio::runtime::Handle::current(),
    )
}

/// Builder with every synchronous command answered by its own name.
fn builder_with_all_providers() -> DispatcherBuilder<EchoClient> {
    Command::synchronous().fold(Dispatcher::builder(public_address()), |builder, command| {
        builder.provider(command, move || -> Result<Value, ProviderError> {
            Ok(Value::text(command.name()))
        })
    })
}

fn dispatcher() -> Dispatcher<EchoClient> {
    builder_with_all_providers().build().unwrap()
}

/// Dispatches and returns the synchronously delivered responses.
fn dispatch_now(
    dispatcher: &Dispatcher<EchoClient>,
    request: &Request,
) -> (Vec<Response>, Option<crate::fetch::FetchHandle>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handle = dispatcher.dispatch(request, move |r| sink.lock().unwrap().push(r));
    let responses = std::mem::take(&mut *seen.lock().unwrap());
    (responses, handle)
}

mod routing {
    use super::*;

    #[tokio::test]
    async fn every_supported_command_yields_exactly_one_response() {
        let dispatcher = dispatcher();

        for command in Command::ALL {
            let count = Arc::new(AtomicUsize::new(0));
            let (tx, rx) = tokio::sync::oneshot::channel();
            let counter = Arc::clone(&count);

            let handle = dispatcher.dispatch(&Request::from(command), move |response| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(response);
            });

            let response = rx.await.unwrap();
            if let Some(handle) = handle {
                handle.wait().await;
            }

            assert!(response.is_success(), "{command} failed: {response:?}");
            assert_eq!(count.load(Ordering::SeqCst), 1, "{command}");
        }
    }

    #[tokio::test]
    async fn synchronous_commands_complete_before_dispatch_returns() {
        let dispatcher = dispatcher();

        for command in Command::synchronous() {
            let (responses, handle) = dispatch_now(&dispatcher, &Request::from(command));

            assert!(handle.is_none());
            assert_eq!(responses.len(), 1);
            assert_eq!(responses[0].value(), Some(&Value::text(command.name())));
        }
    }

    #[tokio::test]
    async fn public_address_is_answered_through_the_completion() {
        let dispatcher = dispatcher();
        let (tx, rx) = tokio::sync::oneshot::channel();

        let handle = dispatcher.dispatch(&Request::new("getPublicIPAddress"), move |r| {
            let _ = tx.send(r);
        });

        assert!(handle.is_some());
        let response = rx.await.unwrap();
        assert_eq!(response.value(), Some(&Value::text("203.0.113.7")));
    }

    #[tokio::test]
    async fn arguments_are_ignored() {
        let dispatcher = dispatcher();
        let mut arguments = serde_json::Map::new();
        arguments.insert("unused".to_string(), serde_json::json!(42));
        let request = Request::new("getRamInfo").with_arguments(arguments);

        let (responses, _) = dispatch_now(&dispatcher, &request);

        assert_eq!(responses[0].value(), Some(&Value::text("getRamInfo")));
    }

    #[tokio::test]
    async fn providers_are_read_on_every_call() {
        let dispatcher = builder_with_all_providers()
            .provider(
                Command::BatteryInfo,
                CountingProvider {
                    calls: AtomicUsize::new(0),
                },
            )
            .build()
            .unwrap();
        let request = Request::from(Command::BatteryInfo);

        let first = dispatcher.call(&request).await;
        let second = dispatcher.call(&request).await;

        assert_eq!(first.value(), Some(&Value::text("1")));
        assert_eq!(second.value(), Some(&Value::text("2")));
    }
}

mod unsupported {
    use super::*;

    #[tokio::test]
    async fn unknown_name_fails_synchronously() {
        let dispatcher = dispatcher();

        let (responses, handle) = dispatch_now(&dispatcher, &Request::new("getWeather"));

        assert!(handle.is_none());
        assert_eq!(responses.len(), 1);
        assert!(matches!(
            responses[0].error(),
            Some(DispatchError::UnsupportedCommand(name)) if name == "getWeather"
        ));
    }

    #[tokio::test]
    async fn near_miss_names_are_unsupported() {
        let dispatcher = dispatcher();

        for name in ["getraminfo", "GetRamInfo", "getRamInfo ", "", "getPublicIpAddress"] {
            let response = dispatcher.call(&Request::new(name)).await;
            assert!(
                matches!(response.error(), Some(DispatchError::UnsupportedCommand(_))),
                "{name:?} should be unsupported"
            );
        }
    }

    #[test]
    fn unsupported_code_is_stable() {
        let error = DispatchError::UnsupportedCommand("x".to_string());
        assert_eq!(error.code(), "UNSUPPORTED_COMMAND");
        assert_eq!(error.to_string(), "Unsupported command: x");
    }
}

mod provider_failures {
    use super::*;

    #[tokio::test]
    async fn provider_error_becomes_failure_response() {
        let dispatcher = builder_with_all_providers()
            .provider(Command::BatteryInfo, || -> Result<Value, ProviderError> {
                Err(ProviderError::Unavailable { what: "battery" })
            })
            .build()
            .unwrap();

        let response = dispatcher.call(&Request::from(Command::BatteryInfo)).await;

        let error = response.error().expect("provider failure");
        assert_eq!(error.code(), "PROVIDER_ERROR");
        match error {
            DispatchError::Provider { command, source } => {
                assert_eq!(*command, Command::BatteryInfo);
                assert!(matches!(source, ProviderError::Unavailable { .. }));
            }
            other => panic!("expected provider failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_panic_becomes_failure_response() {
        let dispatcher = builder_with_all_providers()
            .provider(Command::CameraInfo, || -> Result<Value, ProviderError> {
                panic!("camera service crashed")
            })
            .build()
            .unwrap();

        let (responses, _) = dispatch_now(&dispatcher, &Request::from(Command::CameraInfo));

        assert_eq!(responses.len(), 1);
        match responses[0].error() {
            Some(DispatchError::Provider {
                source: ProviderError::Panicked { message },
                ..
            }) => assert_eq!(message, "camera service crashed"),
            other => panic!("expected panic failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_of_one_provider_does_not_affect_others() {
        let dispatcher = builder_with_all_providers()
            .provider(Command::BatteryInfo, || -> Result<Value, ProviderError> {
                Err(ProviderError::Unavailable { what: "battery" })
            })
            .build()
            .unwrap();

        let battery = dispatcher.call(&Request::from(Command::BatteryInfo)).await;
        let ram = dispatcher.call(&Request::from(Command::RamInfo)).await;

        assert!(!battery.is_success());
        assert_eq!(ram.value(), Some(&Value::text("getRamInfo")));
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn concurrent_public_address_calls_both_complete() {
        let dispatcher = dispatcher();
        let request = Request::from(Command::PublicIpAddress);

        let (a, b) = tokio::join!(dispatcher.call(&request), dispatcher.call(&request));

        assert_eq!(a.value(), Some(&Value::text("203.0.113.7")));
        assert_eq!(b.value(), Some(&Value::text("203.0.113.7")));
    }
}

mod builder {
    use super::*;

    #[tokio::test]
    async fn missing_provider_is_rejected() {
        let result = Dispatcher::builder(public_address())
            .provider(Command::DeviceInfo, || -> Result<Value, ProviderError> {
                Ok(Value::Null)
            })
            .build();

        assert_eq!(
            result.unwrap_err(),
            BuildError::MissingProvider(Command::RamInfo)
        );
    }

    #[tokio::test]
    async fn provider_for_async_command_is_rejected() {
        let result = builder_with_all_providers()
            .provider(Command::PublicIpAddress, || -> Result<Value, ProviderError> {
                Ok(Value::Null)
            })
            .build();

        assert_eq!(
            result.unwrap_err(),
            BuildError::AsyncCommand(Command::PublicIpAddress)
        );
    }

    #[tokio::test]
    async fn debug_lists_registered_commands() {
        let debug = format!("{:?}", dispatcher());

        assert!(debug.contains("Dispatcher"));
        assert!(debug.contains("RamInfo"));
        assert!(debug.contains("api.ipify.org"));
    }

    #[test]
    fn build_error_messages_name_the_command() {
        assert_eq!(
            BuildError::MissingProvider(Command::RamInfo).to_string(),
            "No provider registered for getRamInfo"
        );
        assert!(
            BuildError::AsyncCommand(Command::PublicIpAddress)
                .to_string()
                .contains("getPublicIPAddress")
        );
    }
}
