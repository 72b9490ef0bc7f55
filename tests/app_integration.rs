use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const STOCKS: &str = r#"[
        {"symbol": "YPFD", "px_bid": 38000, "px_ask": 38100, "c": 38050, "pct_change": 1.2, "q_bid": 10, "q_ask": 25, "v": 1500000000},
        {"symbol": "GGAL", "px_bid": 6100, "px_ask": 6120, "c": 6110, "pct_change": -0.8}
    ]"#;
    pub const BONDS: &str = r#"[
        {"symbol": "AL30", "px_bid": 1495, "px_ask": 1500, "c": 1498, "pct_change": 0.4},
        {"symbol": "AL30D", "px_bid": 1450, "px_ask": 1460, "c": 1455, "pct_change": 0.1}
    ]"#;
    pub const NOTES: &str = r#"[{"symbol": "YCA6O", "px_bid": 101.5, "px_ask": 102.0}]"#;
    pub const MEP: &str = r#"[{"ticker": "AL30", "bid": 1180.5, "ask": 1190.25, "v_ars": 1000000, "v_usd": 850}]"#;

    pub async fn mount(server: &MockServer, endpoint: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn create_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/live/arg_stocks", 200, STOCKS).await;
        mount(&mock_server, "/live/arg_bonds", 200, BONDS).await;
        mount(&mock_server, "/live/arg_ons", 200, NOTES).await;
        mount(&mock_server, "/live/arg_mep", 200, MEP).await;
        mock_server
    }

    pub fn write_config(base_url: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
        providers:
          data912:
            base_url: {base_url}
        refresh_interval_ms: 5000
        calculator:
          buy_symbol: "AL30"
          sell_symbol: "AL30D"
    "#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_show_every_tab_with_mock() {
    let mock_server = test_utils::create_mock_server().await;
    let config_file = test_utils::write_config(&mock_server.uri());
    let config_path = config_file.path().to_str().unwrap();

    for tab in argdash::core::view::Tab::ALL {
        info!(%tab, "Showing tab");
        let result = argdash::run_command(
            argdash::AppCommand::Show {
                tab,
                search: Some("al".to_string()),
            },
            Some(config_path),
        )
        .await;
        assert!(result.is_ok(), "Show {tab} failed with: {:?}", result.err());
    }
}

#[test_log::test(tokio::test)]
async fn test_show_fails_when_an_endpoint_fails() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount(&mock_server, "/live/arg_stocks", 200, test_utils::STOCKS).await;
    test_utils::mount(&mock_server, "/live/arg_bonds", 200, test_utils::BONDS).await;
    test_utils::mount(&mock_server, "/live/arg_ons", 503, "unavailable").await;
    test_utils::mount(&mock_server, "/live/arg_mep", 200, test_utils::MEP).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = argdash::run_command(
        argdash::AppCommand::Show {
            tab: argdash::core::view::Tab::Stocks,
            search: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let error = result.unwrap_err().to_string();
    assert!(error.contains("HTTP error: 503"), "unexpected error: {error}");
}

#[test_log::test(tokio::test)]
async fn test_calc_with_mock() {
    let mock_server = test_utils::create_mock_server().await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = argdash::run_command(
        argdash::AppCommand::Calc {
            amount: "100000".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Calc failed with: {:?}", result.err());

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.url.path() == "/live/arg_bonds"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_path_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");

    let result = argdash::run_command(
        argdash::AppCommand::Watch,
        Some(missing.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_fails() {
    let config_file = tempfile::NamedTempFile::new().unwrap();
    fs::write(config_file.path(), "refresh_interval_ms: [not, a, number]").unwrap();

    let result = argdash::run_command(
        argdash::AppCommand::Calc {
            amount: "1000".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_refresh_controller_against_mock() {
    use argdash::core::{RefreshController, RefreshOutcome, Store};
    use argdash::providers::data912::Data912Provider;
    use std::sync::Arc;
    use std::time::Duration;

    let mock_server = test_utils::create_mock_server().await;
    let provider = Arc::new(Data912Provider::new(&mock_server.uri()).unwrap());
    let store = Store::new();
    let controller = RefreshController::new(provider, store.clone(), Duration::from_secs(20));

    assert_eq!(controller.manual_refresh().await, RefreshOutcome::Applied);
    assert_eq!(controller.manual_refresh().await, RefreshOutcome::Skipped);

    store.read(|state| {
        assert_eq!(state.snapshot.stocks.len(), 2);
        assert_eq!(state.snapshot.mep.len(), 1);
        assert!(state.last_update.is_some());
        assert!(state.last_error.is_none());
    });
}
