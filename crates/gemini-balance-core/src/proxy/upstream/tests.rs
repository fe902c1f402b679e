use gemini_balance_types::GatewayConfig;

use super::UpstreamClient;

fn client_for(base: &str) -> UpstreamClient {
    let config =
        GatewayConfig { upstream_base_url: base.to_string(), ..GatewayConfig::default() };
    UpstreamClient::new(reqwest::Client::new(), &config)
}

#[test]
fn test_build_url() {
    let client = client_for("https://generativelanguage.googleapis.com");

    let url1 = client.build_url("/models/foo", Some("x=1"));
    assert_eq!(url1, "https://generativelanguage.googleapis.com/v1beta/models/foo?x=1");

    let url2 = client.build_url("/models/gemini-pro:streamGenerateContent", Some("alt=sse&key=k"));
    assert_eq!(
        url2,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:streamGenerateContent?alt=sse&key=k"
    );
}

#[test]
fn test_build_url_normalizes_path_and_empty_query() {
    let client = client_for("http://127.0.0.1:9000/");

    assert_eq!(client.build_url("models", None), "http://127.0.0.1:9000/v1beta/models");
    assert_eq!(client.build_url("/models", Some("")), "http://127.0.0.1:9000/v1beta/models");
}

#[test]
fn test_build_openai_url() {
    let client = client_for("http://127.0.0.1:9000");
    assert_eq!(
        client.build_openai_url("/chat/completions"),
        "http://127.0.0.1:9000/v1beta/openai/chat/completions"
    );
}

#[test]
fn test_limiter_uses_configured_capacity() {
    let config = GatewayConfig {
        rate_limit_capacity: 3,
        rate_limit_refill_rate: 1,
        fetch_timeout_ms: 1_234,
        ..GatewayConfig::default()
    };
    let client = UpstreamClient::new(reqwest::Client::new(), &config);
    assert_eq!(client.limiter().capacity(), 3.0);
    assert_eq!(client.limiter().refill_rate(), 1.0);
    assert_eq!(client.timeout().limit().as_millis(), 1_234);
}
