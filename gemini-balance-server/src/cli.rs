use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gemini-balance",
    about = "Gemini Balance - API key load-balancing gateway",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "GATEWAY_PORT", default_value = "8000")]
    pub port: u16,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
