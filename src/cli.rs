use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ember-wallet")]
#[command(version)]
#[command(about = "A watch-only TUI wallet: transaction activity feed and token price chart")]
pub struct Args {
    /// Tick rate in ticks per second
    #[arg(short, long, default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate in frames per second
    #[arg(short, long, default_value_t = 30.0)]
    pub frame_rate: f64,

    /// Wallet address to watch (overrides the saved config)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Fiat currency code for prices (overrides the saved config)
    #[arg(short, long)]
    pub currency: Option<String>,

    /// Wallet API base URL (overrides the saved config)
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// Data directory path
    #[arg(long)]
    pub data_dir: Option<String>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
