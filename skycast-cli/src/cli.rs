use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use skycast_core::{
    CancellationToken, Config, FixedLocationResolver, IpLocationResolver, LocationResolver,
    Notifier, PanelState, Phase, Readout, UpdateChannel, WeatherFetcher, panel,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Live weather panel")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Optional explicit coordinates; without them the position is resolved
/// from the machine's public IP.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude override.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude override.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    fn resolver(&self) -> Box<dyn LocationResolver> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Box::new(FixedLocationResolver::new(lat, lon)),
            _ => Box::new(IpLocationResolver::new()),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and print the current weather once.
    Show {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Run the live panel: fetch once, then re-render on every push
    /// update until Ctrl-C.
    Watch {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Persist endpoint overrides to the config file.
    Configure {
        /// Weather service base URL (HTTP API and push channel).
        #[arg(long)]
        service_url: Option<String>,

        /// Icon image host base URL.
        #[arg(long)]
        icon_url: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Show { location } => show(&location).await,
            Command::Watch { location } => watch(&location).await,
            Command::Configure { service_url, icon_url } => configure(service_url, icon_url),
        }
    }
}

async fn show(location: &LocationArgs) -> Result<()> {
    let config = Config::load()?;
    let fetcher = WeatherFetcher::new(config.weather_endpoint());
    let resolver = location.resolver();

    match panel::fetch_snapshot(resolver.as_ref(), &fetcher).await {
        Ok(snapshot) => {
            print_readout(&Readout::derive(&snapshot, &config.icon_url));
            Ok(())
        }
        Err(failure) => {
            tracing::error!(error = %failure, "weather fetch failed");
            anyhow::bail!("Failed to fetch weather data.")
        }
    }
}

async fn watch(location: &LocationArgs) -> Result<()> {
    let config = Config::load()?;
    let fetcher = WeatherFetcher::new(config.weather_endpoint());
    let channel = UpdateChannel::new(config.events_endpoint());
    let resolver = location.resolver();

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    let icon_base = config.icon_url.clone();
    panel::run_panel(
        resolver,
        fetcher,
        channel,
        &StderrNotifier,
        move |state| render(state, &icon_base),
        shutdown,
    )
    .await;

    Ok(())
}

fn configure(service_url: Option<String>, icon_url: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(url) = service_url {
        config.service_url = url;
    }
    if let Some(url) = icon_url {
        config.icon_url = url;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify_error(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn render(state: &PanelState, icon_base: &str) {
    match state.phase() {
        Phase::Loading => println!("Loading weather..."),
        // The error notice already went to stderr.
        Phase::Failed => {}
        Phase::Ready => {
            if let Some(snapshot) = state.snapshot() {
                print_readout(&Readout::derive(snapshot, icon_base));
            }
        }
    }
}

fn print_readout(readout: &Readout) {
    println!("Location:    {}", readout.location.as_deref().unwrap_or("-"));
    println!("Temperature: {}", readout.temperature.as_deref().unwrap_or("-"));
    println!("Conditions:  {}", readout.description.as_deref().unwrap_or("-"));
    println!("Icon:        {}", readout.icon_url.as_deref().unwrap_or("-"));
}
