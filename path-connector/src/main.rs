use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use path_connector::session::{self, HeadlessPage};
use path_connector::{
    ConnectorConfig, ConnectorError, KakaoGeocoder, LocalIds, PathStore, StaticGeocoder,
    WalkScript,
};
use path_protocol::{LatLng, PathRecord};
use pathdraw::geo::{polyline_length, scale_bar_meters};
use pathdraw::link;
use pathdraw::map::Size;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Connector config file, instead of the one in the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    index_url: Option<String>,

    #[arg(long)]
    upload_url: Option<String>,

    #[arg(long)]
    blob_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List everyone's paths.
    List,
    /// Upload a path record from a JSON file.
    Upload { file: PathBuf },
    /// Ids of the paths uploaded from this machine.
    Mine,
    /// Replay a walk script, then upload the drawn path.
    Walk {
        script: PathBuf,
        #[arg(long)]
        svg: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Render everyone's paths to an SVG file.
    Render {
        out: PathBuf,
        #[arg(long)]
        center: Option<LatLng>,
        #[arg(long)]
        level: Option<u8>,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
    },
    /// Print a link that presets `destination` for someone else.
    Share {
        destination: LatLng,
        #[arg(long, default_value = DEFAULT_ORIGIN)]
        origin: String,
    },
    /// Print the effective config, optionally writing it out.
    Config {
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "path_connector=info,pathdraw=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ConnectorConfig::load(cli.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok());
    if let Some(url) = cli.index_url {
        config.index_url = url;
    }
    if let Some(url) = cli.upload_url {
        config.upload_url = url;
    }
    if let Some(url) = cli.blob_base_url {
        config.blob_base_url = url;
    }

    let store = PathStore::new(&config);

    match cli.command {
        Commands::List => {
            for record in store.fetch_others().await? {
                print_record(&record);
            }
        }
        Commands::Upload { file } => {
            let text = std::fs::read_to_string(&file)?;
            let record: PathRecord = serde_json::from_str(&text)?;
            store.upload(&record).await?;
            local_ids(&config)?.record(&record.id)?;
            println!("Uploaded path {}", record.id);
        }
        Commands::Mine => {
            for id in local_ids(&config)?.load() {
                println!("{id}");
            }
        }
        Commands::Walk {
            script,
            svg,
            dry_run,
        } => {
            let script = WalkScript::load(&script)?;
            let mut page = script.open_page();
            session::refresh_others(&mut page, &store).await;

            match KakaoGeocoder::from_config(&config) {
                Ok(geocoder) => script.draw(&mut page, &geocoder).await?,
                Err(ConnectorError::MissingGeocodeKey) => {
                    script.draw(&mut page, &StaticGeocoder::default()).await?
                }
                Err(err) => return Err(err.into()),
            }

            let result = if dry_run {
                page.arrive().map_err(ConnectorError::from)
            } else {
                session::upload_walk(&mut page, &store, &local_ids(&config)?).await
            };
            if let Some(out) = &svg {
                write_svg(out, &page)?;
            }
            let record = result?;
            print_record(&record);
            let level = page.overlay().map().level();
            if let Some(meters) = scale_bar_meters(level) {
                println!("Drawn at level {level} (scale bar {meters} m)");
            }
            if dry_run {
                println!("Dry run, nothing uploaded");
            }
        }
        Commands::Render {
            out,
            center,
            level,
            width,
            height,
        } => {
            let others = store.fetch_others().await?;
            let count = others.len();
            let svg = session::render_paths(others, Size::new(width, height), center, level);
            std::fs::write(&out, svg)?;
            println!("Rendered {count} paths to {}", out.display());
        }
        Commands::Share {
            destination,
            origin,
        } => {
            println!("{}", link::share_url(&origin, destination));
        }
        Commands::Config { write } => {
            print!("{}", toml::to_string_pretty(&config)?);
            if write {
                let path = config.save(cli.config.as_deref())?;
                println!("# written to {}", path.display());
            }
        }
    }

    Ok(())
}

fn local_ids(config: &ConnectorConfig) -> Result<LocalIds, ConnectorError> {
    Ok(LocalIds::in_dir(&config.data_dir()?))
}

fn print_record(record: &PathRecord) {
    println!(
        "{}\t{}\t{:.0} m\t{} -> {}",
        record.id,
        record.coords.len(),
        polyline_length(&record.coords),
        record.starting,
        record.destination
    );
}

fn write_svg(out: &Path, page: &HeadlessPage) -> Result<(), ConnectorError> {
    std::fs::write(out, session::page_svg(page))?;
    println!("Wrote {}", out.display());
    Ok(())
}
