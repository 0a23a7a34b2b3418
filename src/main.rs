#[macro_use]
extern crate tracing;

mod server;

use anyhow::{Context, bail};
use pixeldeck_common::Deck;
use server::PixelService;
use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const LISTEN_ON: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 443);

#[derive(argh::FromArgs)]
/// Deal the visible pixels of an image to drawing clients, one per request
struct Args {
    #[argh(option, short = 'x', default = "0")]
    /// start position X
    x: i64,

    #[argh(option, short = 'y', default = "0")]
    /// start position Y
    y: i64,

    #[argh(option, default = "PathBuf::from(\"image.png\")")]
    /// image to deal pixels from
    image: PathBuf,

    #[argh(option, default = "LISTEN_ON")]
    /// address to listen on
    listen: SocketAddr,

    #[argh(option)]
    /// PEM certificate chain, enables TLS together with --key
    cert: Option<PathBuf>,

    #[argh(option)]
    /// PEM private key, enables TLS together with --cert
    key: Option<PathBuf>,
}

#[cfg(feature = "tls")]
fn serve_tls(
    addr: SocketAddr,
    service: Arc<PixelService>,
    (cert, key): (PathBuf, PathBuf),
) -> anyhow::Result<()> {
    let certificate = std::fs::read(&cert)
        .with_context(|| format!("failed to read certificate {}", cert.display()))?;
    let private_key =
        std::fs::read(&key).with_context(|| format!("failed to read key {}", key.display()))?;

    let server = rouille::Server::new_ssl(
        addr,
        move |request| service.handle(request),
        certificate,
        private_key,
    )
    .map_err(|error| anyhow::anyhow!(error))
    .context("failed to start TLS listener")?;

    info!("listening on https://{}", server.server_addr());
    server.run();

    Ok(())
}

#[cfg(not(feature = "tls"))]
fn serve_tls(_: SocketAddr, _: Arc<PixelService>, _: (PathBuf, PathBuf)) -> anyhow::Result<()> {
    bail!("built without TLS support, rebuild with the `tls` feature or drop --cert/--key");
}

fn serve_plain(addr: SocketAddr, service: Arc<PixelService>) -> anyhow::Result<()> {
    let server = rouille::Server::new(addr, move |request| service.handle(request))
        .map_err(|error| anyhow::anyhow!(error))
        .context("failed to start listener")?;

    info!("listening on http://{}", server.server_addr());
    server.run();

    Ok(())
}

/// `RUST_LOG`-style directives on top of an `info` default
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Certificate and key, if TLS was asked for
fn tls_config(
    cert: Option<PathBuf>,
    key: Option<PathBuf>,
) -> anyhow::Result<Option<(PathBuf, PathBuf)>> {
    match (cert, key) {
        (Some(cert), Some(key)) => Ok(Some((cert, key))),
        (None, None) => Ok(None),
        _ => bail!("--cert and --key must be given together"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            &env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default(),
        ))
        .init();
    let args: Args = argh::from_env();

    info!("loading {}..", args.image.display());
    let tls = tls_config(args.cert, args.key)?;

    let pixels = pixeldeck_common::load_path(&args.image, (args.x, args.y))
        .with_context(|| format!("failed to load pixels from {}", args.image.display()))?;

    if pixels.is_empty() {
        warn!("image has no visible pixels, every deal will be refused");
    }

    let service = Arc::new(PixelService::new(Deck::new(pixels)));

    match tls {
        Some(tls) => serve_tls(args.listen, service, tls),
        None => {
            warn!("no certificate configured, serving plain http");
            serve_plain(args.listen, service)
        }
    }
}
