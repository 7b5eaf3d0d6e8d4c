mod args;
mod op;
mod ops;
mod session;
mod state;
mod store;
mod version;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Cat, Deelevate, Elevate, Init, Ls, Stat, Status, Tree, Version, Write};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

command_enum! {
    (Init, Init),
    (Ls, Ls),
    (Tree, Tree),
    (Cat, Cat),
    (Stat, Stat),
    (Write, Write),
    (Elevate, Elevate),
    (Deelevate, Deelevate),
    (Status, Status),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr so command output on stdout stays clean
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    let ctx = op::OpContext::new(args.config_path);

    // exit() skips destructors, so flush the log writer first
    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    drop(guard);
    std::process::exit(code);
}
