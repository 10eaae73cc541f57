use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "project-hub")]
#[command(about = "Project workspace backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, short, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Verbose output")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Address to listen on (overrides config)")]
        bind: Option<SocketAddr>,
    },

    #[command(about = "Initialize the database")]
    Initdb {
        #[arg(long, help = "Drop existing tables first")]
        drop: bool,
    },

    #[command(about = "Finish filesystem operations left pending by an interrupted request")]
    Reconcile,
}
