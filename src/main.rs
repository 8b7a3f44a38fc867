mod app;
mod audio;
mod browser;
mod config;
mod engine;
mod error;
mod library;
mod logging;
mod playlist;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
