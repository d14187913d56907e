//! Terminal walkthrough of the calendar core.
//!
//! Run with `RUST_LOG=tessera_calendar=debug` to see navigation decisions.

fn main() {
    init_tracing();
    if let Err(err) = example::run() {
        tracing::error!("calendar demo failed: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("error,tessera_calendar=info") {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
