use dear_multiview_app::{HostConfig, logging, run};

fn main() {
    if std::env::args().any(|arg| arg == "--verbose") {
        logging::init_tracing_dev();
    } else {
        logging::init_tracing();
    }

    let config = HostConfig::default().with_ini_filename("dear-multiview.ini");
    if let Err(e) = run(config) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
