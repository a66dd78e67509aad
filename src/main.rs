use std::io::{stdin, stdout};

use leischema::{
    cli::CliApp,
    core::SQLError,
    schema::SchemaManager,
    sql::Engine,
    util::init_logger,
};
use log::{error, info};

fn run() -> Result<(), SQLError> {
    let engine = Engine::new();
    let session = engine.session()?;

    // Optional initial database.
    if let Some(database) = std::env::args().nth(1) {
        let manager = SchemaManager::detect(&session)?;
        manager.create_database_if_not_exist(&database)?;
        session.execute(&format!("USE {}", database.trim()))?;
        info!("Using database {}", database.trim());
    }

    let stdin = stdin();
    let mut app = CliApp::new(session, stdin.lock(), stdout());
    app.run()
}

pub fn main() {
    if let Err(e) = init_logger() {
        eprintln!("failed to install logger: {}", e);
    }

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
