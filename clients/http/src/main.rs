use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    middleware::{self, Condition},
    web::Data,
    App, HttpServer,
};
use anyhow::Context;
use clap::Parser;
use database::database::database::Database;
use phonebook_server::{config::Cli, routes, service::PhonebookService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the environment and flags still apply
    let _ = dotenvy::dotenv();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let request_manager = Database::new(args.database_options())
        .with_context(|| format!("Unable to open database at {}", args.data.display()))?
        .run()?;

    let service = Data::new(PhonebookService::new(Arc::new(request_manager.clone())));

    log::info!("starting HTTP server on {}:{}", args.address, args.port);

    let log_http = args.log_http;

    // Start HTTP server, it stops on its own on ctrl-c / SIGTERM
    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .configure(routes::configure)
            .wrap(Cors::permissive())
            .wrap(Condition::new(
                log_http,
                middleware::Logger::new("%r %s %b - %D ms"),
            ))
    })
    .workers(args.http_workers)
    .bind((args.address.as_str(), args.port))
    .with_context(|| format!("Unable to bind {}:{}", args.address, args.port))?
    .run()
    .await?;

    // Every request has finished, let the database drain its queue and stop
    let shutdown_response = request_manager.send_shutdown_request()?;

    log::info!("Shutting down server: {}", shutdown_response);

    Ok(())
}
