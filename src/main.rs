use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use optees::config::Settings;
use optees::solve::{configure, json_config};

// ---------- Server bootstrap ----------
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env();

    // Keep the guard alive for the whole process so events are flushed on exit
    let _sentry = settings.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let port = settings.port;
    let json_limit = settings.json_limit;
    let settings = web::Data::new(settings);

    log::info!("Starting server on http://0.0.0.0:{}", port);
    HttpServer::new(move || {
        App::new()
            .wrap(sentry_actix::Sentry::new())
            .wrap(Logger::default())
            .app_data(settings.clone())
            .app_data(json_config(json_limit))
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
