use actix_web::{App, HttpServer, middleware, web};

use pollboard::config::Config;
use pollboard::gateway::PollGateway;
use pollboard::{routes, session_middleware};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    if let Ok(path) = dotenv {
        log::info!("Loaded environment from {}", path.display());
    }

    let config = Config::load();

    let http = reqwest::Client::builder()
        .user_agent(concat!("pollboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(std::io::Error::other)?;
    let gateway = PollGateway::new(http, &config.api_base_url);

    log::info!("Poll backend at {}", config.api_base_url);
    log::info!("Starting server at http://{}", config.bind_addr);

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(&config))
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(config.clone()))
            .service(actix_files::Files::new("/static", "./static"))
            .configure(routes::config_routes)
            // Default 404 handler (must be registered last)
            .default_service(web::to(routes::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
