use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use activity_tracker::config::Config;
use activity_tracker::db::init_db;
use activity_tracker::docs::ApiDoc;
use activity_tracker::{routes, telemetry};

#[get("/")]
async fn index() -> impl Responder {
    "Daily Activity Tracker"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _guard = telemetry::init_file_logging(&config.log_dir);

    info!(
        timezone = %config.org_timezone,
        grace_minutes = config.grace_period_minutes,
        "Server starting..."
    );

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to the database")?;
    let policy = config.attendance_policy();
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard matches the JS/CSS assets
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(policy))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
