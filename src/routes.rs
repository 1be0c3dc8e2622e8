use crate::{
    api::{activity, dashboard},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Requests per minute per peer IP, burst up to the full minute's allowance.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/activity")
                    .route("/check-in", web::post().to(activity::check_in))
                    .route("/check-out", web::post().to(activity::check_out))
                    .route("/status", web::get().to(activity::status))
                    .route("/history", web::get().to(activity::history)),
            )
            .service(
                web::scope("/dashboard")
                    .route("", web::get().to(dashboard::personal))
                    .route("/admin", web::get().to(dashboard::admin)),
            ),
    );
}
