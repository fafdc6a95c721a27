pub mod handlers;
pub mod objects;

use actix_web::web;

/// Route table, shared between the binary and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::handle_home))
        .route("/", web::post().to(handlers::handle_submit))
        .route("/recent", web::get().to(handlers::handle_recent));
}
