use actix_web::{HttpResponse, web};

use crate::handlers::{admin_handlers, auth_handlers, student_handlers};

/// Route table of the portal. `/` is the student view, `/admin` the admin
/// view; the two never share a handler.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(student_handlers::index))
        .route("/username", web::post().to(student_handlers::capture_username))
        .route("/polls/{id}/vote", web::post().to(student_handlers::vote))
        .route("/polls/{id}/respond", web::post().to(student_handlers::respond))
        .route("/logout", web::post().to(student_handlers::logout))
        .service(
            web::scope("/admin")
                .route("", web::get().to(admin_handlers::index))
                .route("/polls", web::post().to(admin_handlers::create))
                .route("/polls/{id}", web::post().to(admin_handlers::update))
                .route("/polls/{id}/delete", web::post().to(admin_handlers::delete))
                .route("/polls/{id}/clear", web::post().to(admin_handlers::clear_votes))
                .route("/logout", web::post().to(auth_handlers::admin_logout)),
        );
}

/// Fallback for unknown paths.
pub async fn not_found() -> HttpResponse {
    let html = include_str!("../templates/errors/404.html");
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
