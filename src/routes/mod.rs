use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::config::security::security_header_layers;
use crate::handlers::{self, admin, announcements, auth, events, posts, societies, students};
use crate::state::AppState;
use crate::utils::upload::MAX_UPLOAD_BYTES;

// Multipart framing overhead on top of the attachment size cap.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn create_routes(state: AppState) -> Router {
    let uploads = ServeDir::new(state.config.upload_dir.clone());

    let api = Router::new()
        .route("/login", post(auth::login))
        // Admin dashboard
        .route("/admin/societies", get(admin::list_societies))
        .route("/admin/societies/:id/approve", post(admin::approve_society))
        .route("/admin/societies/:id/posts", put(admin::replace_posts))
        .route("/admin/societies/:id", delete(admin::delete_society))
        .route(
            "/admin/venues",
            get(admin::list_venues).post(admin::add_venue),
        )
        .route("/admin/venues/:name", delete(admin::delete_venue))
        .route("/admin/events/pending", get(admin::pending_events))
        .route("/admin/events/all", get(admin::all_events))
        .route(
            "/admin/events/:id/:event_index/:action",
            post(admin::set_event_status),
        )
        // Society dashboard. The bare `:id` lookup routes take the society
        // *name*; the deeper mutation routes take the society id.
        .route("/societies", post(societies::register))
        .route("/societies/:id", get(societies::get_by_name))
        .route("/societies/:id/applications", get(societies::applications))
        .route(
            "/societies/:id/applications/:student_name/approve",
            post(societies::approve_application),
        )
        .route(
            "/societies/:id/applications/:student_name/reject",
            post(societies::reject_application),
        )
        .route("/societies/:id/posts", post(posts::create_post))
        .route(
            "/societies/:id/posts/:post_index",
            put(posts::edit_post).delete(posts::delete_post),
        )
        .route(
            "/societies/:id/posts/:post_index/comments/:comment_index",
            delete(posts::delete_comment),
        )
        .route(
            "/societies/:id/posts/:post_index/attachments",
            post(posts::add_attachment),
        )
        .route(
            "/societies/:id/posts/:post_index/attachments/:attachment_index",
            delete(posts::delete_attachment),
        )
        .route(
            "/societies/:id/members/:member_name/role",
            post(societies::assign_role).delete(societies::remove_role),
        )
        .route(
            "/societies/:id/members/:member_name/history",
            get(societies::member_history).post(societies::add_member_history),
        )
        .route(
            "/societies/:id/members/:student_name/leave",
            post(societies::leave),
        )
        .route("/societies/:id/events", post(events::book_event))
        .route("/societies/:id/events/reminders", get(events::reminders))
        .route(
            "/societies/:id/events/:event_index/comments",
            post(events::add_event_comment),
        )
        .route("/societies/:id/announcements", post(announcements::schedule))
        .route(
            "/societies/:id/announcements/upcoming",
            get(announcements::upcoming),
        )
        // Student dashboard
        .route("/students/:name/applications", get(students::applications).post(students::apply))
        .route(
            "/students/:name/posts/:society_id/:post_index/comments",
            post(students::comment_on_post),
        );

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state);

    for layer in security_header_layers() {
        router = router.layer(layer);
    }
    router
}
