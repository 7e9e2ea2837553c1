//! HTTP route table
//!
//! Paths mirror what the deployed web frontend already calls, quirks
//! included (`/doctorForm`, `/doctorEdit/:id`, `/invoice/:uid`). Everything
//! under `/api` except the auth group sits behind the bearer-token
//! middleware; the greeting and health probe stay open.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    auth, companies, doctors, health, patients, payment_letters, roles, web_users,
};
use crate::middleware::{create_cors_layer, request_timing_middleware, require_auth};
use crate::server::MediClaimServer;

/// Whole-request cap for multipart bodies. Individual files are held to a
/// tighter limit at upload time; this only bounds what axum will buffer.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn create_router(server: MediClaimServer) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/user/:uid", get(auth::get_user));

    let doctor_routes = Router::new()
        .route("/", get(doctors::list_doctors))
        .route("/doctor", post(doctors::create_doctor))
        .route("/doctorForm", post(doctors::create_doctor_form))
        .route(
            "/doctor/:id",
            get(doctors::get_doctor).delete(doctors::delete_doctor),
        )
        .route("/doctorId/:id", get(doctors::get_doctor_by_uid))
        .route("/doctorEdit/:id", put(doctors::update_doctor));

    let patient_routes = Router::new()
        .route("/", get(patients::list_patients))
        .route("/patient", post(patients::create_patient))
        .route("/patient/:uid", get(patients::get_patient))
        .route("/patientEdit/:uid", put(patients::update_patient));

    let company_routes = Router::new()
        .route("/", get(companies::list_companies))
        .route("/company", post(companies::create_company))
        .route("/company/:id", get(companies::get_company))
        .route("/companyEdit/:id", put(companies::update_company))
        .route("/insurance-company/:id", delete(companies::delete_company));

    let web_user_routes = Router::new()
        .route(
            "/",
            get(web_users::list_web_users).post(web_users::create_web_user),
        )
        .route(
            "/:id",
            get(web_users::get_web_user_by_uid)
                .put(web_users::update_web_user)
                .delete(web_users::delete_web_user),
        )
        .route("/userId/:id", get(web_users::get_web_user));

    let role_routes = Router::new()
        .route("/", get(roles::list_roles).post(roles::create_role))
        .route(
            "/:id",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        );

    let payment_letter_routes = Router::new()
        .route("/", get(payment_letters::list_payment_letters))
        .route(
            "/doctor/:doctor_id",
            get(payment_letters::get_payment_letters_by_doctor),
        )
        .route("/invoice", post(payment_letters::create_payment_letter))
        .route("/invoice/:uid", get(payment_letters::get_payment_letter))
        .route(
            "/invoiceEdit/:uid",
            put(payment_letters::update_payment_letter),
        );

    let protected = Router::new()
        .nest("/api/users/doctors", doctor_routes)
        .nest("/api/users/patients", patient_routes)
        .nest("/api/companies", company_routes)
        .nest("/api/webUsers", web_user_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/paymentLetters", payment_letter_routes)
        .route_layer(middleware::from_fn_with_state(server.clone(), require_auth));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(create_cors_layer(&server.config))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_timing_middleware))
        .with_state(server)
}
