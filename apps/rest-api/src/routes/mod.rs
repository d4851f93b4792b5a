//! Route modules and router assembly.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod auth;
pub mod cards;
pub mod customers;
pub mod deliveries;
pub mod messages;
pub mod notifications;
pub mod payments;
pub mod quick_tickets;
pub mod reports;
pub mod settings;
pub mod tickets;

/// Builds the full application router.
pub fn app() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Auth & accounts
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route(
            "/api/account",
            get(auth::get_account)
                .put(auth::update_account)
                .delete(auth::delete_employee),
        )
        // Customers
        .route("/api/customers", get(customers::list).post(customers::create))
        .route("/api/customers/search", get(customers::search))
        .route(
            "/api/customers/{id}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::remove),
        )
        // Tickets
        .route("/api/tickets", get(tickets::list).post(tickets::create))
        .route(
            "/api/tickets/{id}",
            get(tickets::get).put(tickets::update).delete(tickets::remove),
        )
        .route(
            "/api/tickets/{id}/delivery-status",
            get(tickets::delivery_status).patch(tickets::set_delivery_status),
        )
        // Quick tickets
        .route(
            "/api/quick-tickets",
            get(quick_tickets::outstanding).post(quick_tickets::create),
        )
        .route("/api/quick-tickets/{id}/convert", post(quick_tickets::convert))
        // Payments
        .route("/api/balance", get(payments::balance))
        .route(
            "/api/payments",
            get(payments::history).post(payments::make_payment),
        )
        .route("/api/charge", post(payments::charge))
        .route("/api/bills", post(payments::pay_bill))
        .route("/api/billing-statements", get(payments::billing_statements))
        .route("/api/receipts/{id}", get(payments::receipt))
        // Saved cards
        .route("/api/credit-cards", get(cards::list).post(cards::add))
        .route("/api/credit-cards/{id}", delete(cards::remove))
        .route("/api/credit-cards/{id}/set-default", post(cards::set_default))
        // Notifications
        .route(
            "/api/notifications",
            get(notifications::list).post(notifications::create),
        )
        .route("/api/notifications/read", post(notifications::mark_read))
        // Deliveries
        .route("/api/delivery/request", post(deliveries::request))
        .route(
            "/api/delivery/status",
            get(deliveries::status).put(deliveries::update_status),
        )
        .route("/api/delivery/{id}", delete(deliveries::cancel))
        .route(
            "/api/delivery/addresses",
            get(deliveries::addresses).post(deliveries::add_address),
        )
        .route("/api/delivery-range", get(deliveries::check_range))
        // Messages
        .route("/api/messages", get(messages::list).post(messages::send))
        // Reports
        .route("/api/reports/orders", get(reports::orders))
        .route("/api/reports/bills", get(reports::bills))
        // Settings
        .route("/api/settings", get(settings::get_settings))
        .route("/api/settings/language", post(settings::update_language))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() {}
