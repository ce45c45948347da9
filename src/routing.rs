//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState, Error,
    auth::{auth_guard, get_session, post_log_in, post_log_out, register_user},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budgets_endpoint,
        update_budget_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        update_category_endpoint,
    },
    endpoints,
    goal::{create_goal_endpoint, delete_goal_endpoint, get_goals_endpoint, update_goal_endpoint},
    import::{extract_statement_endpoint, preview_import_endpoint},
    preferences::{get_preferences_endpoint, update_preferences_endpoint},
    report::{get_charts_endpoint, get_summary_endpoint},
    transaction::{
        create_transaction_endpoint, create_transactions_in_bulk_endpoint,
        delete_transaction_endpoint, get_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route except registration, log in and log out requires a valid
/// session cookie.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(endpoints::SESSION, get(get_session))
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint)
                .post(create_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint)
                .post(create_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BULK_TRANSACTIONS,
            post(create_transactions_in_bulk_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint)
                .post(create_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::GOALS,
            get(get_goals_endpoint)
                .post(create_goal_endpoint)
                .put(update_goal_endpoint)
                .delete(delete_goal_endpoint),
        )
        .route(endpoints::REPORT_SUMMARY, get(get_summary_endpoint))
        .route(endpoints::REPORT_CHARTS, get(get_charts_endpoint))
        .route(endpoints::IMPORT_EXTRACT, post(extract_statement_endpoint))
        .route(endpoints::IMPORT_PREVIEW, post(preview_import_endpoint))
        .route(
            endpoints::PREFERENCES,
            get(get_preferences_endpoint).put(update_preferences_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
