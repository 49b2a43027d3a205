use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use std::sync::Arc;

use crate::{ServerError, accounts, budgets, categories, currencies, payees, tags, transactions};
use engine::{Engine, users};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolve the caller from the bearer token.
///
/// The token is an already-verified email (a gateway in front of the
/// server does the actual verification). First contact creates the user
/// row; every request bumps `last_seen_at`.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let email = auth_header.token().trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let found = users::Entity::find()
        .filter(users::Column::Email.eq(email.clone()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = match found {
        Some(user) => {
            let touched = users::ActiveModel {
                id: ActiveValue::Set(user.id.clone()),
                last_seen_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            touched
                .update(&state.db)
                .await
                .map_err(|_| StatusCode::UNAUTHORIZED)?
        }
        None => {
            let now = Utc::now();
            let fresh = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                email: ActiveValue::Set(email),
                created_at: ActiveValue::Set(now),
                last_seen_at: ActiveValue::Set(now),
            };
            fresh
                .insert(&state.db)
                .await
                .map_err(|_| StatusCode::UNAUTHORIZED)?
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub(crate) fn caller_id(user: &users::Model) -> Result<Uuid, ServerError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| ServerError::Generic("malformed user id".to_string()))
}

/// Wire-level tri-state to engine tri-state.
pub(crate) fn into_patch<T>(patch: api_types::Patch<T>) -> engine::Patch<T> {
    match patch {
        api_types::Patch::Absent => engine::Patch::Absent,
        api_types::Patch::Null => engine::Patch::Null,
        api_types::Patch::Set(value) => engine::Patch::Set(value),
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/currencies", get(currencies::list))
        .route("/budgets", post(budgets::create).get(budgets::list))
        .route(
            "/budgets/{budget_id}",
            get(budgets::get).patch(budgets::update).delete(budgets::remove),
        )
        .route(
            "/budgets/{budget_id}/members",
            get(budgets::list_members).post(budgets::add_member),
        )
        .route(
            "/budgets/{budget_id}/members/{user_id}",
            axum::routing::delete(budgets::remove_member),
        )
        .route(
            "/budgets/{budget_id}/accounts",
            post(accounts::create).get(accounts::list),
        )
        .route(
            "/budgets/{budget_id}/accounts/{account_id}",
            get(accounts::get)
                .patch(accounts::update)
                .delete(accounts::remove),
        )
        .route(
            "/budgets/{budget_id}/categories",
            post(categories::create).get(categories::list),
        )
        .route(
            "/budgets/{budget_id}/categories/{category_id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::remove),
        )
        .route(
            "/budgets/{budget_id}/payees",
            post(payees::create).get(payees::list),
        )
        .route(
            "/budgets/{budget_id}/payees/{payee_id}",
            get(payees::get)
                .patch(payees::rename)
                .delete(payees::remove),
        )
        .route(
            "/budgets/{budget_id}/tags",
            post(tags::create).get(tags::list),
        )
        .route(
            "/budgets/{budget_id}/tags/{tag_id}",
            get(tags::get).patch(tags::rename).delete(tags::remove),
        )
        .route(
            "/budgets/{budget_id}/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route(
            "/budgets/{budget_id}/transactions/bulk",
            post(transactions::bulk_import),
        )
        .route(
            "/budgets/{budget_id}/transactions/{transaction_id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::remove),
        )
        .route(
            "/budgets/{budget_id}/transactions/{transaction_id}/split",
            post(transactions::split),
        )
        .route(
            "/budgets/{budget_id}/transfers",
            post(transactions::transfer),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router(state)).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
