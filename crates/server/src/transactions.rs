//! Transaction API endpoints

use api_types::transaction::{
    BulkImport, BulkImportResponse, ImportDraft, LineNew, LineUpdate, LineView, TransactionNew,
    TransactionSplit, TransactionUpdate, TransactionView, TransactionsResponse, TransferNew,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, caller_id, into_patch},
};
use engine::{
    BulkImportCmd, CreateTransactionCmd, CreateTransferCmd, LinePatch, NewLine, Patch,
    SplitTransactionCmd, TransactionDraft, UpdateTransactionCmd, users,
};

fn map_line_new(line: LineNew) -> NewLine {
    let mut out = NewLine::new(line.account_id, line.amount_minor).tags(line.tag_ids);
    if let Some(category_id) = line.category_id {
        out = out.category(category_id);
    }
    if let Some(payee_id) = line.payee_id {
        out = out.payee(payee_id);
    }
    if let Some(memo) = line.memo {
        out = out.memo(memo);
    }
    out
}

fn map_line_patch(line: LineUpdate) -> LinePatch {
    let mut out = LinePatch::new(line.line_id)
        .category(into_patch(line.category_id))
        .payee(into_patch(line.payee_id))
        .memo(into_patch(line.memo));
    if let Some(account_id) = line.account_id {
        out = out.account(account_id);
    }
    if let Some(amount_minor) = line.amount_minor {
        out = out.amount(amount_minor);
    }
    if let Some(tag_ids) = line.tag_ids {
        out = out.tags(tag_ids);
    }
    out
}

fn map_posted_at(
    patch: api_types::Patch<DateTime<FixedOffset>>,
) -> Patch<DateTime<Utc>> {
    match into_patch(patch) {
        Patch::Absent => Patch::Absent,
        Patch::Null => Patch::Null,
        Patch::Set(value) => Patch::Set(value.with_timezone(&Utc)),
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        posted_at: tx.posted_at.fixed_offset(),
        status: tx.status.as_str().to_string(),
        notes: tx.notes,
        import_id: tx.import_id,
        created_at: tx.created_at.fixed_offset(),
        lines: tx
            .lines
            .into_iter()
            .map(|line| LineView {
                id: line.id,
                account_id: line.account_id,
                category_id: line.category_id,
                payee_id: line.payee_id,
                amount_minor: line.amount_minor,
                memo: line.memo,
                tag_ids: line.tag_ids,
            })
            .collect(),
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let user_id = caller_id(&user)?;

    let mut cmd = CreateTransactionCmd::new(budget_id, user_id, map_line_new(payload.line));
    if let Some(posted_at) = payload.posted_at {
        cmd = cmd.posted_at(posted_at.with_timezone(&Utc));
    }
    if let Some(status) = payload.status {
        cmd = cmd.status(status);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(import_id) = payload.import_id {
        cmd = cmd.import_id(import_id);
    }

    let tx = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let user_id = caller_id(&user)?;
    let txs = state.engine.list_transactions(budget_id, user_id).await?;
    Ok(Json(TransactionsResponse {
        transactions: txs.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TransactionView>, ServerError> {
    let user_id = caller_id(&user)?;
    let tx = state
        .engine
        .transaction(budget_id, transaction_id, user_id)
        .await?;
    Ok(Json(view(tx)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let user_id = caller_id(&user)?;

    let lines = match into_patch(payload.lines) {
        Patch::Absent => Patch::Absent,
        Patch::Null => Patch::Null,
        Patch::Set(lines) => Patch::Set(lines.into_iter().map(map_line_patch).collect()),
    };
    let cmd = UpdateTransactionCmd::new(budget_id, transaction_id, user_id)
        .posted_at(map_posted_at(payload.posted_at))
        .status(into_patch(payload.status))
        .notes(into_patch(payload.notes))
        .import_id(into_patch(payload.import_id))
        .lines(lines);

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(view(tx)))
}

pub async fn split(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TransactionSplit>,
) -> Result<Json<TransactionView>, ServerError> {
    let user_id = caller_id(&user)?;

    let cmd = SplitTransactionCmd {
        budget_id,
        transaction_id,
        user_id,
        lines: payload.lines.into_iter().map(map_line_new).collect(),
    };
    let tx = state.engine.split_transaction(cmd).await?;
    Ok(Json(view(tx)))
}

pub async fn transfer(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let user_id = caller_id(&user)?;

    let mut cmd = CreateTransferCmd::new(
        budget_id,
        user_id,
        payload.from_account_id,
        payload.to_account_id,
        payload.amount_minor,
    )
    .tags(payload.tag_ids);
    if let Some(posted_at) = payload.posted_at {
        cmd = cmd.posted_at(posted_at.with_timezone(&Utc));
    }
    if let Some(status) = payload.status {
        cmd = cmd.status(status);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(payee_id) = payload.payee_id {
        cmd = cmd.payee(payee_id);
    }
    if let Some(memo) = payload.memo {
        cmd = cmd.memo(memo);
    }
    if let Some(import_id) = payload.import_id {
        cmd = cmd.import_id(import_id);
    }

    let tx = state.engine.create_transfer(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((budget_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let user_id = caller_id(&user)?;
    state
        .engine
        .delete_transaction(budget_id, transaction_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_draft(draft: ImportDraft) -> TransactionDraft {
    let mut out = TransactionDraft::new(draft.import_id, map_line_new(draft.line));
    if let Some(posted_at) = draft.posted_at {
        out = out.posted_at(posted_at.with_timezone(&Utc));
    }
    if let Some(status) = draft.status {
        out = out.status(status);
    }
    if let Some(notes) = draft.notes {
        out = out.notes(notes);
    }
    out
}

pub async fn bulk_import(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<BulkImport>,
) -> Result<(StatusCode, Json<BulkImportResponse>), ServerError> {
    let user_id = caller_id(&user)?;

    let cmd = BulkImportCmd {
        budget_id,
        user_id,
        drafts: payload.transactions.into_iter().map(map_draft).collect(),
    };
    let outcome = state.engine.bulk_import(cmd).await?;

    let status = if outcome.created > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(BulkImportResponse {
            created: outcome.created,
            existing: outcome.existing,
        }),
    ))
}
