use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, ChainResponse, ErrorResponse, NewBlockRequest, NewBlockResponse, ValidateResponse,
};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

/// Get the full ledger.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: ledger.len(),
        difficulty: ledger.difficulty().leading_zeros,
        chain: ledger.blocks(),
    };
    HttpResponse::Ok().json(resp)
}

/// Get a single block by index.
#[get("/blocks/{index}/")]
pub async fn get_block(state: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let index = path.into_inner();
    let ledger = state.ledger.lock().expect("mutex poisoned");
    match ledger.get(index) {
        Some(block) => HttpResponse::Ok().json(block),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("no block at index {index}"),
        }),
    }
}

/// Validate the whole ledger.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let resp = ValidateResponse {
        valid: ledger.validate_chain(),
        length: ledger.len(),
        difficulty: ledger.difficulty().leading_zeros,
    };
    HttpResponse::Ok().json(resp)
}

/// Build, seal and append a block from the submitted transactions.
/// The lock is held across build and append so no other writer can move the tail.
#[post("/blocks/")]
pub async fn append_block(
    state: web::Data<AppState>,
    req: web::Json<NewBlockRequest>,
) -> impl Responder {
    let transactions = match to_transactions(req.into_inner()) {
        Ok(txs) => txs,
        Err(e) => return error_response(e),
    };

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    let block = match ledger.build_next_block(transactions) {
        Ok(block) => block,
        Err(e) => return error_response(e),
    };
    match ledger.append_block(block) {
        Ok(block) => {
            info!(
                "API - block #{} added ({} txs)",
                block.index(),
                block.transactions().len()
            );
            HttpResponse::Ok().json(NewBlockResponse {
                index: block.index(),
                hash: block.hash().to_string(),
                nonce: block.nonce(),
                previous_hash: block.previous_hash().to_string(),
            })
        }
        Err(e) => error_response(e),
    }
}

/* -------------------- Helpers -------------------- */

fn to_transactions(req: NewBlockRequest) -> Result<Vec<Transaction>> {
    req.transactions
        .into_iter()
        .map(|t| Transaction::new(t.from, t.to, t.amount, t.kind))
        .collect()
}

fn error_response(err: LedgerError) -> HttpResponse {
    warn!("API - request failed: {err}");
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err {
        LedgerError::InvalidAmount(_) => HttpResponse::BadRequest().json(body),
        LedgerError::SealingTimeout { .. } => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::Conflict().json(body),
    }
}
