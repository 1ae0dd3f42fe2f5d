use hyper::Method;
use leagues_api::id::MatchId;
use leagues_api::matches::{Match, PartialMatch};

use crate::auth::WRITE_ROLES;
use crate::http::{Message, Request, RequestUri, Response, Result};
use crate::{method, StatusCodeError};

pub async fn route(req: Request, mut uri: RequestUri<'_>) -> Result {
    match uri.take() {
        None => method!(req, {
            Method::GET => list(req).await,
            Method::POST => create(req).await,
        }),
        Some(part) => {
            let id = part.parse()?;

            match uri.take_str() {
                None => method!(req, {
                    Method::GET => get(req, id).await,
                    Method::PUT => update(req, id).await,
                    Method::DELETE => delete(req, id).await,
                }),
                Some(_) => Err(StatusCodeError::not_found().into()),
            }
        }
    }
}

async fn list(req: Request) -> Result {
    let matches = req.state().store.matches().list().await?;

    Ok(Response::ok().json(&matches))
}

async fn get(req: Request, id: MatchId) -> Result {
    match req.state().store.matches().get(id).await? {
        Some(m) => Ok(Response::ok().json(&m)),
        None => Err(StatusCodeError::not_found().message("No such match").into()),
    }
}

async fn create(mut req: Request) -> Result {
    req.authorize(WRITE_ROLES)?;

    let m: Match = req.json().await?;

    let id = req.state().store.matches().insert(&m).await?;

    match req.state().store.matches().get(id).await? {
        Some(m) => Ok(Response::created().json(&m)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Match was inserted but could not be read back")
            .into()),
    }
}

async fn update(mut req: Request, id: MatchId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let partial: PartialMatch = req.json().await?;
    if partial.is_empty() {
        return Err(StatusCodeError::bad_request()
            .message("No updates provided")
            .into());
    }

    let rows = req.state().store.matches().update(id, &partial).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such match").into());
    }

    match req.state().store.matches().get(id).await? {
        Some(m) => Ok(Response::ok().json(&m)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Match was updated but could not be read back")
            .into()),
    }
}

async fn delete(req: Request, id: MatchId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let rows = req.state().store.matches().delete(id).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such match").into());
    }

    Ok(Response::ok().json(&Message::new(format!("Match with ID {} deleted", id))))
}
