use hyper::Method;
use leagues_api::id::PlayerId;
use leagues_api::players::{PartialPlayer, Player};

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
    let players = req.state().store.players().list().await?;

    Ok(Response::ok().json(&players))
}

async fn get(req: Request, id: PlayerId) -> Result {
    match req.state().store.players().get(id).await? {
        Some(player) => Ok(Response::ok().json(&player)),
        None => Err(StatusCodeError::not_found().message("No such player").into()),
    }
}

async fn create(mut req: Request) -> Result {
    req.authorize(WRITE_ROLES)?;

    let player: Player = req.json().await?;

    let id = req.state().store.players().insert(&player).await?;

    match req.state().store.players().get(id).await? {
        Some(player) => Ok(Response::created().json(&player)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Player was inserted but could not be read back")
            .into()),
    }
}

async fn update(mut req: Request, id: PlayerId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let partial: PartialPlayer = req.json().await?;
    if partial.is_empty() {
        return Err(StatusCodeError::bad_request()
            .message("No updates provided")
            .into());
    }

    let rows = req.state().store.players().update(id, &partial).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such player").into());
    }

    match req.state().store.players().get(id).await? {
        Some(player) => Ok(Response::ok().json(&player)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Player was updated but could not be read back")
            .into()),
    }
}

async fn delete(req: Request, id: PlayerId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let rows = req.state().store.players().delete(id).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such player").into());
    }

    Ok(Response::ok().json(&Message::new(format!("Player with ID {} deleted", id))))
}
