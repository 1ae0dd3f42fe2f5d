use hyper::Method;
use leagues_api::games::{Game, PartialGame};
use leagues_api::id::GameId;

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
            let code = part.parse()?;

            match uri.take_str() {
                None => method!(req, {
                    Method::GET => get(req, code).await,
                    Method::PUT => update(req, code).await,
                    Method::DELETE => delete(req, code).await,
                }),
                Some(_) => Err(StatusCodeError::not_found().into()),
            }
        }
    }
}

async fn list(req: Request) -> Result {
    let games = req.state().store.games().list().await?;

    Ok(Response::ok().json(&games))
}

async fn get(req: Request, code: GameId) -> Result {
    match req.state().store.games().get(code).await? {
        Some(game) => Ok(Response::ok().json(&game)),
        None => Err(StatusCodeError::not_found().message("No such game").into()),
    }
}

async fn create(mut req: Request) -> Result {
    req.authorize(WRITE_ROLES)?;

    let game: Game = req.json().await?;

    let code = req.state().store.games().insert(&game).await?;

    match req.state().store.games().get(code).await? {
        Some(game) => Ok(Response::created().json(&game)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Game was inserted but could not be read back")
            .into()),
    }
}

async fn update(mut req: Request, code: GameId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let partial: PartialGame = req.json().await?;
    if partial.is_empty() {
        return Err(StatusCodeError::bad_request()
            .message("No updates provided")
            .into());
    }

    let rows = req.state().store.games().update(code, &partial).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such game").into());
    }

    match req.state().store.games().get(code).await? {
        Some(game) => Ok(Response::ok().json(&game)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Game was updated but could not be read back")
            .into()),
    }
}

async fn delete(req: Request, code: GameId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let rows = req.state().store.games().delete(code).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such game").into());
    }

    Ok(Response::ok().json(&Message::new(format!("Game with Code {} deleted", code))))
}
