use hyper::Method;
use leagues_api::id::LeagueId;
use leagues_api::leagues::{League, PartialLeague};

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
    let leagues = req.state().store.leagues().list().await?;

    Ok(Response::ok().json(&leagues))
}

async fn get(req: Request, id: LeagueId) -> Result {
    match req.state().store.leagues().get(id).await? {
        Some(league) => Ok(Response::ok().json(&league)),
        None => Err(StatusCodeError::not_found().message("No such league").into()),
    }
}

async fn create(mut req: Request) -> Result {
    req.authorize(WRITE_ROLES)?;

    let league: League = req.json().await?;

    let id = req.state().store.leagues().insert(&league).await?;

    match req.state().store.leagues().get(id).await? {
        Some(league) => Ok(Response::created().json(&league)),
        None => Err(StatusCodeError::internal_server_error()
            .message("League was inserted but could not be read back")
            .into()),
    }
}

async fn update(mut req: Request, id: LeagueId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let partial: PartialLeague = req.json().await?;
    if partial.is_empty() {
        return Err(StatusCodeError::bad_request()
            .message("No updates provided")
            .into());
    }

    let rows = req.state().store.leagues().update(id, &partial).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such league").into());
    }

    match req.state().store.leagues().get(id).await? {
        Some(league) => Ok(Response::ok().json(&league)),
        None => Err(StatusCodeError::internal_server_error()
            .message("League was updated but could not be read back")
            .into()),
    }
}

async fn delete(req: Request, id: LeagueId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let rows = req.state().store.leagues().delete(id).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such league").into());
    }

    Ok(Response::ok().json(&Message::new(format!("League with ID {} deleted", id))))
}
