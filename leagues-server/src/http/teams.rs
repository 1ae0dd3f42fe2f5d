use hyper::Method;
use leagues_api::id::TeamId;
use leagues_api::teams::{PartialTeam, Team};

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
    let teams = req.state().store.teams().list().await?;

    Ok(Response::ok().json(&teams))
}

async fn get(req: Request, id: TeamId) -> Result {
    match req.state().store.teams().get(id).await? {
        Some(team) => Ok(Response::ok().json(&team)),
        None => Err(StatusCodeError::not_found().message("No such team").into()),
    }
}

async fn create(mut req: Request) -> Result {
    req.authorize(WRITE_ROLES)?;

    let team: Team = req.json().await?;

    let id = req.state().store.teams().insert(&team).await?;

    match req.state().store.teams().get(id).await? {
        Some(team) => Ok(Response::created().json(&team)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Team was inserted but could not be read back")
            .into()),
    }
}

async fn update(mut req: Request, id: TeamId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let partial: PartialTeam = req.json().await?;
    if partial.is_empty() {
        return Err(StatusCodeError::bad_request()
            .message("No updates provided")
            .into());
    }

    let rows = req.state().store.teams().update(id, &partial).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such team").into());
    }

    match req.state().store.teams().get(id).await? {
        Some(team) => Ok(Response::ok().json(&team)),
        None => Err(StatusCodeError::internal_server_error()
            .message("Team was updated but could not be read back")
            .into()),
    }
}

async fn delete(req: Request, id: TeamId) -> Result {
    req.authorize(WRITE_ROLES)?;

    let rows = req.state().store.teams().delete(id).await?;
    if rows == 0 {
        return Err(StatusCodeError::not_found().message("No such team").into());
    }

    Ok(Response::ok().json(&Message::new(format!("Team with ID {} deleted", id))))
}
