use hyper::Method;
use leagues_api::auth::{Claims, LoginData, RegisterData, TokenResponse};

use crate::http::{Message, Request, RequestUri, Response, Result};
use crate::store::users::UserRecord;
use crate::{auth, method, StatusCodeError};

pub async fn register(mut req: Request, mut uri: RequestUri<'_>) -> Result {
    if uri.take_str().is_some() {
        return Err(StatusCodeError::not_found().into());
    }

    method!(req, {
        Method::POST => {
            let data: RegisterData = req.json().await?;

            let record = UserRecord::new(data.username, &data.password, data.role);

            if !req.state().users.insert(record).await? {
                return Err(StatusCodeError::bad_request()
                    .message("Username already taken")
                    .into());
            }

            Ok(Response::created().json(&Message::new("User registered successfully")))
        },
    })
}

pub async fn login(mut req: Request, mut uri: RequestUri<'_>) -> Result {
    if uri.take_str().is_some() {
        return Err(StatusCodeError::not_found().into());
    }

    method!(req, {
        Method::POST => {
            let data: LoginData = req.json().await?;

            let user = match req.state().users.find(&data.username).await {
                Some(user) => user,
                None => {
                    return Err(StatusCodeError::unauthorized()
                        .message("Invalid username or password")
                        .into())
                }
            };

            if !auth::password_verify(&data.password, &user.password) {
                return Err(StatusCodeError::unauthorized()
                    .message("Invalid username or password")
                    .into());
            }

            let token = req
                .state()
                .auth
                .create_token(Claims::new(user.username, user.role))?;

            Ok(Response::ok().json(&TokenResponse { token }))
        },
    })
}
