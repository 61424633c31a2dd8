use crate::{
    config::Config,
    data::{Data, NewUser, create_id},
    error::ApiError,
};

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use once_cell::sync::Lazy;
use rand::{TryRngCore, rngs::OsRng};
use reqwest::{Client, ClientBuilder, redirect};
use serde::Deserialize;
use sha2::Sha256;

pub fn init(config: &Config) -> Result<(String, String)> {
    let state = generate_state().context("error generating state")?;

    let url = format!(
        "{url}?client_id={client_id}&redirect_uri={redirect_uri}&scope={scope}&response_type={response_type}&state={state}",
        url = config.auth_init_url,
        client_id = config.auth_client_id,
        redirect_uri = redirect_uri(config),
        scope = "openid%20email%20profile",
        response_type = "code",
        state = state,
    );

    return Ok((url, state));
}

fn redirect_uri(config: &Config) -> String {
    format!("{url}/api/v1/auth/callback", url = config.back_base_url)
}

fn generate_state() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("error generating random")?;

    return Ok(URL_SAFE_NO_PAD.encode(&bytes));
}

pub static AUTH_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .redirect(redirect::Policy::none())
        .build()
        .expect("creating AUTH_CLIENT")
});

#[derive(Deserialize)]
struct TokenRes {
    pub access_token: String,
}

#[derive(Deserialize)]
struct UserInfoRes {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn callback(
    config: &Config,
    data: &Data,
    code: &str,
    state: &str,
    stored_state: &str,
) -> Result<String, ApiError> {
    if state != stored_state {
        return Err(ApiError::BadRequest("states dont match".to_string()));
    }

    let userinfo = fetch_userinfo(config, code).await?;

    let user = NewUser {
        id: create_id(),
        external_id: userinfo.sub,
        name: userinfo.name,
        email: userinfo.email,
    };

    return start_session(config, data, &user).await;
}

async fn fetch_userinfo(config: &Config, code: &str) -> Result<UserInfoRes> {
    let redirect_uri = redirect_uri(config);

    let token_res = AUTH_CLIENT
        .post(&config.auth_token_url)
        .form(&[
            ("code", code),
            ("client_id", config.auth_client_id.as_str()),
            ("client_secret", config.auth_client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .context("error executing token req")?
        .error_for_status()
        .context("token req failed")?
        .json::<TokenRes>()
        .await
        .context("error parsing token res")?;

    let userinfo = AUTH_CLIENT
        .get(&config.auth_userinfo_url)
        .bearer_auth(&token_res.access_token)
        .send()
        .await
        .context("error executing userinfo req")?
        .error_for_status()
        .context("userinfo req failed")?
        .json::<UserInfoRes>()
        .await
        .context("error parsing userinfo res json")?;

    return Ok(userinfo);
}

/// Stores the user and a fresh session, returns the signed cookie value.
async fn start_session(config: &Config, data: &Data, user: &NewUser) -> Result<String, ApiError> {
    let session_id = create_id();

    let user_id = data
        .users
        .upsert_with_session(user, &session_id)
        .await
        .context("error upserting user and session")?;

    tracing::info!(user_id = %user_id, "session started");

    return Ok(create_token(&config.secret, &user_id, &session_id));
}

pub async fn logout(data: &Data, user_id: &str, session_id: &str) -> Result<()> {
    data.sessions
        .delete(user_id, session_id)
        .await
        .context("error deleting session")?;

    tracing::info!(user_id = %user_id, "session ended");

    return Ok(());
}

pub async fn ___dev_login___(config: &Config, data: &Data) -> Result<String, ApiError> {
    let user = NewUser {
        id: create_id(),
        external_id: create_id(),
        name: Some("Dev User".to_owned()),
        email: None,
    };

    return start_session(config, data, &user).await;
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub user_id: String,
    pub session_id: String,
}

static ID_SPLITTER: &str = ".";
static SIGNATURE_SPLITTER: &str = ":";

type HmacSha256 = Hmac<Sha256>;

fn new_mac(secret: &str, data_to_sign: &str) -> HmacSha256 {
    // hmac accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("error creating hmac");
    mac.update(data_to_sign.as_bytes());
    mac
}

pub fn create_token(secret: &str, user_id: &str, session_id: &str) -> String {
    let data = format!("{user_id}{ID_SPLITTER}{session_id}");

    let signature = hex::encode(new_mac(secret, &data).finalize().into_bytes());

    return format!("{data}{SIGNATURE_SPLITTER}{signature}");
}

pub fn verify_token(secret: &str, token: &str) -> Result<Token, anyhow::Error> {
    let (data, signature) = token
        .split_once(SIGNATURE_SPLITTER)
        .context("could not split token into data and signature")?;

    let signature = hex::decode(signature).context("signature is not hex")?;

    new_mac(secret, data)
        .verify_slice(&signature)
        .map_err(|_| anyhow::anyhow!("invalid signature"))?;

    let (user_id, session_id) = data
        .split_once(ID_SPLITTER)
        .context("could not split token data into user_id and session_id")?;

    return Ok(Token {
        user_id: user_id.to_string(),
        session_id: session_id.to_string(),
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn token_round_trips() {
        let token = create_token("secret", "user", "session");

        assert_eq!(
            verify_token("secret", &token).expect("valid"),
            Token {
                user_id: "user".to_owned(),
                session_id: "session".to_owned(),
            }
        );
    }

    #[test]
    fn token_with_other_secret_is_rejected() {
        let token = create_token("secret", "user", "session");

        assert!(verify_token("other", &token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = create_token("secret", "user", "session");
        let tampered = token.replacen("user", "admin", 1);

        assert!(verify_token("secret", &tampered).is_err());
        assert!(verify_token("secret", "no-signature").is_err());
        assert!(verify_token("secret", "user.session:zz").is_err());
    }

    #[test]
    fn init_url_carries_state_and_callback() {
        let config = test_config();

        let (url, state) = init(&config).expect("init");

        assert!(url.starts_with(&config.auth_init_url));
        assert!(url.contains(&format!("state={state}")));
        assert!(url.contains("redirect_uri=http://localhost:8000/api/v1/auth/callback"));
        assert_eq!(state.len(), 43);
    }
}
