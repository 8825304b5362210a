//! Login and logout against the remote API.

use validator::Validate;

use crate::forms::login::LoginForm;
use crate::gateway::AuthGateway;
use crate::gateway::errors::GatewayError;
use crate::services::{ServiceError, ServiceResult};
use crate::session::{SessionContext, SessionEnd};

/// Validates the credentials, exchanges them for a token and starts the
/// session. Returns the operator's display name.
pub async fn login<G>(
    gateway: &G,
    session: &SessionContext,
    form: LoginForm,
) -> ServiceResult<String>
where
    G: AuthGateway + ?Sized,
{
    if let Err(err) = form.validate() {
        log::debug!("Rejected login form: {err}");
        return Err(ServiceError::Form(
            "Enter a valid email and password".to_string(),
        ));
    }

    let grant = gateway
        .login(&form.normalized_email(), &form.password)
        .await
        .map_err(|err| match err {
            GatewayError::Unauthorized => {
                ServiceError::Form("Invalid email or password".to_string())
            }
            other => {
                log::error!("Login request failed: {other}");
                ServiceError::from(other)
            }
        })?;

    session.start(&grant.token, &grant.user_name);
    log::info!("{} logged in", grant.user_name);

    Ok(grant.user_name)
}

pub fn logout(session: &SessionContext) {
    session.end(SessionEnd::Logout);
}
