use actix_web::web;

use crate::pipeline::{AuthenticationOptions, AuthorizationOptions};
use crate::state::AuthState;

pub mod health;
pub mod private;

/// Mount the demo routes.
///
/// `/auth/signup` and `/auth/signin` answer with the token cookie;
/// everything under `/private` requires a valid token.
pub fn configure(state: &AuthState) -> impl FnOnce(&mut web::ServiceConfig) + '_ {
    move |cfg| {
        cfg.service(web::scope("/health").configure(health::configure_routes));

        cfg.service(
            web::scope("/auth")
                .route(
                    "/signup",
                    state
                        .authenticate_user_with_email_and_password(
                            AuthenticationOptions::create_account().with_cookie(),
                            Vec::new(),
                        )
                        .into_route(),
                )
                .route(
                    "/signin",
                    state
                        .authenticate_user_with_email_and_password(
                            AuthenticationOptions::sign_in().with_cookie(),
                            Vec::new(),
                        )
                        .into_route(),
                ),
        );

        cfg.service(
            web::scope("/private")
                .wrap(state.authorize_user(AuthorizationOptions::default()))
                .configure(private::configure_routes),
        );
    }
}
