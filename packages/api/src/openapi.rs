use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

/// Security scheme modifier to add the session-token method
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Session token issued by /auth/login"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Restomate API",
        version = "1.0.0",
        description = "Restaurant management backend: owner accounts, subscription trials, checkout and payment reconciliation.\n\nAuthenticate with `Authorization: Bearer <token>` using the session token from `/auth/login`.",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Owner accounts and sessions"),
        (name = "subscription", description = "Subscription lifecycle and payments")
    ),
    paths(
        crate::routes::health::health,
        crate::routes::auth::register,
        crate::routes::auth::verify_email,
        crate::routes::auth::login,
        crate::routes::auth::validate,
        crate::routes::subscription::current::current_subscription,
        crate::routes::subscription::trial::start_trial,
        crate::routes::subscription::checkout::create_checkout_session,
        crate::routes::subscription::confirm::confirm_payment,
    ),
    components(schemas(
        crate::routes::health::HealthResponse,
        crate::routes::auth::RegisterRequest,
        crate::routes::auth::RegisterResponse,
        crate::routes::auth::VerifyEmailRequest,
        crate::routes::auth::VerifyEmailResponse,
        crate::routes::auth::LoginRequest,
        crate::routes::auth::LoginResponse,
        crate::routes::auth::ValidateResponse,
        crate::routes::subscription::current::CurrentSubscriptionResponse,
        crate::routes::subscription::trial::TrialResponse,
        crate::routes::subscription::checkout::CheckoutResponse,
        crate::routes::subscription::confirm::ConfirmPaymentRequest,
        crate::routes::subscription::confirm::ConfirmPaymentResponse,
    ))
)]
pub struct ApiDoc;
