use anyhow::{Context, Result, anyhow};
use std::{env, str::FromStr};

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required_var(key: &str) -> Result<String> {
    optional_var(key).with_context(|| format!("Missing environment variable: {key}"))
}

fn parsed_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

fn bool_var(key: &str, default: bool) -> Result<bool> {
    match optional_var(key).as_deref() {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("{key} must be 'true' or 'false', got '{other}'")),
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from_name: String,
    /// Receives the admin copy of every order.
    pub notification_email: String,
    pub mbway_phone: Option<String>,
}

impl EmailConfig {
    pub fn init() -> Result<Self> {
        let smtp_user = required_var("SMTP_USERNAME")?;
        let smtp_pass = required_var("SMTP_PASSWORD")?;
        let smtp_server = optional_var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into());
        let smtp_port = parsed_var("SMTP_PORT", 465u16)?;
        let from_name = optional_var("MAIL_FROM_NAME").unwrap_or_else(|| "Alsa Fragrance".into());
        let notification_email =
            optional_var("ORDER_NOTIFICATION_EMAIL").unwrap_or_else(|| smtp_user.clone());

        Ok(Self {
            smtp_server,
            smtp_port,
            smtp_user,
            smtp_pass,
            from_name,
            notification_email,
            mbway_phone: optional_var("MBWAY_PHONE"),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// `None` disables relaying; the contact form then answers 503.
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: String,
    pub inbox: String,
}

impl ContactConfig {
    pub fn init(default_inbox: &str) -> Result<Self> {
        Ok(Self {
            api_key: optional_var("RESEND_API_KEY"),
            api_url: optional_var("RESEND_API_URL")
                .unwrap_or_else(|| "https://api.resend.com".into()),
            from: optional_var("CONTACT_FROM")
                .unwrap_or_else(|| "Alsa Fragrance Contact Form <onboarding@resend.dev>".into()),
            inbox: optional_var("CONTACT_INBOX").unwrap_or_else(|| default_inbox.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl AdminSeed {
    pub fn init() -> Option<Self> {
        let email = optional_var("ADMIN_EMAIL")?;
        let password = optional_var("ADMIN_PASSWORD")?;

        Some(Self {
            email,
            password,
            name: optional_var("ADMIN_NAME"),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub run_migrations: bool,
    pub port: u16,
    pub otel_endpoint: String,
    pub email_config: EmailConfig,
    pub contact: ContactConfig,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn init() -> Result<Self> {
        let database_url = required_var("DATABASE_URL")?;
        let jwt_secret = required_var("JWT_SECRET")?;
        let jwt_ttl_minutes = parsed_var("JWT_TTL_MINUTES", 60i64)?;
        let bcrypt_cost = parsed_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        let run_migrations = bool_var("RUN_MIGRATIONS", false)?;
        let port = parsed_var("PORT", 8080u16)?;
        let otel_endpoint =
            optional_var("OTEL_ENDPOINT").unwrap_or_else(|| "http://localhost:4317".into());

        let email_config = EmailConfig::init().context("failed email config")?;
        let contact = ContactConfig::init(&email_config.notification_email)
            .context("failed contact config")?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_minutes,
            bcrypt_cost,
            run_migrations,
            port,
            otel_endpoint,
            email_config,
            contact,
            admin_seed: AdminSeed::init(),
        })
    }
}
