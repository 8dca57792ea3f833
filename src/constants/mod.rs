use std::time::Duration;

pub const STORAGE_BUCKET: &str = "whatsapp-media";
pub const DEFAULT_CONVERSATION_PAGE: usize = 50;
pub const MAX_CONVERSATION_PAGE: usize = 200;

pub struct Env {
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub gateway_base_url: String,
    pub gateway_token: String,
    pub gateway_timeout: Duration,
    pub storage_url: Option<String>,
    pub storage_service_key: Option<String>,
    pub storage_bucket: String,
    pub upload_dir: String,
    pub public_base_url: String,
    pub media_max_bytes: usize,
    pub media_relay_timeout: Duration,
    pub webhook_deadline: Duration,
}

fn parsed<T: std::str::FromStr>(key: &str, default: &str) -> T {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .unwrap_or_else(|_| panic!("{key} must be a valid number"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Env {
    fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let database_max_connections = parsed::<u32>("DATABASE_MAX_CONNECTIONS", "5");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed::<u16>("PORT", "8080");

        let gateway_base_url = std::env::var("GATEWAY_BASE_URL")
            .expect("GATEWAY_BASE_URL must be set in .env file or environment variable");
        let gateway_token = std::env::var("GATEWAY_TOKEN")
            .expect("GATEWAY_TOKEN must be set in .env file or environment variable");
        let gateway_timeout = Duration::from_secs(parsed::<u64>("GATEWAY_TIMEOUT_SECS", "30"));

        let storage_url = optional("STORAGE_URL");
        let storage_service_key = optional("STORAGE_SERVICE_KEY");
        let storage_bucket =
            std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| STORAGE_BUCKET.to_string());
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let public_base_url =
            optional("PUBLIC_BASE_URL").unwrap_or_else(|| format!("http://{ip}:{port}"));

        let media_max_bytes = parsed::<usize>("MEDIA_MAX_BYTES", "26214400");
        let webhook_deadline =
            Duration::from_millis(parsed::<u64>("WEBHOOK_DEADLINE_MS", "25000"));
        let mut media_relay_timeout =
            Duration::from_millis(parsed::<u64>("MEDIA_RELAY_TIMEOUT_MS", "10000"));

        // relay must give up before the webhook deadline or a slow host stalls persistence
        if media_relay_timeout >= webhook_deadline {
            media_relay_timeout = webhook_deadline / 2;
            log::warn!(
                "MEDIA_RELAY_TIMEOUT_MS must be below WEBHOOK_DEADLINE_MS, clamped to {}ms",
                media_relay_timeout.as_millis()
            );
        }

        Env {
            database_url,
            database_max_connections,
            frontend_url,
            ip,
            port,
            gateway_base_url,
            gateway_token,
            gateway_timeout,
            storage_url,
            storage_service_key,
            storage_bucket,
            upload_dir,
            public_base_url,
            media_max_bytes,
            media_relay_timeout,
            webhook_deadline,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
