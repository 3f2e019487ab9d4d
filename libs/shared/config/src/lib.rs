use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub seed_demo_clinic: bool,
    pub demo_clinic_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_addr: env::var("CLINICA_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("CLINICA_BIND_ADDR not set, using default");
                    "0.0.0.0:3000".to_string()
                }),
            seed_demo_clinic: env::var("CLINICA_SEED_DEMO")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            demo_clinic_name: env::var("CLINICA_DEMO_CLINIC_NAME")
                .unwrap_or_else(|_| "Clínica Demonstração".to_string()),
        };

        if config.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            warn!("CLINICA_BIND_ADDR is not a valid socket address: {}", config.bind_addr);
        }

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            seed_demo_clinic: false,
            demo_clinic_name: "Clínica Demonstração".to_string(),
        }
    }
}
