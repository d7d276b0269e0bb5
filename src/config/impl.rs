use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 内置默认值，配置文件缺失时仍可启动
            .set_default("app.system_name", "实习管理平台")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("api.base_url", "http://localhost:8080/api")?
            .set_default(
                "api.user_agent",
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("api.timeouts.request_ms", 15_000)?
            .set_default("api.timeouts.connect_ms", 5_000)?
            .set_default("pagination.default_size", 10)?
            .set_default("pagination.max_size", 100)?
            .set_default("auth.username", "")?
            .set_default("auth.password", "")?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("INTERNSHIP")
                    .separator("_")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("api.base_url", std::env::var("API_BASE_URL").ok())?
            .set_override_option("auth.username", std::env::var("API_USERNAME").ok())?
            .set_override_option("auth.password", std::env::var("API_PASSWORD").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 分页大小至少为 1，默认值不得超过上限
        app_config.pagination.max_size = app_config.pagination.max_size.max(1);
        app_config.pagination.default_size = app_config
            .pagination
            .default_size
            .clamp(1, app_config.pagination.max_size);

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 将请求的分页大小限制在 [1, max_size]
    pub fn clamp_page_size(&self, size: u32) -> u32 {
        size.clamp(1, self.pagination.max_size)
    }
}
