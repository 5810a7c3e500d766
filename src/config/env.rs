use std::env;

pub enum EnvKey {
    ServerPort,
    AppEnv,
    DbType,
    DatabaseUrl,
    DbTypeTest,
    DatabaseUrlTest,
    DbDebug,
    AutoMigrateDb,
    LocalStoragePath,
    InputBucket,
    S3Endpoint,
    S3Region,
    S3AccessKey,
    S3SecretKey,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::AppEnv => "APP_ENV",
            EnvKey::DbType => "DB_TYPE",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::DbTypeTest => "DB_TYPE_TEST",
            EnvKey::DatabaseUrlTest => "DATABASE_URL_TEST",
            EnvKey::DbDebug => "DB_DEBUG",
            EnvKey::AutoMigrateDb => "AUTO_MIGRATE_DB",
            EnvKey::LocalStoragePath => "LOCAL_STORAGE_PATH",
            EnvKey::InputBucket => "INPUT_BUCKET_NAME",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
            EnvKey::S3Region => "S3_REGION",
            EnvKey::S3AccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::S3SecretKey => "AWS_SECRET_ACCESS_KEY",
        }
    }
}

pub fn get(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok()
}
