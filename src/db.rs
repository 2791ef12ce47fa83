use sqlx::MySqlPool;
use tracing::info;

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS company_accounts (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        company_id VARCHAR(64) NOT NULL UNIQUE,
        company_name VARCHAR(255) NOT NULL,
        login_id VARCHAR(64) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    ) DEFAULT CHARSET = utf8mb4
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance_entries (
        id VARCHAR(64) PRIMARY KEY,
        company_id VARCHAR(64) NOT NULL,
        name VARCHAR(255) NOT NULL,
        date DATE NOT NULL,
        day_of_week VARCHAR(16) NOT NULL,
        site_name VARCHAR(255) NOT NULL,
        work_description TEXT NOT NULL,
        start_time VARCHAR(5) NOT NULL,
        end_time VARCHAR(5) NOT NULL,
        total_hours VARCHAR(32) NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_entries_company_date (company_id, date, start_time),
        FOREIGN KEY (company_id) REFERENCES company_accounts (company_id) ON DELETE CASCADE
    ) DEFAULT CHARSET = utf8mb4
    "#,
];

/// Connects and creates the tables if they do not exist yet.
pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }
    info!("Database schema ready");

    Ok(pool)
}
