use crate::Db;
use domain::settings::{self, Settings};
use sqlx::Row;

impl Db {
    /// Reads a settings value. A key with a known default that has never
    /// been written is initialised to that default, and the default is
    /// persisted before it is returned. Keys without a default read as
    /// an empty string.
    pub async fn get_setting(&self, key: &str) -> anyhow::Result<String> {
        let row = sqlx::query("SELECT value FROM key_val WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = row {
            return Ok(row.get(0));
        }

        let Some(default) = settings::default_value(key) else {
            return Ok(String::new());
        };

        tracing::debug!("Initialising setting '{}' to default '{}'", key, default);
        // a concurrent writer may have won the race; keep its value
        sqlx::query("INSERT INTO key_val (key, value) VALUES (?, ?) ON CONFLICT(key) DO NOTHING")
            .bind(key)
            .bind(default)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query("SELECT value FROM key_val WHERE key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO key_val (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn load_settings(&self) -> anyhow::Result<Settings> {
        let require_moderation = self.get_setting(settings::REQUIRE_MODERATION).await?;
        let require_sign_in = self.get_setting(settings::REQUIRE_SIGN_IN).await?;
        Ok(Settings {
            require_moderation: settings::parse_flag(&require_moderation),
            require_sign_in: settings::parse_flag(&require_sign_in),
        })
    }

    pub async fn save_settings(&self, s: &Settings) -> anyhow::Result<()> {
        self.set_setting(
            settings::REQUIRE_MODERATION,
            settings::format_flag(s.require_moderation),
        )
        .await?;
        self.set_setting(
            settings::REQUIRE_SIGN_IN,
            settings::format_flag(s.require_sign_in),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;
    use domain::settings::{REQUIRE_MODERATION, REQUIRE_SIGN_IN};
    use domain::Settings;

    async fn memory_db() -> Db {
        Db::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn missing_key_reads_as_default() {
        let db = memory_db().await;
        assert_eq!(db.get_setting(REQUIRE_MODERATION).await.unwrap(), "true");
        assert_eq!(db.get_setting(REQUIRE_SIGN_IN).await.unwrap(), "true");
        assert_eq!(db.get_setting("no-such-key").await.unwrap(), "");
    }

    #[tokio::test]
    async fn set_overrides_default() {
        let db = memory_db().await;
        db.set_setting(REQUIRE_MODERATION, "false").await.unwrap();
        assert_eq!(db.get_setting(REQUIRE_MODERATION).await.unwrap(), "false");

        db.set_setting(REQUIRE_MODERATION, "true").await.unwrap();
        assert_eq!(db.get_setting(REQUIRE_MODERATION).await.unwrap(), "true");
    }

    #[tokio::test]
    async fn default_is_persisted_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("comments.db").display());

        let db = Db::new(&url).await.unwrap();
        assert_eq!(db.get_setting(REQUIRE_SIGN_IN).await.unwrap(), "true");
        db.close().await;

        // the row itself must exist, not just the in-code default
        let db = Db::new(&url).await.unwrap();
        let stored: Option<String> =
            sqlx::query_scalar("SELECT value FROM key_val WHERE key = ?")
                .bind(REQUIRE_SIGN_IN)
                .fetch_optional(&db.pool)
                .await
                .unwrap();
        assert_eq!(stored.as_deref(), Some("true"));
        assert_eq!(db.get_setting(REQUIRE_SIGN_IN).await.unwrap(), "true");
    }

    #[tokio::test]
    async fn unknown_key_is_not_persisted() {
        let db = memory_db().await;
        db.get_setting("csrf-key").await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM key_val WHERE key = 'csrf-key'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn typed_settings_round_trip() {
        let db = memory_db().await;
        assert_eq!(db.load_settings().await.unwrap(), Settings::default());

        let s = Settings {
            require_moderation: true,
            require_sign_in: false,
        };
        db.save_settings(&s).await.unwrap();
        assert_eq!(db.get_setting(REQUIRE_MODERATION).await.unwrap(), "true");
        assert_eq!(db.get_setting(REQUIRE_SIGN_IN).await.unwrap(), "false");
        assert_eq!(db.load_settings().await.unwrap(), s);
    }
}
