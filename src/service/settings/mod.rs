mod model;

pub use model::*;

use libsql::{Connection, Row, Value};

use crate::storage::{MemoryCache, StorageError, StorageManager};

use super::ServiceError;

const SELECT_CHAT: &str = "SELECT id, type, name, chat_link, last_info, tw_orig, tw_style, tt_orig, in_orig, include_link \
                           FROM chat WHERE id = ?1 LIMIT 1";

/// Per-chat preferences stored in the `chat` table, read through a memory cache.
#[derive(Clone)]
pub struct SettingsService {
    conn: Connection,
    cache: MemoryCache<ChatSettings>,
}

impl SettingsService {
    pub fn new(storage: &StorageManager, capacity: usize) -> Self {
        info!("Initializing SettingsService...");
        Self {
            conn: storage.turso().connection(),
            cache: MemoryCache::new(capacity),
        }
    }

    fn cache_key(id: i64) -> String {
        format!("chat:{}", id)
    }

    /// Creates the chat row on first contact and keeps its profile columns fresh.
    pub async fn ensure_chat(&self, profile: &ChatProfile) -> Result<ChatSettings, ServiceError> {
        if let Some(cached) = self.cache.get(&Self::cache_key(profile.id)) {
            if cached.matches(profile) {
                return Ok(cached);
            }
        }

        self.conn
            .execute(
                "INSERT INTO chat (id, type, name, chat_link) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(id) DO UPDATE SET type = excluded.type, name = excluded.name, chat_link = excluded.chat_link",
                vec![
                    Value::Integer(profile.id),
                    Value::Text(profile.kind.clone()),
                    text(profile.name.as_deref()),
                    text(profile.link.as_deref()),
                ],
            )
            .await
            .map_err(StorageError::from)?;

        self.invalidate(profile.id);
        self.get(profile.id).await
    }

    /// Settings of a chat, defaults when it was never seen.
    pub async fn get(&self, id: i64) -> Result<ChatSettings, ServiceError> {
        let key = Self::cache_key(id);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let mut rows = self.conn.query(SELECT_CHAT, [id]).await.map_err(StorageError::from)?;
        let settings = match rows.next().await.map_err(StorageError::from)? {
            Some(row) => read_settings(&row)?,
            None => return Ok(ChatSettings::new(id)),
        };

        self.cache.set(&key, &settings, None);
        Ok(settings)
    }

    /// Flips `toggle` and returns its new value.
    pub async fn toggle(&self, id: i64, toggle: SettingsToggle) -> Result<bool, ServiceError> {
        let column = toggle.column();
        let updated = self
            .conn
            .execute(
                &format!("UPDATE chat SET {column} = 1 - {column} WHERE id = ?1"),
                [id],
            )
            .await
            .map_err(StorageError::from)?;

        if updated == 0 {
            return Err(ServiceError::Other(format!("chat {} is not registered", id)));
        }

        self.invalidate(id);
        let settings = self.get(id).await?;
        Ok(toggle.is_enabled(&settings))
    }

    pub async fn set_twitter_style(&self, id: i64, style: TwitterStyle) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "UPDATE chat SET tw_style = ?1 WHERE id = ?2",
                [style.value(), id],
            )
            .await
            .map_err(StorageError::from)?;
        self.invalidate(id);
        Ok(())
    }

    pub async fn set_last_info(&self, id: i64, info: &str) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "UPDATE chat SET last_info = ?1 WHERE id = ?2",
                vec![Value::Text(info.to_string()), Value::Integer(id)],
            )
            .await
            .map_err(StorageError::from)?;
        self.invalidate(id);
        Ok(())
    }

    fn invalidate(&self, id: i64) {
        self.cache.del(&Self::cache_key(id));
    }
}

fn text(value: Option<&str>) -> Value {
    match value {
        Some(v) => Value::Text(v.to_string()),
        None => Value::Null,
    }
}

fn optional_text(row: &Row, idx: i32) -> Result<Option<String>, StorageError> {
    match row.get_value(idx)? {
        Value::Text(v) => Ok(Some(v)),
        Value::Null => Ok(None),
        other => Err(StorageError::InvalidValue {
            field: "text column",
            value: format!("{:?}", other),
        }),
    }
}

fn read_settings(row: &Row) -> Result<ChatSettings, ServiceError> {
    Ok(ChatSettings {
        id: row.get::<i64>(0).map_err(StorageError::from)?,
        chat_type: row.get::<String>(1).map_err(StorageError::from)?,
        name: optional_text(row, 2)?,
        chat_link: optional_text(row, 3)?,
        last_info: optional_text(row, 4)?,
        tw_orig: row.get::<i64>(5).map_err(StorageError::from)? != 0,
        tw_style: TwitterStyle::try_from(row.get::<i64>(6).map_err(StorageError::from)?)?,
        tt_orig: row.get::<i64>(7).map_err(StorageError::from)? != 0,
        in_orig: row.get::<i64>(8).map_err(StorageError::from)? != 0,
        include_link: row.get::<i64>(9).map_err(StorageError::from)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    async fn service() -> SettingsService {
        let config = AppConfig::new_test_config();
        let storage = StorageManager::new(&config.database, &config.cache).await.unwrap();
        SettingsService::new(&storage, 16)
    }

    fn profile(id: i64) -> ChatProfile {
        ChatProfile {
            id,
            kind: "group".to_string(),
            name: Some("Cats".to_string()),
            link: Some("@cats".to_string()),
        }
    }

    #[tokio::test]
    async fn test_ensure_chat_creates_and_refreshes() {
        let service = service().await;

        let settings = service.ensure_chat(&profile(-100)).await.unwrap();
        assert_eq!(settings.chat_type, "group");
        assert_eq!(settings.name.as_deref(), Some("Cats"));
        assert!(!settings.include_link);
        assert_eq!(settings.tw_style, TwitterStyle::Link);

        let mut renamed = profile(-100);
        renamed.name = Some("Dogs".to_string());
        renamed.link = None;
        let settings = service.ensure_chat(&renamed).await.unwrap();
        assert_eq!(settings.name.as_deref(), Some("Dogs"));
        assert_eq!(settings.chat_link, None);
    }

    #[tokio::test]
    async fn test_toggle_flips_and_invalidates() {
        let service = service().await;
        service.ensure_chat(&profile(5)).await.unwrap();

        assert!(service.toggle(5, SettingsToggle::TikTokHd).await.unwrap());
        assert!(service.get(5).await.unwrap().tt_orig);
        assert!(!service.toggle(5, SettingsToggle::TikTokHd).await.unwrap());
        assert!(!service.get(5).await.unwrap().tt_orig);

        assert!(service.toggle(5, SettingsToggle::IncludeLink).await.unwrap());
        let settings = service.get(5).await.unwrap();
        assert!(settings.include_link);
        assert!(!settings.tw_orig);
    }

    #[tokio::test]
    async fn test_toggle_unknown_chat_fails() {
        let service = service().await;
        assert!(service.toggle(404, SettingsToggle::TwitterOrig).await.is_err());
    }

    #[tokio::test]
    async fn test_twitter_style_and_last_info() {
        let service = service().await;
        service.ensure_chat(&profile(9)).await.unwrap();

        service.set_twitter_style(9, TwitterStyle::InfoDesc).await.unwrap();
        service
            .set_last_info(9, "https://twitter.com/a/status/1")
            .await
            .unwrap();

        let settings = service.get(9).await.unwrap();
        assert_eq!(settings.tw_style, TwitterStyle::InfoDesc);
        assert_eq!(settings.last_info.as_deref(), Some("https://twitter.com/a/status/1"));
    }

    #[tokio::test]
    async fn test_unknown_chat_gets_defaults() {
        let service = service().await;
        assert_eq!(service.get(77).await.unwrap(), ChatSettings::new(77));
    }
}
