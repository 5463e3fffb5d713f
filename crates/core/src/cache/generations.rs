//! Generation lifecycle in the store: install, promote, delete, list.

use super::connection::CacheDb;
use super::entries::write_entry;
use crate::Error;
use crate::http::{Request, Response};
use crate::store::{Generation, GenerationState};
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

impl CacheDb {
    /// List every generation with its entry count, oldest first.
    pub async fn list_generations(&self) -> Result<Vec<Generation>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Generation>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT g.name, g.state, g.created_at, g.activated_at, COUNT(e.key_hash)
                     FROM generations g
                     LEFT JOIN entries e ON e.generation = g.name
                     GROUP BY g.name
                     ORDER BY g.created_at ASC, g.name ASC",
                )?;

                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })?;

                let mut generations = Vec::new();
                for row in rows {
                    let (name, state, created_at, activated_at, count) = row?;
                    let state = match state.as_str() {
                        "active" => GenerationState::Active,
                        "installed" => GenerationState::Installed,
                        other => return Err(Error::Serialization(format!("unknown generation state: {other}"))),
                    };
                    generations.push(Generation { name, state, created_at, activated_at, entry_count: count as u64 });
                }
                Ok(generations)
            })
            .await
            .map_err(Error::from)
    }

    /// Name of the active generation, if one has been promoted.
    pub async fn get_active_generation(&self) -> Result<Option<String>, Error> {
        self.conn
            .call(|conn| -> Result<Option<String>, Error> {
                let name = conn
                    .query_row("SELECT name FROM generations WHERE state = 'active'", [], |row| row.get(0))
                    .optional()?;
                Ok(name)
            })
            .await
            .map_err(Error::from)
    }

    /// Create a generation if needed and replace its entries, in one transaction.
    ///
    /// An existing generation keeps its state, so reinstalling the active
    /// generation refreshes it in place.
    pub async fn install_entries(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<(), Error> {
        let name = name.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO generations (name, state, created_at) VALUES (?1, 'installed', ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, now],
                )?;
                tx.execute("DELETE FROM entries WHERE generation = ?1", params![name])?;
                for (request, response) in &entries {
                    write_entry(&tx, &name, request, response, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Mark one generation active and demote whichever was active before.
    pub async fn promote_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM generations WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                if !exists {
                    return Err(Error::NotInstalled(name));
                }

                tx.execute(
                    "UPDATE generations SET state = 'installed' WHERE state = 'active' AND name != ?1",
                    params![name],
                )?;
                tx.execute(
                    "UPDATE generations SET state = 'active', activated_at = COALESCE(activated_at, ?2)
                     WHERE name = ?1",
                    params![name, now],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation; its entries go with it.
    ///
    /// Returns false if no such generation existed.
    pub async fn remove_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn entry(path: &str) -> (Request, Response) {
        let url = Url::parse("http://localhost:8080").unwrap().join(path).unwrap();
        let response = Response::ok(&url, format!("body of {path}"));
        (Request::get(url), response)
    }

    #[tokio::test]
    async fn test_install_and_list() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.install_entries("mp-tracker-v1", vec![entry("/"), entry("/index.html")])
            .await
            .unwrap();

        let generations = db.list_generations().await.unwrap();
        assert_eq!(generations.len(), 1);
        assert_eq!(generations[0].name, "mp-tracker-v1");
        assert_eq!(generations[0].state, GenerationState::Installed);
        assert_eq!(generations[0].entry_count, 2);
        assert!(db.get_active_generation().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reinstall_replaces_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.install_entries("v1", vec![entry("/"), entry("/old.html")]).await.unwrap();
        db.promote_generation("v1").await.unwrap();
        db.install_entries("v1", vec![entry("/")]).await.unwrap();

        let generations = db.list_generations().await.unwrap();
        assert_eq!(generations[0].entry_count, 1);
        assert_eq!(generations[0].state, GenerationState::Active);
        let (old, _) = entry("/old.html");
        assert!(db.get_entry("v1", &old).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_promote_single_active() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.install_entries("v1", vec![entry("/")]).await.unwrap();
        db.install_entries("v2", vec![entry("/")]).await.unwrap();

        db.promote_generation("v1").await.unwrap();
        db.promote_generation("v2").await.unwrap();

        assert_eq!(db.get_active_generation().await.unwrap().as_deref(), Some("v2"));
        let active = db
            .list_generations()
            .await
            .unwrap()
            .into_iter()
            .filter(|g| g.state == GenerationState::Active)
            .count();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn test_promote_missing_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.promote_generation("ghost").await;
        assert!(matches!(result, Err(Error::NotInstalled(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_remove_cascades_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.install_entries("v1", vec![entry("/")]).await.unwrap();

        assert!(db.remove_generation("v1").await.unwrap());
        assert!(!db.remove_generation("v1").await.unwrap());

        let (req, _) = entry("/");
        assert!(db.get_entry("v1", &req).await.unwrap().is_none());
        let orphans: i64 = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
