//! Cache entry reads and writes.
//!
//! An entry is one response snapshot stored under a request key inside a
//! generation. Writes replace the whole row.

use super::connection::CacheDb;
use crate::Error;
use crate::http::{Request, Response, ResponseKind};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// Insert or replace one entry on an open connection or transaction.
pub(super) fn write_entry(
    conn: &rusqlite::Connection, generation: &str, request: &Request, response: &Response, stored_at: &str,
) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&response.headers)?;
    conn.execute(
        "INSERT INTO entries (
            generation, key_hash, method, url, response_url, status, status_text,
            headers_json, kind, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(generation, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            response_url = excluded.response_url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            kind = excluded.kind,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            generation,
            request.key(),
            &request.method,
            request.url.as_str(),
            &response.url,
            response.status,
            &response.status_text,
            headers_json,
            response.kind.as_str(),
            response.body.as_ref(),
            stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Get the stored response for a request in a generation.
    ///
    /// Returns None if the generation or the entry doesn't exist.
    pub async fn get_entry(&self, generation: &str, request: &Request) -> Result<Option<Response>, Error> {
        let generation = generation.to_string();
        let key = request.key();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let row = conn
                    .query_row(
                        "SELECT response_url, status, status_text, headers_json, kind, body
                         FROM entries WHERE generation = ?1 AND key_hash = ?2",
                        params![generation, key],
                        |row| {
                            Ok((
                                row.get::<_, Option<String>>(0)?,
                                row.get::<_, u16>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, String>(3)?,
                                row.get::<_, String>(4)?,
                                row.get::<_, Vec<u8>>(5)?,
                            ))
                        },
                    )
                    .optional()?;

                let Some((url, status, status_text, headers_json, kind, body)) = row else {
                    return Ok(None);
                };

                let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
                let kind = ResponseKind::parse(&kind)
                    .ok_or_else(|| Error::Serialization(format!("unknown response kind: {kind}")))?;

                Ok(Some(Response { url, status, status_text, headers, body: body.into(), kind }))
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the stored response for a request.
    ///
    /// Fails if the generation does not exist.
    pub async fn upsert_entry(&self, generation: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let generation = generation.to_string();
        let request = request.clone();
        let response = response.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| write_entry(conn, &generation, &request, &response, &stored_at))
            .await
            .map_err(Error::from)
    }

    /// Delete every entry in a generation, keeping the generation row.
    ///
    /// Returns the number of deleted entries.
    pub async fn clear_entries(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE generation = ?1", params![generation])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(path: &str) -> Request {
        Request::get(Url::parse("http://localhost:8080").unwrap().join(path).unwrap())
    }

    async fn db_with_generation(name: &str) -> CacheDb {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.install_entries(name, Vec::new()).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = db_with_generation("v1").await;
        let req = request("/index.html");
        let resp = Response::ok(&req.url, "<h1>MPs</h1>").with_header("Content-Type", "text/html");

        db.upsert_entry("v1", &req, &resp).await.unwrap();

        let stored = db.get_entry("v1", &req).await.unwrap().unwrap();
        assert_eq!(stored, resp);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = db_with_generation("v1").await;
        assert!(db.get_entry("v1", &request("/nope")).await.unwrap().is_none());
        assert!(db.get_entry("v0", &request("/nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_entry() {
        let db = db_with_generation("v1").await;
        let req = request("/styles/main.css");
        let old = Response::ok(&req.url, "body { color: red }").with_header("ETag", "\"a\"");
        let new = Response::ok(&req.url, "body { color: blue }");

        db.upsert_entry("v1", &req, &old).await.unwrap();
        db.upsert_entry("v1", &req, &new).await.unwrap();

        let stored = db.get_entry("v1", &req).await.unwrap().unwrap();
        assert_eq!(stored.body.as_ref(), b"body { color: blue }");
        assert!(stored.header("etag").is_none());
    }

    #[tokio::test]
    async fn test_upsert_requires_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = request("/");
        let result = db.upsert_entry("missing", &req, &Response::ok(&req.url, "")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_entries_isolated_per_generation() {
        let db = db_with_generation("v1").await;
        db.install_entries("v2", Vec::new()).await.unwrap();
        let req = request("/about.html");

        db.upsert_entry("v1", &req, &Response::ok(&req.url, "old")).await.unwrap();

        assert!(db.get_entry("v1", &req).await.unwrap().is_some());
        assert!(db.get_entry("v2", &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_entries() {
        let db = db_with_generation("v1").await;
        for path in ["/", "/index.html", "/about.html"] {
            let req = request(path);
            db.upsert_entry("v1", &req, &Response::ok(&req.url, path)).await.unwrap();
        }

        assert_eq!(db.clear_entries("v1").await.unwrap(), 3);
        assert_eq!(db.clear_entries("v1").await.unwrap(), 0);
        assert!(db.get_entry("v1", &request("/")).await.unwrap().is_none());
    }
}
