use sqlx::SqlitePool;

/// One cached ratings row per IMDb id. All rating fields are opaque display
/// strings as returned by the ratings provider (may be "N/A" or empty).
#[derive(Debug, Clone, PartialEq)]
pub struct RatingsRow {
    pub imdb_id: String,
    pub imdb_rating: String,
    pub imdb_votes: String,
    pub rotten_tomatoes: String,
    pub metascore: String,
    pub awards: String,
    pub box_office: String,
}

type RatingsTuple = (String, String, String, String, String, String, String);

fn row_to_ratings(row: RatingsTuple) -> RatingsRow {
    RatingsRow {
        imdb_id: row.0,
        imdb_rating: row.1,
        imdb_votes: row.2,
        rotten_tomatoes: row.3,
        metascore: row.4,
        awards: row.5,
        box_office: row.6,
    }
}

/// Get a cached ratings row by IMDb id.
pub async fn get(pool: &SqlitePool, imdb_id: &str) -> Result<Option<RatingsRow>, sqlx::Error> {
    let row: Option<RatingsTuple> = sqlx::query_as(
        "SELECT imdb_id, imdb_rating, imdb_votes, rotten_tomatoes, metascore, \
         awards, box_office FROM ratings_cache WHERE imdb_id = ?",
    )
    .bind(imdb_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_ratings))
}

/// Insert a ratings row. Idempotent per key: a concurrent miss for the same
/// IMDb id may race this insert, so the first writer wins and later writers
/// are no-ops rather than constraint violations.
pub async fn insert(pool: &SqlitePool, row: &RatingsRow) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().timestamp();
    sqlx::query(
        "INSERT OR IGNORE INTO ratings_cache \
         (imdb_id, imdb_rating, imdb_votes, rotten_tomatoes, metascore, awards, box_office, \
          created_ts, updated_ts) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&row.imdb_id)
    .bind(&row.imdb_rating)
    .bind(&row.imdb_votes)
    .bind(&row.rotten_tomatoes)
    .bind(&row.metascore)
    .bind(&row.awards)
    .bind(&row.box_office)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        pool
    }

    fn sample_row() -> RatingsRow {
        RatingsRow {
            imdb_id: "tt0133093".to_string(),
            imdb_rating: "8.7".to_string(),
            imdb_votes: "1,900,000".to_string(),
            rotten_tomatoes: "83%".to_string(),
            metascore: "73".to_string(),
            awards: "Won 4 Oscars.".to_string(),
            box_office: "$172,076,928".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let pool = test_pool().await;
        let row = sample_row();
        insert(&pool, &row).await.unwrap();

        let fetched = get(&pool, "tt0133093").await.unwrap().unwrap();
        assert_eq!(fetched, row);
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let pool = test_pool().await;
        assert!(get(&pool, "tt9999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_keeps_first_row() {
        let pool = test_pool().await;
        let first = sample_row();
        insert(&pool, &first).await.unwrap();

        let mut second = sample_row();
        second.imdb_rating = "9.9".to_string();
        // Same key again must not error and must not overwrite
        insert(&pool, &second).await.unwrap();

        let fetched = get(&pool, "tt0133093").await.unwrap().unwrap();
        assert_eq!(fetched.imdb_rating, "8.7");
    }
}
