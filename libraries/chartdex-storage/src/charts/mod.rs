use crate::error::StorageError;
use chartdex_core::{
    error::Result, AssetFlags, ChartId, ChartMetadata, ChartRecord, ChartType, CreateChart,
    Fingerprint, InstrumentPart, NotesFormat,
};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, path, chart_type, fingerprint, last_scanned,
        name, artist, album, genre, year, charter,
        notes_format, song_length_ms, preview_start_ms, instruments,
        has_video, has_background, has_album_art, has_stems, has_lyrics
    FROM charts
"#;

#[derive(sqlx::FromRow)]
struct ChartRow {
    id: i64,
    path: String,
    chart_type: String,
    fingerprint: String,
    last_scanned: i64,
    name: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    genre: Option<String>,
    year: Option<String>,
    charter: Option<String>,
    notes_format: Option<String>,
    song_length_ms: Option<i64>,
    preview_start_ms: Option<i64>,
    instruments: String,
    has_video: bool,
    has_background: bool,
    has_album_art: bool,
    has_stems: bool,
    has_lyrics: bool,
}

impl TryFrom<ChartRow> for ChartRecord {
    type Error = StorageError;

    fn try_from(row: ChartRow) -> std::result::Result<Self, Self::Error> {
        let chart_type = ChartType::from_str(&row.chart_type).ok_or_else(|| {
            StorageError::corrupt_row(&row.path, format!("unknown chart type {}", row.chart_type))
        })?;
        let notes_format = match row.notes_format.as_deref() {
            Some(format) => Some(NotesFormat::from_str(format).ok_or_else(|| {
                StorageError::corrupt_row(&row.path, format!("unknown notes format {}", format))
            })?),
            None => None,
        };
        let instruments: Vec<InstrumentPart> = serde_json::from_str(&row.instruments)?;

        Ok(ChartRecord {
            id: row.id,
            path: row.path,
            chart_type,
            fingerprint: Fingerprint::new(row.fingerprint),
            last_scanned: row.last_scanned,
            metadata: ChartMetadata {
                name: row.name,
                artist: row.artist,
                album: row.album,
                genre: row.genre,
                year: row.year,
                charter: row.charter,
                notes_format,
                song_length_ms: row.song_length_ms,
                preview_start_ms: row.preview_start_ms,
                instruments,
                assets: AssetFlags {
                    video: row.has_video,
                    background: row.has_background,
                    album_art: row.has_album_art,
                    stems: row.has_stems,
                    lyrics: row.has_lyrics,
                },
            },
        })
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Every catalogued path
pub async fn get_all_paths(pool: &SqlitePool) -> Result<HashSet<String>> {
    let paths: Vec<String> = sqlx::query_scalar("SELECT path FROM charts")
        .fetch_all(pool)
        .await?;

    Ok(paths.into_iter().collect())
}

/// Path to fingerprint map for change detection
pub async fn get_all_hashes(pool: &SqlitePool) -> Result<HashMap<String, Fingerprint>> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT path, fingerprint FROM charts")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(path, fingerprint)| (path, Fingerprint::new(fingerprint)))
        .collect())
}

/// Insert or replace the chart stored at `chart.path`, keeping its ID
pub async fn upsert(pool: &SqlitePool, chart: CreateChart) -> Result<ChartId> {
    let instruments = serde_json::to_string(&chart.metadata.instruments)?;
    let metadata = chart.metadata;
    let assets = metadata.assets;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO charts (
            path, chart_type, fingerprint, last_scanned,
            name, artist, album, genre, year, charter,
            notes_format, song_length_ms, preview_start_ms, instruments,
            has_video, has_background, has_album_art, has_stems, has_lyrics
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(path) DO UPDATE SET
            chart_type = excluded.chart_type,
            fingerprint = excluded.fingerprint,
            last_scanned = excluded.last_scanned,
            name = excluded.name,
            artist = excluded.artist,
            album = excluded.album,
            genre = excluded.genre,
            year = excluded.year,
            charter = excluded.charter,
            notes_format = excluded.notes_format,
            song_length_ms = excluded.song_length_ms,
            preview_start_ms = excluded.preview_start_ms,
            instruments = excluded.instruments,
            has_video = excluded.has_video,
            has_background = excluded.has_background,
            has_album_art = excluded.has_album_art,
            has_stems = excluded.has_stems,
            has_lyrics = excluded.has_lyrics
        RETURNING id
        "#,
    )
    .bind(chart.path.as_str())
    .bind(chart.chart_type.as_str())
    .bind(chart.fingerprint.as_str())
    .bind(now_ms())
    .bind(metadata.name)
    .bind(metadata.artist)
    .bind(metadata.album)
    .bind(metadata.genre)
    .bind(metadata.year)
    .bind(metadata.charter)
    .bind(metadata.notes_format.map(|f| f.as_str()))
    .bind(metadata.song_length_ms)
    .bind(metadata.preview_start_ms)
    .bind(instruments)
    .bind(assets.video)
    .bind(assets.background)
    .bind(assets.album_art)
    .bind(assets.stems)
    .bind(assets.lyrics)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Bump `last_scanned`; a missing path is not an error
pub async fn touch(pool: &SqlitePool, path: &str) -> Result<()> {
    sqlx::query("UPDATE charts SET last_scanned = ? WHERE path = ?")
        .bind(now_ms())
        .bind(path)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete every chart whose path is not in `seen_paths`, in one transaction
pub async fn delete_orphans(pool: &SqlitePool, seen_paths: &HashSet<String>) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, path FROM charts")
        .fetch_all(&mut *tx)
        .await?;

    let mut removed = 0;
    for (id, path) in rows {
        if seen_paths.contains(&path) {
            continue;
        }
        removed += sqlx::query("DELETE FROM charts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;

    Ok(removed)
}

/// Get chart by ID
pub async fn get_by_id(pool: &SqlitePool, id: ChartId) -> Result<Option<ChartRecord>> {
    let row: Option<ChartRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(ChartRecord::try_from).transpose()?)
}

/// Get chart by path
pub async fn get_by_path(pool: &SqlitePool, path: &str) -> Result<Option<ChartRecord>> {
    let row: Option<ChartRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE path = ?"))
        .bind(path)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(ChartRecord::try_from).transpose()?)
}

/// All charts ordered by artist then name
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<ChartRecord>> {
    let rows: Vec<ChartRow> =
        sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY artist, name, path"))
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|row| ChartRecord::try_from(row).map_err(Into::into))
        .collect()
}
